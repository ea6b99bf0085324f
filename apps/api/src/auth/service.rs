//! Credential primitives and token bookkeeping for both authentication
//! models: argon2 password/secret hashing, opaque OAuth2 access tokens
//! (stored as sha256 digests), and the legacy per-user JWTs.

use anyhow::anyhow;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::client::{AccessTokenRow, OAuth2ClientRow};
use crate::models::user::User;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn token_urlsafe(n_bytes: usize) -> String {
    let mut buf = vec![0u8; n_bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// Generates a `(client_id, client_secret)` pair. The secret is returned to
/// the operator exactly once; only its argon2 hash is persisted.
pub fn generate_client_credentials() -> (String, String) {
    (format!("hm_{}", token_urlsafe(24)), token_urlsafe(48))
}

fn generate_access_token() -> String {
    format!("hm_access_{}", token_urlsafe(32))
}

/// Digest under which an opaque token is stored and looked up.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

// ── Legacy JWT ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: String,
}

pub fn create_jwt(
    secret: &str,
    username: &str,
    token_type: &str,
    ttl: Duration,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: username.to_string(),
        exp: (Utc::now() + ttl).timestamp(),
        token_type: token_type.to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow!("JWT signing failed: {e}")))
}

/// Verifies signature, expiry and token type; returns the subject username.
pub fn verify_jwt(secret: &str, token: &str, expected_type: &str) -> Option<String> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .ok()?;

    (data.claims.token_type == expected_type).then_some(data.claims.sub)
}

// ── OAuth2 client credentials ───────────────────────────────────────────────

/// Verifies a `client_id`/`client_secret` pair against the stored hash and
/// bumps the client's `last_used_at`.
pub async fn verify_client_credentials(
    pool: &PgPool,
    client_id: &str,
    client_secret: &str,
) -> Result<Option<OAuth2ClientRow>, AppError> {
    let Some(client) = sqlx::query_as::<_, OAuth2ClientRow>(
        "SELECT * FROM oauth2_clients WHERE client_id = $1 AND is_active = TRUE",
    )
    .bind(client_id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    if !verify_password(client_secret, &client.client_secret_hash) {
        return Ok(None);
    }

    sqlx::query("UPDATE oauth2_clients SET last_used_at = now() WHERE id = $1")
        .bind(client.id)
        .execute(pool)
        .await?;

    Ok(Some(client))
}

/// Issues a fresh opaque access token for a verified client. Returns the
/// plaintext token alongside its stored row.
pub async fn issue_access_token(
    pool: &PgPool,
    client_id: &str,
    scopes: &[String],
    expires_in_seconds: i64,
) -> Result<(String, AccessTokenRow), AppError> {
    let token = generate_access_token();
    let row = sqlx::query_as::<_, AccessTokenRow>(
        r#"
        INSERT INTO access_tokens (token_hash, client_id, scopes, expires_at)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(hash_token(&token))
    .bind(client_id)
    .bind(scopes)
    .bind(Utc::now() + Duration::seconds(expires_in_seconds))
    .fetch_one(pool)
    .await?;

    info!("issued access token for client {client_id}");
    Ok((token, row))
}

/// Resolves an opaque bearer token to its row and owning active client,
/// bumping `last_used_at` on both. Expired, revoked and unknown tokens all
/// resolve to `None`.
pub async fn verify_access_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<(AccessTokenRow, OAuth2ClientRow)>, AppError> {
    let Some(db_token) = sqlx::query_as::<_, AccessTokenRow>(
        "SELECT * FROM access_tokens \
         WHERE token_hash = $1 AND is_active = TRUE AND expires_at > now()",
    )
    .bind(hash_token(token))
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let Some(client) = sqlx::query_as::<_, OAuth2ClientRow>(
        "SELECT * FROM oauth2_clients WHERE client_id = $1 AND is_active = TRUE",
    )
    .bind(&db_token.client_id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    sqlx::query("UPDATE access_tokens SET last_used_at = now() WHERE id = $1")
        .bind(db_token.id)
        .execute(pool)
        .await?;
    sqlx::query("UPDATE oauth2_clients SET last_used_at = now() WHERE id = $1")
        .bind(client.id)
        .execute(pool)
        .await?;

    Ok(Some((db_token, client)))
}

/// Deactivates a token by digest. Returns whether anything was revoked.
pub async fn revoke_token(pool: &PgPool, token: &str) -> Result<bool, AppError> {
    let revoked = sqlx::query("UPDATE access_tokens SET is_active = FALSE WHERE token_hash = $1")
        .bind(hash_token(token))
        .execute(pool)
        .await?
        .rows_affected();

    Ok(revoked > 0)
}

/// Checks the trailing-hour request count against the client's cap.
pub async fn check_rate_limit(pool: &PgPool, client: &OAuth2ClientRow) -> Result<bool, AppError> {
    let used: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM api_usage \
         WHERE client_id = $1 AND request_time >= now() - interval '1 hour'",
    )
    .bind(&client.client_id)
    .fetch_one(pool)
    .await?;

    Ok(used < client.rate_limit_per_hour as i64)
}

/// Records one admitted request at the auth boundary. Downstream status and
/// latency are not known here and stay NULL.
pub async fn log_api_usage(
    pool: &PgPool,
    client_id: &str,
    endpoint: &str,
    method: &str,
    ip_address: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO api_usage (client_id, endpoint, method, ip_address) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(client_id)
    .bind(endpoint)
    .bind(method)
    .bind(ip_address)
    .execute(pool)
    .await?;

    Ok(())
}

/// Verifies a super-admin username/password pair.
pub async fn authenticate_super_admin(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let Some(user) = sqlx::query_as::<_, User>(
        "SELECT * FROM users \
         WHERE username = $1 AND is_super_admin = TRUE AND is_active = TRUE",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    if !verify_password(password, &user.hashed_password) {
        return Ok(None);
    }

    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash));
        assert!(!verify_password("hunter3!", &hash));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_client_credentials_shape() {
        let (client_id, secret) = generate_client_credentials();
        assert!(client_id.starts_with("hm_"));
        assert!(client_id.len() > 10);
        assert!(secret.len() >= 48);
    }

    #[test]
    fn test_client_credentials_are_unique() {
        let (a, _) = generate_client_credentials();
        let (b, _) = generate_client_credentials();
        assert_ne!(a, b);
    }

    #[test]
    fn test_access_token_prefix() {
        assert!(generate_access_token().starts_with("hm_access_"));
    }

    #[test]
    fn test_token_hash_is_deterministic_sha256_hex() {
        let h = hash_token("hm_access_abc");
        assert_eq!(h, hash_token("hm_access_abc"));
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_jwt_round_trip() {
        let token = create_jwt("s3cret", "admin", "access", Duration::minutes(5)).unwrap();
        assert_eq!(
            verify_jwt("s3cret", &token, "access").as_deref(),
            Some("admin")
        );
    }

    #[test]
    fn test_jwt_wrong_type_rejected() {
        let token = create_jwt("s3cret", "admin", "refresh", Duration::minutes(5)).unwrap();
        assert_eq!(verify_jwt("s3cret", &token, "access"), None);
    }

    #[test]
    fn test_jwt_wrong_secret_rejected() {
        let token = create_jwt("s3cret", "admin", "access", Duration::minutes(5)).unwrap();
        assert_eq!(verify_jwt("other", &token, "access"), None);
    }

    #[test]
    fn test_jwt_expired_rejected() {
        // well past the default validation leeway
        let token = create_jwt("s3cret", "admin", "access", Duration::minutes(-10)).unwrap();
        assert_eq!(verify_jwt("s3cret", &token, "access"), None);
    }
}
