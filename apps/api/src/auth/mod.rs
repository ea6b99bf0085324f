//! Authentication boundary.
//!
//! Caller identity is resolved exactly once per request by the extractors
//! below and passed into handlers as a `Caller` value; nothing downstream
//! branches on token formats again.

pub mod handlers;
pub mod service;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::errors::AppError;
use crate::models::client::{AccessTokenRow, OAuth2ClientRow};
use crate::models::user::User;
use crate::state::AppState;

pub const SCOPE_READ: &str = "read";
pub const SCOPE_WRITE: &str = "write";

/// The resolved caller: an end user authenticated with a legacy JWT, or a
/// B2B API client authenticated with an OAuth2 access token.
#[derive(Debug, Clone)]
pub enum Caller {
    User(User),
    Client {
        client: OAuth2ClientRow,
        token: AccessTokenRow,
    },
}

impl Caller {
    /// The ownership key all of this caller's rows are filed under: the user
    /// UUID for end users, the `client_id` for API clients.
    pub fn owner_id(&self) -> String {
        match self {
            Caller::User(user) => user.id.to_string(),
            Caller::Client { client, .. } => client.client_id.clone(),
        }
    }

    /// End users hold full access; client tokens are limited to the scopes
    /// they were issued with.
    pub fn require_scope(&self, scope: &str) -> Result<(), AppError> {
        match self {
            Caller::User(_) => Ok(()),
            Caller::Client { token, .. } => {
                if token.scopes.iter().any(|s| s == scope) {
                    Ok(())
                } else {
                    Err(AppError::Forbidden(format!(
                        "Insufficient scope. Required: {scope}"
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts)?;

        // OAuth2 access tokens first, the primary authentication method
        if let Some((db_token, client)) = service::verify_access_token(&state.db, token).await? {
            if !service::check_rate_limit(&state.db, &client).await? {
                return Err(AppError::RateLimited);
            }
            service::log_api_usage(
                &state.db,
                &client.client_id,
                parts.uri.path(),
                parts.method.as_str(),
                forwarded_ip(parts).as_deref(),
            )
            .await?;
            return Ok(Caller::Client {
                client,
                token: db_token,
            });
        }

        // Legacy JWT fallback for end users
        if let Some(username) = service::verify_jwt(&state.config.secret_key, token, "access") {
            let user = sqlx::query_as::<_, User>(
                "SELECT * FROM users WHERE username = $1 AND is_active = TRUE",
            )
            .bind(&username)
            .fetch_optional(&state.db)
            .await?;

            if let Some(user) = user {
                return Ok(Caller::User(user));
            }
        }

        Err(AppError::Unauthorized(
            "Could not validate credentials".to_string(),
        ))
    }
}

/// Super-admin guard for the client-management and analytics surfaces.
/// Accepts only legacy JWTs belonging to active super admins.
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub User);

#[async_trait]
impl FromRequestParts<AppState> for SuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(parts)?;

        let username = service::verify_jwt(&state.config.secret_key, token, "access")
            .ok_or_else(|| unauthorized_admin())?;

        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users \
             WHERE username = $1 AND is_active = TRUE AND is_super_admin = TRUE",
        )
        .bind(&username)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(unauthorized_admin)?;

        Ok(SuperAdmin(user))
    }
}

fn unauthorized_admin() -> AppError {
    AppError::Unauthorized("Super admin authentication required".to_string())
}

fn forwarded_ip(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user_caller() -> Caller {
        Caller::User(User {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            username: "jane".to_string(),
            hashed_password: "hash".to_string(),
            is_active: true,
            is_super_admin: false,
            created_at: Utc::now(),
        })
    }

    fn client_caller(scopes: Vec<String>) -> Caller {
        let client_id = "hm_testclient".to_string();
        Caller::Client {
            client: OAuth2ClientRow {
                id: Uuid::new_v4(),
                client_id: client_id.clone(),
                client_secret_hash: "hash".to_string(),
                name: "Acme".to_string(),
                description: None,
                is_active: true,
                rate_limit_per_hour: 1000,
                last_used_at: None,
                created_by: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            token: AccessTokenRow {
                id: Uuid::new_v4(),
                token_hash: "digest".to_string(),
                client_id,
                user_id: None,
                scopes,
                is_active: true,
                expires_at: Utc::now() + chrono::Duration::hours(1),
                last_used_at: None,
                created_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_user_owner_id_is_uuid_string() {
        let caller = user_caller();
        let Caller::User(user) = &caller else {
            unreachable!()
        };
        assert_eq!(caller.owner_id(), user.id.to_string());
    }

    #[test]
    fn test_client_owner_id_is_client_id() {
        let caller = client_caller(vec![SCOPE_READ.to_string()]);
        assert_eq!(caller.owner_id(), "hm_testclient");
    }

    #[test]
    fn test_user_passes_any_scope() {
        assert!(user_caller().require_scope(SCOPE_WRITE).is_ok());
    }

    #[test]
    fn test_client_scope_enforced() {
        let caller = client_caller(vec![SCOPE_READ.to_string()]);
        assert!(caller.require_scope(SCOPE_READ).is_ok());
        assert!(matches!(
            caller.require_scope(SCOPE_WRITE),
            Err(AppError::Forbidden(_))
        ));
    }
}
