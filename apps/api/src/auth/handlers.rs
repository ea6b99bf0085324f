use axum::{extract::State, Form, Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::auth::{service, Caller, SCOPE_READ, SCOPE_WRITE};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
pub struct ClientCredentialsToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// POST /auth/token — OAuth2 client-credentials flow, the main API
/// authentication method.
pub async fn handle_token(
    State(state): State<AppState>,
    Form(req): Form<TokenRequest>,
) -> Result<Json<ClientCredentialsToken>, AppError> {
    if req.grant_type != "client_credentials" {
        return Err(AppError::Validation(
            "Only 'client_credentials' grant type is supported".to_string(),
        ));
    }

    let client = service::verify_client_credentials(&state.db, &req.client_id, &req.client_secret)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid client credentials".to_string()))?;

    let expires_in = state.config.oauth2_access_token_expire_seconds;
    let scopes = vec![SCOPE_READ.to_string(), SCOPE_WRITE.to_string()];
    let (access_token, _) =
        service::issue_access_token(&state.db, &client.client_id, &scopes, expires_in).await?;

    Ok(Json(ClientCredentialsToken {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RevokeRequest {
    pub token: String,
}

/// POST /auth/revoke — deactivates an access token.
pub async fn handle_revoke(
    State(state): State<AppState>,
    _caller: Caller,
    Form(req): Form<RevokeRequest>,
) -> Result<Json<Value>, AppError> {
    let revoked = service::revoke_token(&state.db, &req.token).await?;
    Ok(Json(json!({ "revoked": revoked })))
}

#[derive(Debug, Deserialize)]
pub struct SuperAdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// POST /auth/super-admin/login — legacy JWT issuance for dashboard access.
pub async fn handle_super_admin_login(
    State(state): State<AppState>,
    Form(req): Form<SuperAdminLoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let user = service::authenticate_super_admin(&state.db, &req.username, &req.password)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid super admin credentials".to_string()))?;

    Ok(Json(issue_jwt_pair(&state, &user.username)?))
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// POST /auth/super-admin/refresh — rotates the JWT pair.
pub async fn handle_super_admin_refresh(
    State(state): State<AppState>,
    Form(req): Form<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let username = service::verify_jwt(&state.config.secret_key, &req.refresh_token, "refresh")
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let exists: Option<(uuid::Uuid,)> = sqlx::query_as(
        "SELECT id FROM users \
         WHERE username = $1 AND is_super_admin = TRUE AND is_active = TRUE",
    )
    .bind(&username)
    .fetch_optional(&state.db)
    .await?;

    if exists.is_none() {
        return Err(AppError::Unauthorized(
            "Super admin not found or inactive".to_string(),
        ));
    }

    Ok(Json(issue_jwt_pair(&state, &username)?))
}

fn issue_jwt_pair(state: &AppState, username: &str) -> Result<TokenPair, AppError> {
    let access_token = service::create_jwt(
        &state.config.secret_key,
        username,
        "access",
        Duration::minutes(state.config.access_token_expire_minutes),
    )?;
    let refresh_token = service::create_jwt(
        &state.config.secret_key,
        username,
        "refresh",
        Duration::days(state.config.refresh_token_expire_days),
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
    })
}
