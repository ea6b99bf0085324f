//! OAuth2 client management — super-admin only.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::auth::{service, SuperAdmin};
use crate::errors::AppError;
use crate::models::client::{AccessTokenRow, OAuth2ClientRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ClientCreateRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_rate_limit")]
    pub rate_limit_per_hour: i32,
}

fn default_rate_limit() -> i32 {
    1000
}

/// Client row plus the plaintext secret — returned only at creation and
/// secret regeneration.
#[derive(Debug, Serialize)]
pub struct ClientCreatedResponse {
    #[serde(flatten)]
    pub client: OAuth2ClientRow,
    pub client_secret: String,
}

/// POST /clients
pub async fn handle_create_client(
    State(state): State<AppState>,
    SuperAdmin(admin): SuperAdmin,
    Json(req): Json<ClientCreateRequest>,
) -> Result<Json<ClientCreatedResponse>, AppError> {
    let (client_id, client_secret) = service::generate_client_credentials();
    let secret_hash = service::hash_password(&client_secret)?;

    let client = sqlx::query_as::<_, OAuth2ClientRow>(
        r#"
        INSERT INTO oauth2_clients
            (client_id, client_secret_hash, name, description, rate_limit_per_hour, created_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&client_id)
    .bind(&secret_hash)
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.rate_limit_per_hour)
    .bind(admin.id)
    .fetch_one(&state.db)
    .await?;

    info!("created OAuth2 client {client_id} ({})", req.name);
    Ok(Json(ClientCreatedResponse {
        client,
        client_secret,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// GET /clients
pub async fn handle_list_clients(
    State(state): State<AppState>,
    _admin: SuperAdmin,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<OAuth2ClientRow>>, AppError> {
    let clients = sqlx::query_as::<_, OAuth2ClientRow>(
        "SELECT * FROM oauth2_clients ORDER BY created_at ASC OFFSET $1 LIMIT $2",
    )
    .bind(page.skip)
    .bind(page.limit)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(clients))
}

/// GET /clients/{client_id}
pub async fn handle_get_client(
    State(state): State<AppState>,
    _admin: SuperAdmin,
    Path(client_id): Path<String>,
) -> Result<Json<OAuth2ClientRow>, AppError> {
    let client = fetch_client(&state, &client_id).await?;
    Ok(Json(client))
}

#[derive(Debug, Deserialize)]
pub struct ClientUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub rate_limit_per_hour: Option<i32>,
}

/// PUT /clients/{client_id}
pub async fn handle_update_client(
    State(state): State<AppState>,
    _admin: SuperAdmin,
    Path(client_id): Path<String>,
    Json(req): Json<ClientUpdateRequest>,
) -> Result<Json<OAuth2ClientRow>, AppError> {
    let client = sqlx::query_as::<_, OAuth2ClientRow>(
        r#"
        UPDATE oauth2_clients
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            is_active = COALESCE($4, is_active),
            rate_limit_per_hour = COALESCE($5, rate_limit_per_hour),
            updated_at = now()
        WHERE client_id = $1
        RETURNING *
        "#,
    )
    .bind(&client_id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.is_active)
    .bind(req.rate_limit_per_hour)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    Ok(Json(client))
}

/// POST /clients/{client_id}/regenerate-secret
pub async fn handle_regenerate_secret(
    State(state): State<AppState>,
    _admin: SuperAdmin,
    Path(client_id): Path<String>,
) -> Result<Json<ClientCreatedResponse>, AppError> {
    let (_, client_secret) = service::generate_client_credentials();
    let secret_hash = service::hash_password(&client_secret)?;

    let client = sqlx::query_as::<_, OAuth2ClientRow>(
        r#"
        UPDATE oauth2_clients
        SET client_secret_hash = $2, updated_at = now()
        WHERE client_id = $1
        RETURNING *
        "#,
    )
    .bind(&client_id)
    .bind(&secret_hash)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    info!("regenerated secret for client {client_id}");
    Ok(Json(ClientCreatedResponse {
        client,
        client_secret,
    }))
}

/// DELETE /clients/{client_id} — removes the client, its tokens and all of
/// its owned data in one transaction.
pub async fn handle_delete_client(
    State(state): State<AppState>,
    _admin: SuperAdmin,
    Path(client_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    // 404 before anything is touched
    fetch_client(&state, &client_id).await?;

    let mut tx = state.db.begin().await?;
    sqlx::query("DELETE FROM shortlists WHERE owner_id = $1")
        .bind(&client_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM cvs WHERE owner_id = $1")
        .bind(&client_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM job_descriptions WHERE owner_id = $1")
        .bind(&client_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM oauth2_clients WHERE client_id = $1")
        .bind(&client_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!("deleted client {client_id} and all associated data");
    Ok(Json(json!({
        "message": "Client and all associated data deleted successfully"
    })))
}

#[derive(Debug, Deserialize)]
pub struct TokenListQuery {
    pub client_id: Option<String>,
    #[serde(default = "default_true")]
    pub active_only: bool,
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_true() -> bool {
    true
}

/// GET /clients/tokens
pub async fn handle_list_tokens(
    State(state): State<AppState>,
    _admin: SuperAdmin,
    Query(query): Query<TokenListQuery>,
) -> Result<Json<Vec<AccessTokenRow>>, AppError> {
    let tokens = sqlx::query_as::<_, AccessTokenRow>(
        r#"
        SELECT * FROM access_tokens
        WHERE ($1::text IS NULL OR client_id = $1)
          AND (NOT $2 OR is_active = TRUE)
        ORDER BY created_at DESC
        OFFSET $3 LIMIT $4
        "#,
    )
    .bind(&query.client_id)
    .bind(query.active_only)
    .bind(query.skip)
    .bind(query.limit)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(tokens))
}

async fn fetch_client(state: &AppState, client_id: &str) -> Result<OAuth2ClientRow, AppError> {
    sqlx::query_as::<_, OAuth2ClientRow>("SELECT * FROM oauth2_clients WHERE client_id = $1")
        .bind(client_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))
}
