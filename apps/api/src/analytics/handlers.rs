//! Usage counters over client-owned data — super-admin only.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::auth::SuperAdmin;
use crate::errors::AppError;
use crate::models::client::OAuth2ClientRow;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClientStats {
    pub client_id: String,
    pub client_name: String,
    pub total_cvs: i64,
    pub total_jobs: i64,
    pub total_shortlists: i64,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SystemOverview {
    pub total_clients: i64,
    pub active_clients: i64,
    pub active_tokens: i64,
    pub total_cvs: i64,
    pub total_jobs: i64,
    pub total_shortlists: i64,
    pub system_status: String,
}

/// GET /analytics/client/{client_id}
pub async fn handle_client_stats(
    State(state): State<AppState>,
    _admin: SuperAdmin,
    Path(client_id): Path<String>,
) -> Result<Json<ClientStats>, AppError> {
    let client =
        sqlx::query_as::<_, OAuth2ClientRow>("SELECT * FROM oauth2_clients WHERE client_id = $1")
            .bind(&client_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    Ok(Json(client_statistics(&state.db, client).await?))
}

/// GET /analytics/overview
pub async fn handle_overview(
    State(state): State<AppState>,
    _admin: SuperAdmin,
) -> Result<Json<SystemOverview>, AppError> {
    let db = &state.db;
    Ok(Json(SystemOverview {
        total_clients: count(db, "SELECT COUNT(*) FROM oauth2_clients").await?,
        active_clients: count(
            db,
            "SELECT COUNT(*) FROM oauth2_clients WHERE is_active = TRUE",
        )
        .await?,
        active_tokens: count(
            db,
            "SELECT COUNT(*) FROM access_tokens WHERE is_active = TRUE",
        )
        .await?,
        total_cvs: count(db, "SELECT COUNT(*) FROM cvs").await?,
        total_jobs: count(db, "SELECT COUNT(*) FROM job_descriptions").await?,
        total_shortlists: count(db, "SELECT COUNT(*) FROM shortlists").await?,
        system_status: "operational".to_string(),
    }))
}

/// GET /analytics/clients
pub async fn handle_all_client_stats(
    State(state): State<AppState>,
    _admin: SuperAdmin,
) -> Result<Json<Vec<ClientStats>>, AppError> {
    let clients =
        sqlx::query_as::<_, OAuth2ClientRow>("SELECT * FROM oauth2_clients ORDER BY created_at")
            .fetch_all(&state.db)
            .await?;

    let mut summaries = Vec::with_capacity(clients.len());
    for client in clients {
        summaries.push(client_statistics(&state.db, client).await?);
    }

    Ok(Json(summaries))
}

async fn client_statistics(
    pool: &PgPool,
    client: OAuth2ClientRow,
) -> Result<ClientStats, AppError> {
    let total_cvs = count_owned(pool, "cvs", &client.client_id).await?;
    let total_jobs = count_owned(pool, "job_descriptions", &client.client_id).await?;
    let total_shortlists = count_owned(pool, "shortlists", &client.client_id).await?;

    Ok(ClientStats {
        client_id: client.client_id,
        client_name: client.name,
        total_cvs,
        total_jobs,
        total_shortlists,
        is_active: client.is_active,
        last_used_at: client.last_used_at,
        created_at: client.created_at,
    })
}

async fn count(pool: &PgPool, sql: &str) -> Result<i64, AppError> {
    Ok(sqlx::query_scalar(sql).fetch_one(pool).await?)
}

async fn count_owned(pool: &PgPool, table: &str, owner_id: &str) -> Result<i64, AppError> {
    // table names come from the fixed set above, never from input
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE owner_id = $1");
    Ok(sqlx::query_scalar(&sql)
        .bind(owner_id)
        .fetch_one(pool)
        .await?)
}
