use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::{Caller, SCOPE_READ, SCOPE_WRITE};
use crate::errors::AppError;
use crate::matching::orchestrator;
use crate::models::shortlist::{ShortlistDetail, ShortlistReport, ShortlistRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ShortlistCreateRequest {
    pub job_description_id: Uuid,
    pub cv_ids: Vec<Uuid>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.6
}

/// POST /shortlist — runs the full matching pipeline and returns the report.
pub async fn handle_create_shortlist(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<ShortlistCreateRequest>,
) -> Result<Json<ShortlistReport>, AppError> {
    caller.require_scope(SCOPE_WRITE)?;

    let report = orchestrator::run_shortlisting(
        &state.db,
        &state.llm,
        &state.analyzer,
        &caller.owner_id(),
        req.job_description_id,
        &req.cv_ids,
        req.threshold,
    )
    .await?;

    Ok(Json(report))
}

/// GET /shortlist — prior runs for the caller, newest first.
pub async fn handle_list_shortlists(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<ShortlistRow>>, AppError> {
    caller.require_scope(SCOPE_READ)?;
    let history = orchestrator::get_shortlist_history(&state.db, &caller.owner_id()).await?;
    Ok(Json(history))
}

/// GET /shortlist/{shortlist_id}
pub async fn handle_get_shortlist(
    State(state): State<AppState>,
    caller: Caller,
    Path(shortlist_id): Path<Uuid>,
) -> Result<Json<ShortlistDetail>, AppError> {
    caller.require_scope(SCOPE_READ)?;
    let detail =
        orchestrator::get_shortlist_detail(&state.db, &caller.owner_id(), shortlist_id).await?;
    Ok(Json(detail))
}

/// GET /shortlist/{shortlist_id}/report
pub async fn handle_get_shortlist_report(
    State(state): State<AppState>,
    caller: Caller,
    Path(shortlist_id): Path<Uuid>,
) -> Result<Json<ShortlistReport>, AppError> {
    caller.require_scope(SCOPE_READ)?;
    let report =
        orchestrator::build_stored_report(&state.db, &caller.owner_id(), shortlist_id).await?;
    Ok(Json(report))
}

/// DELETE /shortlist/{shortlist_id}
pub async fn handle_delete_shortlist(
    State(state): State<AppState>,
    caller: Caller,
    Path(shortlist_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    caller.require_scope(SCOPE_WRITE)?;
    orchestrator::delete_shortlist(&state.db, &caller.owner_id(), shortlist_id).await?;
    Ok(Json(json!({ "message": "Shortlist deleted successfully" })))
}
