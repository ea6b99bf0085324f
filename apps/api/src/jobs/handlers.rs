use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::{Caller, SCOPE_READ, SCOPE_WRITE};
use crate::errors::AppError;
use crate::extraction::extract_document;
use crate::models::job::JobDescriptionRow;
use crate::state::AppState;
use crate::uploads::read_file_field;

/// Uploaded job files shorter than this are treated as parse failures.
const MIN_JOB_CONTENT_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct JobCreateRequest {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub content: String,
}

/// POST /jobs
///
/// Creates a job description from structured input. Key requirements are
/// extracted by the analyzer; its degradation sentinel never fails creation.
pub async fn handle_create_job(
    State(state): State<AppState>,
    caller: Caller,
    Json(req): Json<JobCreateRequest>,
) -> Result<Json<JobDescriptionRow>, AppError> {
    caller.require_scope(SCOPE_WRITE)?;

    if req.content.trim().is_empty() {
        return Err(AppError::Validation(
            "job description content must not be empty".to_string(),
        ));
    }

    let key_requirements = state.analyzer.extract_requirements(&req.content).await;

    let job = insert_job(
        &state,
        &caller.owner_id(),
        &req.title,
        &req.summary,
        &key_requirements,
        &req.content,
    )
    .await?;

    Ok(Json(job))
}

/// POST /jobs/upload
///
/// Creates a job description from an uploaded document; title, summary and
/// requirements are structured out of the raw text by the analyzer.
pub async fn handle_upload_job(
    State(state): State<AppState>,
    caller: Caller,
    mut multipart: Multipart,
) -> Result<Json<JobDescriptionRow>, AppError> {
    caller.require_scope(SCOPE_WRITE)?;

    let (filename, bytes) = read_file_field(&mut multipart).await?;
    let doc = extract_document(&bytes, &filename)?;

    if doc.content.trim().chars().count() < MIN_JOB_CONTENT_CHARS {
        return Err(AppError::Extraction(
            "Could not extract meaningful content from the file".to_string(),
        ));
    }

    let parsed = state.analyzer.parse_job(&doc.content).await;

    let job = insert_job(
        &state,
        &caller.owner_id(),
        &parsed.title,
        &parsed.summary,
        &parsed.key_requirements,
        &doc.content,
    )
    .await?;

    Ok(Json(job))
}

async fn insert_job(
    state: &AppState,
    owner_id: &str,
    title: &str,
    summary: &str,
    key_requirements: &[String],
    content: &str,
) -> Result<JobDescriptionRow, AppError> {
    let job = sqlx::query_as::<_, JobDescriptionRow>(
        r#"
        INSERT INTO job_descriptions (owner_id, title, summary, key_requirements, content)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(owner_id)
    .bind(title)
    .bind(summary)
    .bind(key_requirements)
    .bind(content)
    .fetch_one(&state.db)
    .await?;

    info!("stored job description {} ({})", job.id, job.title);
    Ok(job)
}

/// GET /jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<JobDescriptionRow>>, AppError> {
    caller.require_scope(SCOPE_READ)?;

    let jobs = sqlx::query_as::<_, JobDescriptionRow>(
        "SELECT * FROM job_descriptions WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(caller.owner_id())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(jobs))
}

/// GET /jobs/{job_id}
pub async fn handle_get_job(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobDescriptionRow>, AppError> {
    caller.require_scope(SCOPE_READ)?;

    let job = sqlx::query_as::<_, JobDescriptionRow>(
        "SELECT * FROM job_descriptions WHERE id = $1 AND owner_id = $2",
    )
    .bind(job_id)
    .bind(caller.owner_id())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Job description not found".to_string()))?;

    Ok(Json(job))
}

/// DELETE /jobs/{job_id} — dependent shortlist runs cascade away with it.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    caller: Caller,
    Path(job_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    caller.require_scope(SCOPE_WRITE)?;

    let deleted = sqlx::query("DELETE FROM job_descriptions WHERE id = $1 AND owner_id = $2")
        .bind(job_id)
        .bind(caller.owner_id())
        .execute(&state.db)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("Job description not found".to_string()));
    }

    Ok(Json(json!({ "message": "Job description deleted successfully" })))
}
