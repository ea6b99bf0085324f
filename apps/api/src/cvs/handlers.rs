use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde_json::{json, Value};
use sqlx::types::Json as SqlJson;
use tracing::info;
use uuid::Uuid;

use crate::auth::{Caller, SCOPE_READ, SCOPE_WRITE};
use crate::errors::AppError;
use crate::extraction::extract_document;
use crate::models::cv::CvRow;
use crate::state::AppState;
use crate::uploads::read_file_field;

/// POST /cvs/upload
///
/// Extracts text from the uploaded document and computes the embedding that
/// every later shortlisting run against this CV will reuse. An embedding
/// provider failure aborts the upload — there is no fallback embedding.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    caller: Caller,
    mut multipart: Multipart,
) -> Result<Json<CvRow>, AppError> {
    caller.require_scope(SCOPE_WRITE)?;

    let (filename, bytes) = read_file_field(&mut multipart).await?;
    let doc = extract_document(&bytes, &filename)?;

    let embedding = state
        .llm
        .embed(&doc.content)
        .await
        .map_err(|e| AppError::Provider(format!("CV embedding failed: {e}")))?;

    let cv = sqlx::query_as::<_, CvRow>(
        r#"
        INSERT INTO cvs (owner_id, filename, candidate_name, contact_info, content, embedding)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(caller.owner_id())
    .bind(&filename)
    .bind(&doc.candidate_name)
    .bind(doc.contact_info.clone().map(SqlJson))
    .bind(&doc.content)
    .bind(SqlJson(embedding))
    .fetch_one(&state.db)
    .await?;

    info!("stored CV {} ({filename})", cv.id);
    Ok(Json(cv))
}

/// GET /cvs
pub async fn handle_list_cvs(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<CvRow>>, AppError> {
    caller.require_scope(SCOPE_READ)?;

    let cvs = sqlx::query_as::<_, CvRow>(
        "SELECT * FROM cvs WHERE owner_id = $1 ORDER BY created_at DESC",
    )
    .bind(caller.owner_id())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(cvs))
}

/// GET /cvs/{cv_id}
pub async fn handle_get_cv(
    State(state): State<AppState>,
    caller: Caller,
    Path(cv_id): Path<Uuid>,
) -> Result<Json<CvRow>, AppError> {
    caller.require_scope(SCOPE_READ)?;

    let cv = sqlx::query_as::<_, CvRow>("SELECT * FROM cvs WHERE id = $1 AND owner_id = $2")
        .bind(cv_id)
        .bind(caller.owner_id())
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("CV not found".to_string()))?;

    Ok(Json(cv))
}

/// DELETE /cvs/{cv_id}
pub async fn handle_delete_cv(
    State(state): State<AppState>,
    caller: Caller,
    Path(cv_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    caller.require_scope(SCOPE_WRITE)?;

    let deleted = sqlx::query("DELETE FROM cvs WHERE id = $1 AND owner_id = $2")
        .bind(cv_id)
        .bind(caller.owner_id())
        .execute(&state.db)
        .await?
        .rows_affected();

    if deleted == 0 {
        return Err(AppError::NotFound("CV not found".to_string()));
    }

    Ok(Json(json!({ "message": "CV deleted successfully" })))
}
