use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::job::JobDescriptionRow;

/// One matching run. Immutable after creation; deleting it cascades to its
/// results.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShortlistRow {
    pub id: Uuid,
    pub owner_id: String,
    pub job_description_id: Uuid,
    pub threshold: f64,
    pub created_at: DateTime<Utc>,
}

/// Per-candidate outcome of a run. `position` is the candidate's index in
/// the caller-supplied input order; `score` is raw cosine similarity stored
/// at full precision, not clamped.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShortlistResultRow {
    pub id: Uuid,
    pub shortlist_id: Uuid,
    pub cv_id: Uuid,
    pub position: i32,
    pub score: f64,
    pub match_summary: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub reasoning: String,
    pub recommendation: String,
}

/// A stored run together with its results, as returned by
/// `GET /shortlist/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct ShortlistDetail {
    #[serde(flatten)]
    pub shortlist: ShortlistRow,
    pub results: Vec<ShortlistResultRow>,
}

/// Assembled outcome of one shortlisting invocation. Both partitions keep
/// the candidate input order; the three counts always satisfy
/// `shortlisted_count + rejected_count == total_candidates`.
#[derive(Debug, Clone, Serialize)]
pub struct ShortlistReport {
    pub shortlist_id: Uuid,
    pub job_description: JobDescriptionRow,
    pub shortlisted: Vec<ShortlistResultRow>,
    pub rejected: Vec<ShortlistResultRow>,
    pub threshold: f64,
    pub total_candidates: usize,
    pub shortlisted_count: usize,
    pub rejected_count: usize,
}
