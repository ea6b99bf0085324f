use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Best-effort contact fields pulled out of the CV text at upload time.
/// Absent fields stay null; a CV with neither field stores NULL for the
/// whole structure rather than an empty object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }
}

/// Stored CV. The embedding is computed once at ingestion and reused for
/// every subsequent shortlisting run; it is never exposed over the API and
/// never silently recomputed during matching.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CvRow {
    pub id: Uuid,
    pub owner_id: String,
    pub filename: String,
    pub candidate_name: Option<String>,
    pub contact_info: Option<Json<ContactInfo>>,
    pub content: String,
    #[serde(skip_serializing)]
    pub embedding: Json<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}
