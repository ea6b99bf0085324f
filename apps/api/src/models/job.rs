use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JobDescriptionRow {
    pub id: Uuid,
    pub owner_id: String,
    pub title: String,
    pub summary: String,
    pub key_requirements: Vec<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
