use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Registered B2B API client for the OAuth2 client-credentials flow.
/// The plaintext secret is returned exactly once at creation/regeneration;
/// only its argon2 hash is stored.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OAuth2ClientRow {
    pub id: Uuid,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret_hash: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub rate_limit_per_hour: i32,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Issued bearer token. Stored as a sha256 digest; the opaque `hm_access_…`
/// value never touches the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AccessTokenRow {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub client_id: String,
    pub user_id: Option<Uuid>,
    pub scopes: Vec<String>,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One logged API request, feeding the per-client hourly rate cap and the
/// analytics counters.
#[allow(dead_code)]
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApiUsageRow {
    pub id: Uuid,
    pub client_id: String,
    pub endpoint: String,
    pub method: String,
    pub status_code: Option<i32>,
    pub response_time_ms: Option<f64>,
    pub ip_address: Option<String>,
    pub request_time: DateTime<Utc>,
}
