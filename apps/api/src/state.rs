use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::analyzer::MatchAnalyzer;

/// Shared application state injected into all route handlers via Axum
/// extractors. Services are constructed once at startup and live for the
/// process — no ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    pub analyzer: MatchAnalyzer,
    pub config: Config,
}
