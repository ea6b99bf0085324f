pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{analytics, auth, clients, cvs, jobs, matching};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::welcome_handler))
        .route("/health", get(health::health_handler))
        // Authentication
        .route("/auth/token", post(auth::handlers::handle_token))
        .route("/auth/revoke", post(auth::handlers::handle_revoke))
        .route(
            "/auth/super-admin/login",
            post(auth::handlers::handle_super_admin_login),
        )
        .route(
            "/auth/super-admin/refresh",
            post(auth::handlers::handle_super_admin_refresh),
        )
        // CV management
        .route("/cvs/upload", post(cvs::handlers::handle_upload_cv))
        .route("/cvs", get(cvs::handlers::handle_list_cvs))
        .route(
            "/cvs/:cv_id",
            get(cvs::handlers::handle_get_cv).delete(cvs::handlers::handle_delete_cv),
        )
        // Job descriptions
        .route(
            "/jobs",
            post(jobs::handlers::handle_create_job).get(jobs::handlers::handle_list_jobs),
        )
        .route("/jobs/upload", post(jobs::handlers::handle_upload_job))
        .route(
            "/jobs/:job_id",
            get(jobs::handlers::handle_get_job).delete(jobs::handlers::handle_delete_job),
        )
        // Shortlisting
        .route(
            "/shortlist",
            post(matching::handlers::handle_create_shortlist)
                .get(matching::handlers::handle_list_shortlists),
        )
        .route(
            "/shortlist/:shortlist_id",
            get(matching::handlers::handle_get_shortlist)
                .delete(matching::handlers::handle_delete_shortlist),
        )
        .route(
            "/shortlist/:shortlist_id/report",
            get(matching::handlers::handle_get_shortlist_report),
        )
        // Client management (super admin)
        .route(
            "/clients",
            post(clients::handlers::handle_create_client)
                .get(clients::handlers::handle_list_clients),
        )
        .route("/clients/tokens", get(clients::handlers::handle_list_tokens))
        .route(
            "/clients/:client_id",
            get(clients::handlers::handle_get_client)
                .put(clients::handlers::handle_update_client)
                .delete(clients::handlers::handle_delete_client),
        )
        .route(
            "/clients/:client_id/regenerate-secret",
            post(clients::handlers::handle_regenerate_secret),
        )
        // Analytics (super admin)
        .route(
            "/analytics/client/:client_id",
            get(analytics::handlers::handle_client_stats),
        )
        .route(
            "/analytics/overview",
            get(analytics::handlers::handle_overview),
        )
        .route(
            "/analytics/clients",
            get(analytics::handlers::handle_all_client_stats),
        )
        .with_state(state)
}
