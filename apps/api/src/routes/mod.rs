pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::tracker::handlers;
use crate::transfer::handlers as transfer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Projects
        .route(
            "/api/projects",
            get(handlers::handle_list_projects).post(handlers::handle_create_project),
        )
        .route(
            "/api/projects/:id",
            get(handlers::handle_get_project)
                .put(handlers::handle_update_project)
                .delete(handlers::handle_delete_project),
        )
        // Companies
        .route(
            "/api/projects/:id/companies",
            get(handlers::handle_list_companies).post(handlers::handle_create_company),
        )
        .route(
            "/api/companies/:id",
            get(handlers::handle_get_company)
                .put(handlers::handle_update_company)
                .delete(handlers::handle_delete_company),
        )
        // Stages
        .route(
            "/api/companies/:id/stages",
            get(handlers::handle_list_stages).post(handlers::handle_create_stage),
        )
        .route(
            "/api/stages/:id",
            get(handlers::handle_get_stage)
                .put(handlers::handle_update_stage)
                .delete(handlers::handle_delete_stage),
        )
        // CSV import / export
        .route("/api/projects/:id/import", post(transfer::handle_import))
        .route("/api/projects/:id/export", get(transfer::handle_export))
        .with_state(state)
}
