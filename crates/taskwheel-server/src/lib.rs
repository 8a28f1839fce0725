//! HTTP wrapper around [`taskwheel_core`].
//!
//! Thin glue: request routing, JSON marshaling, CORS and error-to-status
//! mapping. All task and recurrence semantics live in the core crate.

pub mod api;
pub mod config;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Builds the API router. Kept separate from `main` so tests can drive the
/// service without binding a socket.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/nextdate", get(api::next_date))
        .route(
            "/api/task",
            post(api::add_task)
                .get(api::get_task)
                .put(api::update_task)
                .delete(api::delete_task),
        )
        .route("/api/task/done", post(api::complete_task))
        .route("/api/tasks", get(api::list_tasks))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
