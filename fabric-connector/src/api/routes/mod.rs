//! API route modules.
//!
//! Paths are kept flat (`/fabric`, `/patterns`, ...) because the browser
//! extension and the Obsidian plugin call them directly.

pub mod catalog;
pub mod fabric;
pub mod health;

use axum::Router;

use crate::api::server::AppState;

/// Create the main API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(fabric::router())
        .merge(catalog::router())
        .merge(health::router())
        .with_state(state)
}
