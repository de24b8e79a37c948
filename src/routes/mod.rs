//! HTTP routes for the clients API.
//!
//! - `clients`: customer CRUD and bulk send
//! - `health`: `/ping`

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware;
use crate::state::AppState;

pub mod clients;
pub mod health;

/// Builds the full router: routes, then correlation ids, then the auth gate outermost.
pub fn router(state: AppState) -> Router {
    let auth_cfg = Arc::new(state.config.auth.clone());
    let tracing_cfg = Arc::new(state.config.tracing.clone());
    let body_limit = state.config.server.body_limit_bytes;

    Router::new()
        .route("/ping", get(health::ping))
        .route("/api/clients", post(clients::create_customer).get(clients::find_customers))
        .route(
            "/api/clients/send",
            post(clients::mail_clients)
                .get(clients::send_as_customer_id)
                .delete(clients::send_as_customer_id),
        )
        .route("/api/clients/{id}", get(clients::get_customer).delete(clients::delete_customer))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        // Layers wrap outside-in: the last one added runs first
        .layer(from_fn_with_state(tracing_cfg, middleware::request_id::request_id_middleware))
        .layer(from_fn_with_state(auth_cfg, middleware::auth::auth_middleware))
        .layer(TraceLayer::new_for_http())
}
