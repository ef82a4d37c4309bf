//! # API Module
//!
//! HTTP handlers for the token launcher.
//!
//! ## Available Endpoints
//!
//! - `GET /api/health` - Liveness check
//! - `POST /api/rpc` - JSON-RPC endpoint for MCP tool calls
//! - `POST /api/actions/validate` - Check whether a message names a token
//! - `POST /api/actions/create-token` - Run the `CREATE_TOKEN` action

pub mod actions;
pub mod health;
pub mod rpc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Builds the full application router, mounted under `/api`.
pub fn create_router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/rpc", post(rpc::rpc_handler))
        .route("/actions/validate", post(actions::validate_handler))
        .route("/actions/create-token", post(actions::create_token_handler));

    Router::new()
        .nest("/api", api_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
