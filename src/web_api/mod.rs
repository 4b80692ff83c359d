//! WebAPI - REST API Endpoints
//!
//! ## Responsibilities
//!
//! - Expose the panel (view state, log, frame) to the browser page
//! - Translate page interactions into panel operations
//! - Request validation

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        device_url: state.config.device_url.clone(),
    })
}
