//! # HTTP Server Module
//!
//! The REST + WebSocket surface of holdline. One router per concern,
//! combined by [`server::HttpServer`]:
//!
//! - `/health` - Health check
//! - `/roster/*` - Rotation queries and roster mutations
//! - `/holds/*` - Scheduled-hold lifecycle
//! - `/activity/*` - Activity feed
//! - `/realtime/*` - Change-event WebSocket and stats

pub mod activity_routes;
pub mod config;
pub mod hold_routes;
pub mod realtime_routes;
pub mod roster_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::coordinator::CoordinatorError;
use crate::roster::Shift;

/// JSON error body shared by every route module.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// Rejection type used by all handlers.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps a coordinator error to its HTTP response.
pub(crate) fn error_response(err: CoordinatorError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code: err.code(),
        }),
    )
}

/// Parses a shift path/query segment, rejecting unknown letters with 400.
pub(crate) fn parse_shift(s: &str) -> Result<Shift, ApiError> {
    s.parse::<Shift>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Unknown shift: {}", s),
                code: "INVALID_SHIFT",
            }),
        )
    })
}
