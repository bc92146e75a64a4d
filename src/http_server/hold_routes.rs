//! Scheduled-Hold HTTP Routes
//!
//! Calendar lifecycle: list, schedule, complete, skip, delete.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coordinator::{Coordinator, ScheduleHoldRequest};
use crate::roster::{HoldStatus, ScheduledHold};
use crate::store::HoldQuery;

use super::{error_response, parse_shift, ApiError, ErrorResponse};

// ==================
// Shared State
// ==================

/// Holds state shared across handlers
pub struct HoldsState {
    pub coordinator: Arc<Coordinator>,
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct HoldListQuery {
    #[serde(default)]
    pub shift: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CompleteHoldBody {
    #[serde(default)]
    pub new_position: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct HoldsListResponse {
    pub holds: Vec<ScheduledHold>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================
// Hold Routes
// ==================

/// Create hold routes
pub fn hold_routes(state: Arc<HoldsState>) -> Router {
    Router::new()
        .route("/", get(list_handler).post(schedule_handler))
        .route("/:id/complete", post(complete_handler))
        .route("/:id/skip", post(skip_handler))
        .route("/:id", delete(delete_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn list_handler(
    Query(query): Query<HoldListQuery>,
    State(state): State<Arc<HoldsState>>,
) -> Result<Json<HoldsListResponse>, ApiError> {
    let mut filter = HoldQuery {
        from: query.from,
        to: query.to,
        ..Default::default()
    };
    if let Some(shift) = &query.shift {
        filter.shift = Some(parse_shift(shift)?);
    }
    if let Some(status) = &query.status {
        filter.status = Some(status.parse::<HoldStatus>().map_err(|e| {
            (
                axum::http::StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e,
                    code: "INVALID_STATUS",
                }),
            )
        })?);
    }

    state
        .coordinator
        .holds(&filter)
        .map(|holds| {
            let total = holds.len();
            Json(HoldsListResponse { holds, total })
        })
        .map_err(error_response)
}

async fn schedule_handler(
    State(state): State<Arc<HoldsState>>,
    Json(req): Json<ScheduleHoldRequest>,
) -> Result<Json<ScheduledHold>, ApiError> {
    state
        .coordinator
        .schedule_hold(req)
        .map(Json)
        .map_err(error_response)
}

async fn complete_handler(
    Path(id): Path<Uuid>,
    State(state): State<Arc<HoldsState>>,
    body: Option<Json<CompleteHoldBody>>,
) -> Result<Json<ScheduledHold>, ApiError> {
    let new_position = body.and_then(|Json(b)| b.new_position);
    state
        .coordinator
        .complete_scheduled_hold(id, new_position)
        .map(Json)
        .map_err(error_response)
}

async fn skip_handler(
    Path(id): Path<Uuid>,
    State(state): State<Arc<HoldsState>>,
) -> Result<Json<ScheduledHold>, ApiError> {
    state
        .coordinator
        .skip_scheduled_hold(id)
        .map(Json)
        .map_err(error_response)
}

async fn delete_handler(
    Path(id): Path<Uuid>,
    State(state): State<Arc<HoldsState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .coordinator
        .delete_scheduled_hold(id)
        .map(|_| {
            Json(MessageResponse {
                message: "Scheduled hold deleted".to_string(),
            })
        })
        .map_err(error_response)
}
