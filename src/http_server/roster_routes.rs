//! Roster HTTP Routes
//!
//! Rotation queries plus every roster mutation: add, complete-hold,
//! voluntary skip, deactivate/reactivate, availability, transfer, manual
//! reorder, removal.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coordinator::{
    CompleteHoldRequest, Coordinator, NewFirefighter, RosterView,
};
use crate::roster::{Firefighter, ScheduledHold, Shift};

use super::{error_response, parse_shift, ApiError};

// ==================
// Shared State
// ==================

/// Roster state shared across handlers
pub struct RosterState {
    pub coordinator: Arc<Coordinator>,
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub shift: Shift,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================
// Roster Routes
// ==================

/// Create roster routes
pub fn roster_routes(state: Arc<RosterState>) -> Router {
    Router::new()
        .route("/", post(add_handler))
        .route("/shift/:shift", get(roster_handler))
        .route("/shift/:shift/order", put(reorder_handler))
        .route("/:id/complete-hold", post(complete_hold_handler))
        .route("/:id/move-to-bottom", post(move_to_bottom_handler))
        .route("/:id/deactivate", post(deactivate_handler))
        .route("/:id/reactivate", post(reactivate_handler))
        .route("/:id/availability", post(availability_handler))
        .route("/:id/transfer", post(transfer_handler))
        .route("/:id", delete(remove_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn roster_handler(
    Path(shift): Path<String>,
    Query(query): Query<RosterQuery>,
    State(state): State<Arc<RosterState>>,
) -> Result<Json<RosterView>, ApiError> {
    let shift = parse_shift(&shift)?;
    state
        .coordinator
        .roster(shift, query.include_inactive)
        .map(Json)
        .map_err(error_response)
}

async fn add_handler(
    State(state): State<Arc<RosterState>>,
    Json(req): Json<NewFirefighter>,
) -> Result<Json<Firefighter>, ApiError> {
    state
        .coordinator
        .add_firefighter(req)
        .map(Json)
        .map_err(error_response)
}

async fn complete_hold_handler(
    Path(id): Path<Uuid>,
    State(state): State<Arc<RosterState>>,
    Json(req): Json<CompleteHoldRequest>,
) -> Result<Json<ScheduledHold>, ApiError> {
    state
        .coordinator
        .complete_hold(id, req)
        .map(Json)
        .map_err(error_response)
}

async fn move_to_bottom_handler(
    Path(id): Path<Uuid>,
    State(state): State<Arc<RosterState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .coordinator
        .move_to_bottom(id)
        .map(|_| {
            Json(MessageResponse {
                message: "Moved to end of rotation".to_string(),
            })
        })
        .map_err(error_response)
}

async fn deactivate_handler(
    Path(id): Path<Uuid>,
    State(state): State<Arc<RosterState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .coordinator
        .deactivate(id)
        .map(|_| {
            Json(MessageResponse {
                message: "Deactivated".to_string(),
            })
        })
        .map_err(error_response)
}

async fn reactivate_handler(
    Path(id): Path<Uuid>,
    State(state): State<Arc<RosterState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .coordinator
        .reactivate(id)
        .map(|_| {
            Json(MessageResponse {
                message: "Reactivated at position 1".to_string(),
            })
        })
        .map_err(error_response)
}

async fn availability_handler(
    Path(id): Path<Uuid>,
    State(state): State<Arc<RosterState>>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .coordinator
        .set_availability(id, req.is_available)
        .map(|_| {
            Json(MessageResponse {
                message: "Availability updated".to_string(),
            })
        })
        .map_err(error_response)
}

async fn transfer_handler(
    Path(id): Path<Uuid>,
    State(state): State<Arc<RosterState>>,
    Json(req): Json<TransferRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .coordinator
        .transfer(id, req.shift)
        .map(|_| {
            Json(MessageResponse {
                message: format!("Transferred to Shift {}", req.shift),
            })
        })
        .map_err(error_response)
}

async fn reorder_handler(
    Path(shift): Path<String>,
    State(state): State<Arc<RosterState>>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let shift = parse_shift(&shift)?;
    state
        .coordinator
        .reorder(shift, &req.order)
        .map(|_| {
            Json(MessageResponse {
                message: "Roster order updated".to_string(),
            })
        })
        .map_err(error_response)
}

async fn remove_handler(
    Path(id): Path<Uuid>,
    State(state): State<Arc<RosterState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .coordinator
        .remove_firefighter(id)
        .map(|_| {
            Json(MessageResponse {
                message: "Removed - hold history preserved".to_string(),
            })
        })
        .map_err(error_response)
}
