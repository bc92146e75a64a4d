//! Activity Feed HTTP Routes

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::coordinator::Coordinator;
use crate::roster::ActivityEntry;

use super::{error_response, parse_shift, ApiError};

const DEFAULT_LIMIT: usize = 50;

/// Activity state shared across handlers
pub struct ActivityState {
    pub coordinator: Arc<Coordinator>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    #[serde(default)]
    pub shift: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ActivityListResponse {
    pub entries: Vec<ActivityEntry>,
    pub total: usize,
}

/// Create activity routes
pub fn activity_routes(state: Arc<ActivityState>) -> Router {
    Router::new()
        .route("/", get(list_handler))
        .with_state(state)
}

async fn list_handler(
    Query(query): Query<ActivityQuery>,
    State(state): State<Arc<ActivityState>>,
) -> Result<Json<ActivityListResponse>, ApiError> {
    let shift = match &query.shift {
        Some(s) => Some(parse_shift(s)?),
        None => None,
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    state
        .coordinator
        .activity(shift, limit)
        .map(|entries| {
            let total = entries.len();
            Json(ActivityListResponse { entries, total })
        })
        .map_err(error_response)
}
