use axum::extract::State;
use tracing::info;

use crate::AppState;

/// `GET /`
pub async fn index(State(state): State<AppState>) -> &'static str {
    info!("Index requested");
    state.logger.info("Request to /");
    "Hello, World!"
}
