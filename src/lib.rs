use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod gitignore;
pub mod logger;
pub mod middleware;
pub mod routes;

pub use error::LoggerError;
pub use logger::{Level, Logger};

#[derive(Clone)]
pub struct AppState {
    pub logger: Arc<Logger>,
}

/// Demo router: every route is wrapped by the request-logging middleware.
pub fn create_app(state: AppState) -> Router {
    let logger = state.logger.clone();

    let router = Router::new()
        .route("/", get(routes::index))
        .with_state(state);

    middleware::wrap(logger, router)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
