use crate::core::ConfigProvider;
use crate::http::handlers;
use crate::http::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub fn build_router<C: ConfigProvider>(state: AppState, config: &C) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/preview", post(handlers::preview))
        .route("/convert", post(handlers::convert))
        .route("/convert/file", post(handlers::convert_file))
        .layer(DefaultBodyLimit::max(config.max_body_bytes()))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
