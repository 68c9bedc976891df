pub mod health;
pub mod log;
pub mod view;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    BoxError, Json, Router,
};
use serde_json::json;
use std::time::Duration;
use tower::{timeout::error::Elapsed, timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;
use crate::services::auth;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        view::get_view,
        log::post_log,
    ),
    components(
        schemas(
            crate::views::ViewResponse,
            crate::views::DataView,
            crate::views::StatView,
            crate::views::PlotView,
            crate::views::stat::StatSummary,
            crate::views::table::Table,
            crate::views::table::HeaderCell,
            crate::views::plot::GridSegment,
            crate::views::plot::PlacedLabel,
            crate::views::plot::LegendEntry,
            crate::views::plot::SeriesPoints,
            crate::views::plot::Point,
            crate::analysis::PlotDomain,
            crate::analysis::TimeAxis,
            log::LogUpload,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "views", description = "Raw table, statistics and plot views of a day or week"),
        (name = "log", description = "Uploading log lines"),
    ),
    info(
        title = "owlog dashboard API",
        description = "Tables, statistics and plots for one-wire sensor logs",
        version = "0.1.0"
    )
)]
struct ApiDoc;

/// Maps errors raised by the outer tower layers onto JSON responses.
async fn handle_layer_error(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        tracing::warn!("request_timed_out");
        return (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out" })),
        )
            .into_response();
    }

    tracing::error!("Unhandled layer error: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}

pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_seconds);

    // Uploads need a bearer token when LOG_TOKEN is configured
    let log_routes = Router::new()
        .route("/log", post(log::post_log).put(log::post_log))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_log_token,
        ));

    let api_routes = Router::new()
        .route("/view", get(view::get_view))
        .merge(log_routes)
        .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1MB body limit

    // Health check routes
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Combine all routes
    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_layer_error))
                .layer(TimeoutLayer::new(timeout)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
