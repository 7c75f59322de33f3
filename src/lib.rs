pub mod api;
pub mod config;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::ExtractorConfig;
use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{Request, Response},
    middleware::from_fn,
    routing::{get, post},
};
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{Span, info};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::index,
        api::handlers::health::health_check,
        api::handlers::upload::upload_file,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            api::handlers::health::InfoResponse,
            api::handlers::upload::UploadResponse,
            api::handlers::upload::UploadForm,
        )
    ),
    tags(
        (name = "system", description = "Service status endpoints"),
        (name = "metadata", description = "Metadata extraction endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: ExtractorConfig,
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_size;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::health::index))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/upload",
            post(api::handlers::upload::upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get(api::middleware::request_id::REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("📥 {} {}", request.method(), request.uri());
                })
                .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
                    info!("📤 Finished in {:?} with status {}", latency, response.status());
                }),
        )
        // Outermost, so the trace span already sees a generated id
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .with_state(state)
}
