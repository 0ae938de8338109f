//! # picpost-api
//!
//! HTTP server for picpost: greeting and health endpoints plus image upload,
//! listing, and retrieval. The binary in `main.rs` wires real backends into
//! [`router`]; tests drive the same router against in-memory ones.

pub mod config;
pub mod error;
pub mod handlers;
pub mod openapi;
pub mod services;
pub mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, Request},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use picpost_core::{BlobStore, ImagePostRepository};

pub use config::AppConfig;
pub use error::{ApiError, ErrorBody};
pub use openapi::ApiDoc;
use services::{ListingService, RetrievalService, UploadService};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub uploads: Arc<UploadService>,
    pub listing: Arc<ListingService>,
    pub retrieval: Arc<RetrievalService>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        catalog: Arc<dyn ImagePostRepository>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let prefix = config.api_prefix.clone();
        Self {
            uploads: Arc::new(UploadService::new(
                catalog.clone(),
                blobs.clone(),
                prefix.clone(),
                config.storage_timeout,
                config.db_timeout,
            )),
            listing: Arc::new(ListingService::new(catalog, prefix, config.db_timeout)),
            retrieval: Arc::new(RetrievalService::new(blobs, config.storage_timeout)),
            config,
        }
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// CORS layer for an explicit origin allow-list. Origins that are not valid
/// header values are skipped.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let api = Router::new()
        .route("/health", get(handlers::health))
        .route("/hello", get(handlers::hello))
        .route(
            "/images",
            get(handlers::list_images).post(handlers::upload_image),
        )
        .route("/images/:filename", get(handlers::get_image));

    Router::new()
        .route("/", get(handlers::root))
        .nest(&config.api_prefix, api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}
