pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::RelayConfig;
use crate::services::fetcher::HttpFileFetcher;
use crate::services::relay::RelayService;
use crate::services::store::{BodyStore, InMemoryBodyStore};
use crate::services::uploader::HttpDocumentUploader;
use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::root,
        api::handlers::health::health_check,
        api::handlers::relay::upload_file,
        api::handlers::store::store_body,
        api::handlers::store::retrieve_body,
    ),
    components(
        schemas(
            models::UploadFileRequest,
            models::UploadFileResponse,
            api::handlers::health::HealthResponse,
            api::handlers::store::StoreResponse,
            api::handlers::store::RetrieveResponse,
        )
    ),
    tags(
        (name = "relay", description = "Download-and-forward document relay"),
        (name = "store", description = "Ephemeral JSON body store"),
        (name = "system", description = "Liveness endpoints")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayService>,
    pub store: Arc<dyn BodyStore>,
    pub config: RelayConfig,
}

impl AppState {
    /// Wires the production collaborators: reqwest fetcher/uploader and an
    /// in-memory body store.
    pub fn from_config(config: RelayConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(concat!("document-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let relay = RelayService::new(
            Arc::new(HttpFileFetcher::new(client.clone())),
            Arc::new(HttpDocumentUploader::new(
                client,
                config.subscription_key_header.clone(),
            )),
            config.clone(),
        );

        Ok(Self {
            relay: Arc::new(relay),
            store: Arc::new(InMemoryBodyStore::new()),
            config,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::health::root))
        .route("/health", get(api::handlers::health::health_check))
        .route("/upload-file", post(api::handlers::relay::upload_file))
        .route("/store", post(api::handlers::store::store_body))
        .route("/retrieve/:id", get(api::handlers::store::retrieve_body))
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .layer(axum::extract::DefaultBodyLimit::max(state.config.max_body_size))
        .with_state(state)
}
