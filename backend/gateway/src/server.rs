//! HTTP gateway server: shared state, router, CORS, and the serve loop.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use reframe_analysis::{AnalysisService, DistortionCatalog};
use reframe_ocr::OcrEngine;
use reframe_storage::{EntryStore, ImageStore, TextStore};

use crate::handlers;

/// Application state shared across routes.
///
/// The catalog is immutable after startup; the stores serialize their own
/// writes internally.
pub struct AppState {
    pub catalog: Arc<DistortionCatalog>,
    pub analysis: Arc<AnalysisService>,
    pub entry_store: Arc<EntryStore>,
    pub text_store: Arc<TextStore>,
    pub image_store: Arc<ImageStore>,
    pub ocr: Arc<OcrEngine>,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/analyse", post(handlers::analyse))
        .route("/cognitive-distortions", get(handlers::cognitive_distortions))
        .route("/save-entry", post(handlers::save_entry))
        .route("/upload-images", post(handlers::upload_images))
        .route("/process-images", post(handlers::process_images))
        .route("/save-text", post(handlers::save_text))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy from the configured origin list; `"*"` means any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Bind and serve the gateway until the process exits.
pub async fn start_server(
    addr: SocketAddr,
    state: Arc<AppState>,
    cors_origins: &[String],
) -> Result<()> {
    let app = build_router(state, cors_origins);

    info!(addr = %addr, "Gateway HTTP server listening");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
