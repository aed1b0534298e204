pub mod api;
pub mod dtos;
pub mod error;
pub mod services;

use std::{net::SocketAddr, sync::Arc, time::Instant};

use anyhow::Context;
use axum::{
    Extension, Router, ServiceExt,
    extract::Request,
    http::{HeaderValue, Method, header},
};
use once_cell::sync::Lazy;
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::NormalizePathLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::AppConfig;
use api::{
    CaptionsController, HealthController, SourcesController, StreamingProxyController,
    SubtitlesController,
};
use services::AppServices;

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn get_uptime_seconds() -> u64 {
    START_TIME.elapsed().as_secs()
}

pub struct ApplicationServer;

impl ApplicationServer {
    pub async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
        Lazy::force(&START_TIME);

        let services = AppServices::new(config.clone()).context("failed to start services")?;

        // has to wrap the router, as a route layer it would run after routing
        let app = NormalizePathLayer::trim_trailing_slash().layer(Self::router(services));

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {}", addr))?;

        info!("listening on {}", addr);

        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("error while serving")?;

        Ok(())
    }

    pub fn router(services: AppServices) -> Router {
        // the proxy writes its own CORS headers, everything else goes through the layer
        let api = Router::new()
            .nest("/api/health", HealthController::app())
            .nest("/api/sources", SourcesController::app())
            .nest("/api/captions", CaptionsController::app())
            .nest("/api/subtitles", SubtitlesController::app())
            .layer(Self::cors_layer(&services.config));

        Router::new()
            .nest("/api/streaming-proxy", StreamingProxyController::app())
            .merge(api)
            .layer(Extension(services))
            .layer(TraceLayer::new_for_http())
    }

    fn cors_layer(config: &AppConfig) -> CorsLayer {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::RANGE, header::AUTHORIZATION]);

        let origins = config.allowed_origins();
        if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
            return cors.allow_origin(Any);
        }

        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("ignoring invalid cors origin {}", origin);
                    None
                }
            })
            .collect();

        cors.allow_origin(origins)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c, serving until killed: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down...");
}
