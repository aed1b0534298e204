use axum::{Extension, Json, Router, http::StatusCode, routing::get};
use chrono::Utc;

use crate::logger::environment_name;
use crate::server::dtos::health_dto::{HealthResponse, HealthStatus};
use crate::server::services::AppServices;
use crate::server::{get_app_version, get_uptime_seconds};

pub struct HealthController;

impl HealthController {
    pub fn app() -> Router {
        Router::new().route("/", get(Self::health_endpoint))
    }

    /// liveness only, upstreams are not probed
    async fn health_endpoint(
        Extension(services): Extension<AppServices>,
    ) -> (StatusCode, Json<HealthResponse>) {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            timestamp: Utc::now(),
            uptime_seconds: get_uptime_seconds(),
            version: get_app_version().to_string(),
            environment: environment_name(services.config.cargo_env).to_string(),
        };

        (StatusCode::OK, Json(response))
    }
}
