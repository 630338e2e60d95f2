use crate::modules::auth::{AuthService, TokenInfo};
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub application: String,
    pub callbacks: String,
    pub token: TokenInfo,
}

/// Shared state for the health endpoints
pub struct HealthState {
    pub auth: Arc<AuthService>,
    pub callbacks_enabled: bool,
}

/// GET /health - Liveness probe
///
/// Reports whether an access token is cached; never fetches one.
pub async fn health_check(state: web::Data<HealthState>) -> impl Responder {
    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        checks: HealthChecks {
            application: "healthy".to_string(),
            callbacks: if state.callbacks_enabled {
                "enabled".to_string()
            } else {
                "disabled".to_string()
            },
            token: state.auth.token_info().await,
        },
    };

    HttpResponse::Ok().json(response)
}

/// Configure health check routes
pub fn configure(cfg: &mut web::ServiceConfig, state: web::Data<HealthState>) {
    cfg.app_data(state)
        .route("/health", web::get().to(health_check));
}
