use std::time::Duration;

use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use serde::Serialize;

use crate::{
    constants::START_TIME, entities::session::SessionState, settings::AppEnvironment,
    use_cases::extractors::AdminSession, AppState,
};

#[derive(Serialize)]
struct HealthCheckResponse {
    status: &'static str,
    uptime: String,
    timestamp: String,
    start_at: String,
    version: &'static str,
    environment: AppEnvironment,
    backend_configured: bool,
    session: SessionState,
    cached_queries: usize,
}

pub async fn admin_health_check(_admin: AdminSession, state: web::Data<AppState>) -> impl Responder {
    let now = Utc::now();
    let uptime = now.signed_duration_since(*START_TIME);
    let uptime = format_duration(Duration::from_secs(uptime.num_seconds().max(0) as u64));

    HttpResponse::Ok().json(HealthCheckResponse {
        status: "healthy",
        uptime: uptime.to_string(),
        timestamp: now.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.env.clone(),
        backend_configured: state.config.is_backend_configured(),
        session: state.session.state(),
        cached_queries: state.projects.cached_queries(),
    })
}
