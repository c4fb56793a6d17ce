use actix_web::{web, HttpResponse, Responder};

use crate::{entities::analytics::DashboardQuery, use_cases::extractors::AdminSession, AppState};

/// `?days=` picks the window; `?isolated=true` loads each section independently.
pub async fn get_dashboard(
    _admin: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> impl Responder {
    let days = query.days.unwrap_or_else(|| state.analytics.default_window_days());

    if query.isolated {
        return match state.analytics.dashboard_isolated(days).await {
            Ok(dashboard) => HttpResponse::Ok().json(dashboard),
            Err(e) => e.to_http_response(),
        };
    }

    match state.analytics.dashboard(days).await {
        Ok(dashboard) => HttpResponse::Ok().json(dashboard),
        Err(e) => {
            tracing::error!("Dashboard failed to load: {}", e);
            e.to_http_response()
        }
    }
}
