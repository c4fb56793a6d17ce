use actix_web::{web, HttpResponse, Responder};

use crate::{use_cases::extractors::AdminSession, AppState};

pub async fn get_theme(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "theme": state.theme.theme() }))
}

/// Flips the site-wide theme. Only the signed-in owner may change it.
pub async fn toggle_theme(_admin: AdminSession, state: web::Data<AppState>) -> impl Responder {
    let theme = state.theme.toggle();
    tracing::debug!(?theme, "Theme toggled");
    HttpResponse::Ok().json(serde_json::json!({ "theme": theme }))
}
