use actix_web::{web, HttpResponse, Responder};

use crate::{entities::about::UpdateAbout, use_cases::extractors::AdminSession, AppState};

/// Public About page; `null` until the owner has saved one.
pub async fn get_about(state: web::Data<AppState>) -> impl Responder {
    match state.about.view().await {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => e.to_http_response(),
    }
}

pub async fn get_about_record(_admin: AdminSession, state: web::Data<AppState>) -> impl Responder {
    match state.about.get().await {
        Ok(about) => HttpResponse::Ok().json(about),
        Err(e) => e.to_http_response(),
    }
}

pub async fn update_about(
    admin: AdminSession,
    state: web::Data<AppState>,
    changes: web::Json<UpdateAbout>,
) -> impl Responder {
    match state.about.update(changes.into_inner()).await {
        Ok(about) => {
            tracing::info!(user_id = %admin.0.id, "About page updated");
            HttpResponse::Ok().json(about)
        }
        Err(e) => e.to_http_response(),
    }
}
