use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;

use crate::{
    entities::experience::{NewExperience, UpdateExperience},
    use_cases::extractors::AdminSession,
    AppState,
};

pub async fn list_experience(state: web::Data<AppState>) -> impl Responder {
    match state.experience.list().await {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(e) => e.to_http_response(),
    }
}

pub async fn create_experience(
    _admin: AdminSession,
    state: web::Data<AppState>,
    entry: web::Json<NewExperience>,
) -> impl Responder {
    match state.experience.create(entry.into_inner()).await {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => e.to_http_response(),
    }
}

pub async fn update_experience(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    changes: web::Json<UpdateExperience>,
) -> impl Responder {
    match state.experience.update(id.into_inner(), changes.into_inner()).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => e.to_http_response(),
    }
}

pub async fn delete_experience(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> impl Responder {
    match state.experience.delete(id.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_http_response(),
    }
}
