use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;

use crate::{
    entities::message::{ContactForm, MessageListQuery},
    use_cases::extractors::AdminSession,
    AppState,
};

pub async fn submit_contact(
    state: web::Data<AppState>,
    form: web::Json<ContactForm>,
) -> impl Responder {
    match state.messages.submit(form.into_inner()).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => e.to_http_response(),
    }
}

pub async fn list_messages(
    _admin: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<MessageListQuery>,
) -> impl Responder {
    match state.messages.list(query.status).await {
        Ok(messages) => HttpResponse::Ok().json(messages),
        Err(e) => e.to_http_response(),
    }
}

pub async fn mark_message_read(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> impl Responder {
    match state.messages.mark_read(id.into_inner()).await {
        Ok(message) => HttpResponse::Ok().json(message),
        Err(e) => e.to_http_response(),
    }
}

pub async fn delete_message(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> impl Responder {
    match state.messages.delete(id.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_http_response(),
    }
}
