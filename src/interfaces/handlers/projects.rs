use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use uuid::Uuid;

use crate::{
    entities::{
        document::ImageUploadForm,
        project::{NewProject, ProjectListQuery, UpdateProject},
    },
    handlers::documents::read_upload,
    use_cases::extractors::AdminSession,
    AppState,
};

/// Public listing, bounded by the project list timeout.
pub async fn list_projects(
    state: web::Data<AppState>,
    query: web::Query<ProjectListQuery>,
) -> impl Responder {
    match state.projects.list_public(query.category).await {
        Ok(projects) => HttpResponse::Ok().json(projects),
        Err(e) => e.to_http_response(),
    }
}

pub async fn admin_list_projects(
    _admin: AdminSession,
    state: web::Data<AppState>,
    query: web::Query<ProjectListQuery>,
) -> impl Responder {
    match state.projects.list(query.category).await {
        Ok(projects) => HttpResponse::Ok().json(projects),
        Err(e) => e.to_http_response(),
    }
}

pub async fn create_project(
    _admin: AdminSession,
    state: web::Data<AppState>,
    project: web::Json<NewProject>,
) -> impl Responder {
    match state.projects.create(project.into_inner()).await {
        Ok(created) => HttpResponse::Created().json(created),
        Err(e) => e.to_http_response(),
    }
}

pub async fn update_project(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
    changes: web::Json<UpdateProject>,
) -> impl Responder {
    match state.projects.update(id.into_inner(), changes.into_inner()).await {
        Ok(updated) => HttpResponse::Ok().json(updated),
        Err(e) => e.to_http_response(),
    }
}

pub async fn delete_project(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> impl Responder {
    match state.projects.delete(id.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_http_response(),
    }
}

pub async fn upload_project_image(
    _admin: AdminSession,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<ImageUploadForm>,
) -> impl Responder {
    let file = match read_upload(form.file).await {
        Ok(file) => file,
        Err(e) => return e.to_http_response(),
    };

    match state.projects.upload_image(file).await {
        Ok(stored) => HttpResponse::Created().json(stored),
        Err(e) => e.to_http_response(),
    }
}
