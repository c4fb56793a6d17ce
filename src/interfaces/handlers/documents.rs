use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_web::{web, HttpResponse, Responder};
use anyhow::Context;
use uuid::Uuid;

use crate::{
    entities::document::{DocumentListQuery, DocumentUploadForm, UploadedFile},
    errors::AppError,
    use_cases::extractors::AdminSession,
    AppState,
};

/// Reads a spooled multipart file into memory.
pub async fn read_upload(file: TempFile) -> Result<UploadedFile, AppError> {
    let bytes = tokio::fs::read(file.file.path())
        .await
        .context("failed to read upload")?;

    let file_name = file.file_name.unwrap_or_else(|| "upload".to_string());
    let mut upload = UploadedFile::new(file_name, bytes);
    upload.content_type = file.content_type.map(|mime| mime.essence_str().to_string());
    Ok(upload)
}

pub async fn list_documents(
    state: web::Data<AppState>,
    query: web::Query<DocumentListQuery>,
) -> impl Responder {
    match state.documents.list(query.doc_type).await {
        Ok(documents) => HttpResponse::Ok().json(documents),
        Err(e) => e.to_http_response(),
    }
}

/// Most recent CV; 404 when none has been uploaded.
pub async fn latest_cv(state: web::Data<AppState>) -> impl Responder {
    match state.documents.latest_cv().await {
        Ok(Some(cv)) => HttpResponse::Ok().json(cv),
        Ok(None) => AppError::NotFound("no CV has been uploaded".to_string()).to_http_response(),
        Err(e) => e.to_http_response(),
    }
}

pub async fn upload_document(
    admin: AdminSession,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<DocumentUploadForm>,
) -> impl Responder {
    let doc_type = form.doc_type.into_inner();
    let title = form.title.into_inner();
    let file = match read_upload(form.file).await {
        Ok(file) => file,
        Err(e) => return e.to_http_response(),
    };

    match state.documents.upload_document(file, doc_type, &title).await {
        Ok(document) => {
            tracing::info!(user_id = %admin.0.id, document_id = %document.id, "Document uploaded");
            HttpResponse::Created().json(document)
        }
        Err(e) => e.to_http_response(),
    }
}

pub async fn delete_document(
    _admin: AdminSession,
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> impl Responder {
    match state.documents.delete(id.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_http_response(),
    }
}
