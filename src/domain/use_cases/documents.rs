use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::DOCUMENTS_TABLE,
    entities::document::{Document, DocumentType, NewDocument, StoredFile, UploadedFile},
    errors::AppError,
    repositories::{
        cache::QueryCache,
        gateway::{decode_row, decode_rows, Gateway, Query},
    },
    settings::AppConfig,
    use_cases::uploads::store_file,
    utils::upload::{document_path, DOCUMENT_EXTENSIONS},
};

pub struct DocumentHandler<G: Gateway + ?Sized> {
    gateway: Arc<G>,
    cache: Arc<QueryCache<Vec<Document>>>,
    bucket: String,
}

impl<G: Gateway + ?Sized> Clone for DocumentHandler<G> {
    fn clone(&self) -> Self {
        DocumentHandler {
            gateway: Arc::clone(&self.gateway),
            cache: Arc::clone(&self.cache),
            bucket: self.bucket.clone(),
        }
    }
}

fn cache_key(doc_type: Option<DocumentType>) -> String {
    match doc_type {
        Some(doc_type) => format!("documents:{}", doc_type),
        None => "documents:all".to_string(),
    }
}

impl<G: Gateway + ?Sized> DocumentHandler<G> {
    pub fn new(gateway: Arc<G>, config: &AppConfig) -> Self {
        DocumentHandler {
            gateway,
            cache: Arc::new(QueryCache::new(config.cache_ttl())),
            bucket: config.storage_bucket.clone(),
        }
    }

    pub async fn list(&self, doc_type: Option<DocumentType>) -> Result<Vec<Document>, AppError> {
        let key = cache_key(doc_type);
        if let Some(documents) = self.cache.get(&key) {
            return Ok(documents);
        }
        let generation = self.cache.generation();

        let mut query = Query::new().order_desc("created_at");
        if let Some(doc_type) = doc_type {
            query = query.eq("type", doc_type.as_str());
        }

        let documents: Vec<Document> = decode_rows(self.gateway.select(DOCUMENTS_TABLE, &query).await?)?;
        self.cache.put_if_current(key, generation, documents.clone());
        Ok(documents)
    }

    /// Most recently uploaded CV, if any.
    pub async fn latest_cv(&self) -> Result<Option<Document>, AppError> {
        let query = Query::new()
            .eq("type", DocumentType::Cv.as_str())
            .order_desc("created_at")
            .limit(1);
        let rows = self.gateway.select(DOCUMENTS_TABLE, &query).await?;
        rows.into_iter().next().map(decode_row).transpose()
    }

    pub async fn create(&self, document: NewDocument) -> Result<Document, AppError> {
        document.validate()?;

        let row = self
            .gateway
            .insert(DOCUMENTS_TABLE, serde_json::to_value(&document)?)
            .await?;
        self.cache.invalidate_all();
        decode_row(row)
    }

    /// Removes the metadata row; the stored file is left in the bucket.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.gateway.delete(DOCUMENTS_TABLE, &Query::new().eq("id", id)).await?;
        self.cache.invalidate_all();
        Ok(())
    }

    pub async fn upload_file(&self, file: UploadedFile, doc_type: DocumentType) -> Result<StoredFile, AppError> {
        store_file(
            self.gateway.as_ref(),
            &self.bucket,
            file,
            &DOCUMENT_EXTENSIONS,
            |ext, millis| document_path(doc_type, ext, millis),
        )
        .await
    }

    /// Stores the file and records its metadata as one step.
    ///
    /// When the metadata insert fails the stored file is deleted again so no
    /// unreferenced blob stays behind.
    pub async fn upload_document(
        &self,
        file: UploadedFile,
        doc_type: DocumentType,
        title: &str,
    ) -> Result<Document, AppError> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput("Title is required".to_string()));
        }

        let stored = self.upload_file(file, doc_type).await?;
        let document = NewDocument {
            doc_type,
            title: title.trim().to_string(),
            file_url: stored.public_url.clone(),
            file_name: stored.file_name.clone(),
            file_size: stored.file_size,
        };

        match self.create(document).await {
            Ok(created) => Ok(created),
            Err(e) => {
                tracing::warn!(path = %stored.path, "Document metadata insert failed, removing uploaded file: {}", e);
                if let Err(cleanup) = self.gateway.remove(&self.bucket, &stored.path).await {
                    tracing::error!(path = %stored.path, "Failed to remove orphaned upload: {}", cleanup);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::gateway::MockGateway;

    const PDF: &[u8] = b"%PDF-1.4\n";

    #[actix_rt::test]
    async fn failed_insert_removes_uploaded_blob() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_upload()
            .withf(|bucket, path, _, content_type| {
                bucket == "documents" && path.starts_with("cvs/cv-") && path.ends_with(".pdf") && content_type == "application/pdf"
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));
        gateway
            .expect_public_url()
            .returning(|bucket, path| format!("https://files.example.com/{bucket}/{path}"));
        gateway
            .expect_insert()
            .returning(|_, _| Err(AppError::PermissionDenied("new row violates row-level security policy".into())));
        gateway
            .expect_remove()
            .withf(|bucket, path| bucket == "documents" && path.starts_with("cvs/cv-"))
            .times(1)
            .returning(|_, _| Ok(()));

        let handler = DocumentHandler::new(Arc::new(gateway), &AppConfig::default());
        let err = handler
            .upload_document(UploadedFile::new("cv.pdf", PDF.to_vec()), DocumentType::Cv, "My CV")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
    }

    #[actix_rt::test]
    async fn blank_title_is_rejected_before_upload() {
        let gateway = MockGateway::new();
        let handler = DocumentHandler::new(Arc::new(gateway), &AppConfig::default());
        let err = handler
            .upload_document(UploadedFile::new("cv.pdf", PDF.to_vec()), DocumentType::Cv, " ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[actix_rt::test]
    async fn no_cv_is_not_an_error() {
        let mut gateway = MockGateway::new();
        gateway.expect_select().returning(|_, _| Ok(vec![]));
        let handler = DocumentHandler::new(Arc::new(gateway), &AppConfig::default());
        assert!(handler.latest_cv().await.unwrap().is_none());
    }
}
