use std::{fmt, str::FromStr};

use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::validation::{validate_http_url, validate_not_blank},
    errors::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Cv,
    Certificate,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Cv => "cv",
            DocumentType::Certificate => "certificate",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cv" => Ok(DocumentType::Cv),
            "certificate" => Ok(DocumentType::Certificate),
            other => Err(AppError::InvalidInput(format!("Unknown document type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub title: String,
    pub file_url: String,
    pub file_name: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

/// Metadata row written after the file itself is stored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDocument {
    #[serde(rename = "type")]
    pub doc_type: DocumentType,

    #[validate(custom(function = "validate_not_blank", message = "Title is required"))]
    pub title: String,

    #[validate(custom(function = "validate_http_url"))]
    pub file_url: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub file_name: String,

    #[validate(range(min = 0))]
    pub file_size: i64,
}

/// Raw file handed over by an upload form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        UploadedFile {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn size(&self) -> i64 {
        self.bytes.len() as i64
    }
}

/// Where an upload landed in the bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredFile {
    pub path: String,
    pub public_url: String,
    pub file_name: String,
    pub file_size: i64,
}

/// Admin upload form: the file plus its type and display title.
#[derive(Debug, MultipartForm)]
pub struct DocumentUploadForm {
    #[multipart(limit = "10MB")]
    pub file: TempFile,

    #[multipart(rename = "type")]
    pub doc_type: Text<DocumentType>,

    pub title: Text<String>,
}

#[derive(Debug, MultipartForm)]
pub struct ImageUploadForm {
    #[multipart(limit = "5MB")]
    pub file: TempFile,
}

#[derive(Debug, Deserialize)]
pub struct DocumentListQuery {
    #[serde(rename = "type")]
    pub doc_type: Option<DocumentType>,
}
