use std::path::Path;

use crate::{
    entities::document::{DocumentType, UploadedFile},
    errors::AppError,
};

pub const DOCUMENT_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "png", "jpg", "jpeg"];
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

// Office formats are containers; sniffing only sees the wrapper.
const CONTAINER_TYPES: [&str; 2] = ["application/zip", "application/x-ole-storage"];

/// Extension and content type accepted for an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileKind {
    pub extension: String,
    pub content_type: String,
}

pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Checks the file name against `allowed` and sniffs the content type.
///
/// Content that sniffs as a type none of the allowed extensions produce is
/// rejected; unrecognised content falls back to the declared type, then to
/// the extension.
pub fn inspect(file: &UploadedFile, allowed: &[&str]) -> Result<FileKind, AppError> {
    let extension = extension_of(&file.file_name)
        .filter(|ext| allowed.contains(&ext.as_str()))
        .ok_or_else(|| {
            AppError::InvalidInput(format!(
                "Unsupported file type for {}. Allowed: {}",
                file.file_name,
                allowed.join(", ")
            ))
        })?;

    if file.bytes.is_empty() {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }

    let expected = mime_for_extension(&extension);
    let content_type = match infer::get(&file.bytes).map(|kind| kind.mime_type()) {
        Some(sniffed) if allowed.iter().any(|ext| mime_for_extension(ext) == sniffed) => sniffed.to_string(),
        Some(sniffed) if CONTAINER_TYPES.contains(&sniffed) => expected.to_string(),
        Some(sniffed) => {
            return Err(AppError::InvalidInput(format!(
                "File content ({}) does not match an allowed type",
                sniffed
            )))
        }
        None => file
            .content_type
            .clone()
            .filter(|declared| !declared.is_empty() && declared != "application/octet-stream")
            .unwrap_or_else(|| expected.to_string()),
    };

    Ok(FileKind { extension, content_type })
}

/// `{type}s/{type}-{millis}.{ext}` inside the documents bucket.
pub fn document_path(doc_type: DocumentType, extension: &str, millis: i64) -> String {
    let kind = doc_type.as_str();
    format!("{kind}s/{kind}-{millis}.{extension}")
}

pub fn project_image_path(extension: &str, millis: i64) -> String {
    format!("projects/project-{millis}.{extension}")
}
