use chrono::Utc;

use crate::{
    entities::document::{StoredFile, UploadedFile},
    errors::AppError,
    repositories::gateway::Gateway,
    utils::upload::inspect,
};

/// Stores `file` at the path built by `path_for(extension, millis)` and
/// resolves its public URL.
pub(crate) async fn store_file<G, F>(
    gateway: &G,
    bucket: &str,
    file: UploadedFile,
    allowed: &[&str],
    path_for: F,
) -> Result<StoredFile, AppError>
where
    G: Gateway + ?Sized,
    F: FnOnce(&str, i64) -> String,
{
    let kind = inspect(&file, allowed)?;
    let path = path_for(&kind.extension, Utc::now().timestamp_millis());
    let file_size = file.size();

    gateway.upload(bucket, &path, file.bytes, &kind.content_type).await?;
    let public_url = gateway.public_url(bucket, &path);

    tracing::info!(path = %path, bytes = file_size, "File stored");

    Ok(StoredFile {
        path,
        public_url,
        file_name: file.file_name,
        file_size,
    })
}
