use std::{sync::Arc, time::Duration};

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::PROJECTS_TABLE,
    entities::{
        document::{StoredFile, UploadedFile},
        project::{NewProject, Project, ProjectCategory, UpdateProject},
    },
    errors::AppError,
    repositories::{
        cache::QueryCache,
        gateway::{decode_row, decode_rows, Gateway, Query},
    },
    settings::AppConfig,
    use_cases::uploads::store_file,
    utils::upload::{project_image_path, IMAGE_EXTENSIONS},
};

pub struct ProjectHandler<G: Gateway + ?Sized> {
    gateway: Arc<G>,
    cache: Arc<QueryCache<Vec<Project>>>,
    bucket: String,
    list_timeout: Duration,
}

impl<G: Gateway + ?Sized> Clone for ProjectHandler<G> {
    fn clone(&self) -> Self {
        ProjectHandler {
            gateway: Arc::clone(&self.gateway),
            cache: Arc::clone(&self.cache),
            bucket: self.bucket.clone(),
            list_timeout: self.list_timeout,
        }
    }
}

fn cache_key(category: Option<ProjectCategory>) -> String {
    match category {
        Some(category) => format!("projects:{}", category),
        None => "projects:all".to_string(),
    }
}

impl<G: Gateway + ?Sized + 'static> ProjectHandler<G> {
    pub fn new(gateway: Arc<G>, config: &AppConfig) -> Self {
        ProjectHandler {
            gateway,
            cache: Arc::new(QueryCache::new(config.cache_ttl())),
            bucket: config.storage_bucket.clone(),
            list_timeout: config.project_list_timeout(),
        }
    }

    /// Newest first, optionally narrowed to one category.
    pub async fn list(&self, category: Option<ProjectCategory>) -> Result<Vec<Project>, AppError> {
        let key = cache_key(category);
        if let Some(projects) = self.cache.get(&key) {
            return Ok(projects);
        }
        let generation = self.cache.generation();

        let mut query = Query::new().order_desc("created_at");
        if let Some(category) = category {
            query = query.eq("category", category.as_str());
        }

        let projects: Vec<Project> = decode_rows(self.gateway.select(PROJECTS_TABLE, &query).await?)?;
        self.cache.put_if_current(key, generation, projects.clone());
        Ok(projects)
    }

    /// Listing for public pages, bounded by the configured timeout.
    ///
    /// The fetch runs on its own task: when the caller gives up it keeps
    /// going and fills the cache for the next visitor, unless a write
    /// invalidated the cache in the meantime.
    pub async fn list_public(&self, category: Option<ProjectCategory>) -> Result<Vec<Project>, AppError> {
        let handler = self.clone();
        let fetch = tokio::spawn(async move { handler.list(category).await });

        match tokio::time::timeout(self.list_timeout, fetch).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(AppError::InternalError(format!("project fetch task failed: {}", e))),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.list_timeout.as_secs(),
                    "Project list is taking too long; returning timeout"
                );
                Err(AppError::Timeout(self.list_timeout))
            }
        }
    }

    pub async fn create(&self, project: NewProject) -> Result<Project, AppError> {
        project.validate()?;

        let row = self.gateway.insert(PROJECTS_TABLE, project.prepare_for_insert()?).await?;
        self.cache.invalidate_all();

        let created: Project = decode_row(row)?;
        tracing::info!(project_id = %created.id, "Project created");
        Ok(created)
    }

    pub async fn update(&self, id: Uuid, changes: UpdateProject) -> Result<Project, AppError> {
        changes.validate()?;
        if changes.is_empty() {
            return Err(AppError::InvalidInput("No fields to update".to_string()));
        }

        let patch = changes.prepare_for_update(Utc::now())?;
        let rows = self
            .gateway
            .update(PROJECTS_TABLE, &Query::new().eq("id", id), patch)
            .await?;
        self.cache.invalidate_all();

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;
        decode_row(row)
    }

    /// Deleting a missing project is not an error.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.gateway.delete(PROJECTS_TABLE, &Query::new().eq("id", id)).await?;
        self.cache.invalidate_all();
        tracing::info!(project_id = %id, "Project deleted");
        Ok(())
    }

    pub fn cached_queries(&self) -> usize {
        self.cache.len()
    }

    pub async fn upload_image(&self, file: UploadedFile) -> Result<StoredFile, AppError> {
        store_file(
            self.gateway.as_ref(),
            &self.bucket,
            file,
            &IMAGE_EXTENSIONS,
            project_image_path,
        )
        .await
    }
}
