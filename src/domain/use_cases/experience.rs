use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::EXPERIENCES_TABLE,
    entities::experience::{Experience, NewExperience, UpdateExperience},
    errors::AppError,
    repositories::{
        cache::QueryCache,
        gateway::{decode_row, decode_rows, Gateway, Query},
    },
    settings::AppConfig,
};

const ALL_KEY: &str = "experiences:all";

pub struct ExperienceHandler<G: Gateway + ?Sized> {
    gateway: Arc<G>,
    cache: Arc<QueryCache<Vec<Experience>>>,
}

impl<G: Gateway + ?Sized> Clone for ExperienceHandler<G> {
    fn clone(&self) -> Self {
        ExperienceHandler {
            gateway: Arc::clone(&self.gateway),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<G: Gateway + ?Sized> ExperienceHandler<G> {
    pub fn new(gateway: Arc<G>, config: &AppConfig) -> Self {
        ExperienceHandler {
            gateway,
            cache: Arc::new(QueryCache::new(config.cache_ttl())),
        }
    }

    pub async fn list(&self) -> Result<Vec<Experience>, AppError> {
        if let Some(entries) = self.cache.get(ALL_KEY) {
            return Ok(entries);
        }
        let generation = self.cache.generation();

        let rows = self
            .gateway
            .select(EXPERIENCES_TABLE, &Query::new().order_desc("created_at"))
            .await?;
        let entries: Vec<Experience> = decode_rows(rows)?;
        self.cache.put_if_current(ALL_KEY, generation, entries.clone());
        Ok(entries)
    }

    pub async fn create(&self, entry: NewExperience) -> Result<Experience, AppError> {
        entry.validate()?;

        let row = self.gateway.insert(EXPERIENCES_TABLE, entry.prepare_for_insert()?).await?;
        self.cache.invalidate_all();
        decode_row(row)
    }

    pub async fn update(&self, id: Uuid, changes: UpdateExperience) -> Result<Experience, AppError> {
        changes.validate()?;
        if changes.is_empty() {
            return Err(AppError::InvalidInput("No fields to update".to_string()));
        }

        let rows = self
            .gateway
            .update(EXPERIENCES_TABLE, &Query::new().eq("id", id), changes.prepare_for_update()?)
            .await?;
        self.cache.invalidate_all();

        match rows.into_iter().next() {
            Some(row) => decode_row(row),
            None => Err(AppError::NotFound(format!("Experience entry {} not found", id))),
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.gateway.delete(EXPERIENCES_TABLE, &Query::new().eq("id", id)).await?;
        self.cache.invalidate_all();
        Ok(())
    }
}
