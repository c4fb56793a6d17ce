use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::{
    constants::{ABOUT_ID, ABOUT_TABLE},
    entities::about::{About, AboutView, UpdateAbout},
    errors::AppError,
    repositories::{
        cache::QueryCache,
        gateway::{decode_row, Gateway, Query},
    },
    settings::AppConfig,
};

const ABOUT_KEY: &str = "about";

/// Reads and edits the singleton About record.
pub struct AboutHandler<G: Gateway + ?Sized> {
    gateway: Arc<G>,
    cache: Arc<QueryCache<Option<About>>>,
}

impl<G: Gateway + ?Sized> Clone for AboutHandler<G> {
    fn clone(&self) -> Self {
        AboutHandler {
            gateway: Arc::clone(&self.gateway),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<G: Gateway + ?Sized> AboutHandler<G> {
    pub fn new(gateway: Arc<G>, config: &AppConfig) -> Self {
        AboutHandler {
            gateway,
            cache: Arc::new(QueryCache::new(config.cache_ttl())),
        }
    }

    /// `None` until the owner saves the About page for the first time.
    pub async fn get(&self) -> Result<Option<About>, AppError> {
        if let Some(about) = self.cache.get(ABOUT_KEY) {
            return Ok(about);
        }
        let generation = self.cache.generation();

        let rows = self
            .gateway
            .select(ABOUT_TABLE, &Query::new().eq("id", ABOUT_ID).limit(1))
            .await?;
        let about = rows.into_iter().next().map(decode_row::<About>).transpose()?;
        self.cache.put_if_current(ABOUT_KEY, generation, about.clone());
        Ok(about)
    }

    pub async fn view(&self) -> Result<Option<AboutView>, AppError> {
        Ok(self.get().await?.map(AboutView::from))
    }

    /// Applies the provided fields; the record is created on first save.
    pub async fn update(&self, changes: UpdateAbout) -> Result<About, AppError> {
        changes.validate()?;
        if changes.is_empty() {
            return Err(AppError::InvalidInput("No fields to update".to_string()));
        }

        let patch = changes.prepare_for_update(Utc::now())?;
        let rows = self
            .gateway
            .update(ABOUT_TABLE, &Query::new().eq("id", ABOUT_ID), patch.clone())
            .await?;
        self.cache.invalidate_all();

        let row = match rows.into_iter().next() {
            Some(row) => row,
            None => {
                let mut row = patch;
                if let Some(fields) = row.as_object_mut() {
                    fields.insert("id".to_string(), ABOUT_ID.into());
                }
                tracing::info!("Creating About record");
                self.gateway.insert(ABOUT_TABLE, row).await?
            }
        };
        decode_row(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::gateway::MockGateway;
    use serde_json::json;

    #[actix_rt::test]
    async fn empty_table_is_a_valid_state() {
        let mut gateway = MockGateway::new();
        gateway.expect_select().times(1).returning(|_, _| Ok(vec![]));

        let handler = AboutHandler::new(Arc::new(gateway), &AppConfig::default());
        assert_eq!(handler.get().await.unwrap(), None);
        assert!(handler.view().await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn empty_update_never_reaches_backend() {
        let gateway = MockGateway::new();
        let handler = AboutHandler::new(Arc::new(gateway), &AppConfig::default());

        let err = handler.update(UpdateAbout::default()).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[actix_rt::test]
    async fn first_save_inserts_the_singleton() {
        let mut gateway = MockGateway::new();
        gateway.expect_update().returning(|_, _, _| Ok(vec![]));
        gateway
            .expect_insert()
            .withf(|table, row| table == ABOUT_TABLE && row["id"] == json!(1) && row["bio"] == json!("Hello"))
            .returning(|_, row| Ok(row));

        let handler = AboutHandler::new(Arc::new(gateway), &AppConfig::default());
        let about = handler
            .update(UpdateAbout {
                bio: Some("Hello".into()),
                ..UpdateAbout::default()
            })
            .await
            .unwrap();
        assert_eq!(about.id, ABOUT_ID);
        assert_eq!(about.bio, "Hello");
    }
}
