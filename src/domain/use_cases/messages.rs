use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::MESSAGES_TABLE,
    entities::message::{ContactForm, ContactResponse, Message, MessageStatus},
    errors::AppError,
    repositories::{
        cache::QueryCache,
        gateway::{decode_row, decode_rows, Gateway, Query},
    },
    settings::AppConfig,
};

pub struct MessageHandler<G: Gateway + ?Sized> {
    gateway: Arc<G>,
    cache: Arc<QueryCache<Vec<Message>>>,
}

impl<G: Gateway + ?Sized> Clone for MessageHandler<G> {
    fn clone(&self) -> Self {
        MessageHandler {
            gateway: Arc::clone(&self.gateway),
            cache: Arc::clone(&self.cache),
        }
    }
}

fn cache_key(status: Option<MessageStatus>) -> String {
    match status {
        Some(status) => format!("messages:{}", status),
        None => "messages:all".to_string(),
    }
}

impl<G: Gateway + ?Sized> MessageHandler<G> {
    pub fn new(gateway: Arc<G>, config: &AppConfig) -> Self {
        MessageHandler {
            gateway,
            cache: Arc::new(QueryCache::new(config.cache_ttl())),
        }
    }

    /// Public contact form submission. Always stored as unread.
    pub async fn submit(&self, form: ContactForm) -> Result<ContactResponse, AppError> {
        form.validate()?;

        let row = self
            .gateway
            .insert(MESSAGES_TABLE, serde_json::to_value(form.prepare_for_insert())?)
            .await?;
        self.cache.invalidate_all();

        let stored: Message = decode_row(row)?;
        tracing::info!(message_id = %stored.id, "Contact message received");

        Ok(ContactResponse {
            id: stored.id,
            message: "Your message has been received.".to_string(),
        })
    }

    pub async fn list(&self, status: Option<MessageStatus>) -> Result<Vec<Message>, AppError> {
        let key = cache_key(status);
        if let Some(messages) = self.cache.get(&key) {
            return Ok(messages);
        }
        let generation = self.cache.generation();

        let mut query = Query::new().order_desc("created_at");
        if let Some(status) = status {
            query = query.eq("status", status.as_str());
        }

        let messages: Vec<Message> = decode_rows(self.gateway.select(MESSAGES_TABLE, &query).await?)?;
        self.cache.put_if_current(key, generation, messages.clone());
        Ok(messages)
    }

    /// Moves a message from `new` to `read`. Already-read messages are returned unchanged.
    pub async fn mark_read(&self, id: Uuid) -> Result<Message, AppError> {
        let query = Query::new().eq("id", id).eq("status", MessageStatus::New.as_str());
        let rows = self
            .gateway
            .update(MESSAGES_TABLE, &query, json!({ "status": MessageStatus::Read }))
            .await?;
        self.cache.invalidate_all();

        if let Some(row) = rows.into_iter().next() {
            return decode_row(row);
        }

        let existing = self
            .gateway
            .select(MESSAGES_TABLE, &Query::new().eq("id", id).limit(1))
            .await?;
        match existing.into_iter().next() {
            Some(row) => decode_row(row),
            None => Err(AppError::NotFound(format!("Message {} not found", id))),
        }
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.gateway.delete(MESSAGES_TABLE, &Query::new().eq("id", id)).await?;
        self.cache.invalidate_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::gateway::MockGateway;

    fn message_row(id: Uuid, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Jane",
            "email": "jane@example.com",
            "message": "Hello",
            "status": status,
            "created_at": "2024-02-01T10:00:00Z"
        })
    }

    #[actix_rt::test]
    async fn submitted_message_is_forced_to_new() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_insert()
            .withf(|table, row| table == MESSAGES_TABLE && row["status"] == "new")
            .returning(|_, _| Ok(message_row(Uuid::new_v4(), "new")));

        let handler = MessageHandler::new(Arc::new(gateway), &AppConfig::default());
        let response = handler
            .submit(ContactForm {
                name: "Jane".into(),
                email: "jane@example.com".into(),
                message: "Hello".into(),
            })
            .await
            .unwrap();
        assert_eq!(response.message, "Your message has been received.");
    }

    #[actix_rt::test]
    async fn marking_read_twice_returns_the_read_message() {
        let id = Uuid::new_v4();
        let mut gateway = MockGateway::new();
        gateway.expect_update().returning(|_, _, _| Ok(vec![]));
        gateway
            .expect_select()
            .returning(move |_, _| Ok(vec![message_row(id, "read")]));

        let handler = MessageHandler::new(Arc::new(gateway), &AppConfig::default());
        assert_eq!(handler.mark_read(id).await.unwrap().status, MessageStatus::Read);
    }

    #[actix_rt::test]
    async fn marking_unknown_message_is_not_found() {
        let mut gateway = MockGateway::new();
        gateway.expect_update().returning(|_, _, _| Ok(vec![]));
        gateway.expect_select().returning(|_, _| Ok(vec![]));

        let handler = MessageHandler::new(Arc::new(gateway), &AppConfig::default());
        assert!(matches!(
            handler.mark_read(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
