use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::{
    entities::session::{AuthEvent, AuthSession, Credentials, Identity},
    errors::{AppError, AuthError},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { column: String, value: String },
    Gte { column: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Table read description: projection, filters, ordering and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub columns: Option<Vec<String>>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn gte(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::Gte {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(Order { column: column.to_string(), ascending: false });
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(Order { column: column.to_string(), ascending: true });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query-string pairs in PostgREST syntax.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 3);

        let columns = self
            .columns
            .as_ref()
            .map(|c| c.join(","))
            .unwrap_or_else(|| "*".to_string());
        params.push(("select".to_string(), columns));

        for filter in &self.filters {
            match filter {
                Filter::Eq { column, value } => params.push((column.clone(), format!("eq.{}", value))),
                Filter::Gte { column, value } => params.push((column.clone(), format!("gte.{}", value))),
            }
        }

        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        params
    }
}

/// Connection to the hosted backend: tables, the file bucket and auth.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, AppError>;
    async fn count(&self, table: &str, query: &Query) -> Result<u64, AppError>;
    async fn insert(&self, table: &str, row: Value) -> Result<Value, AppError>;
    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>, AppError>;
    async fn delete(&self, table: &str, query: &Query) -> Result<(), AppError>;

    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError>;
    fn public_url(&self, bucket: &str, path: &str) -> String;
    async fn remove(&self, bucket: &str, path: &str) -> Result<(), AppError>;

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthSession, AuthError>;
    async fn sign_up(&self, credentials: &Credentials) -> Result<Identity, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
    async fn current_user(&self) -> Result<Option<Identity>, AuthError>;
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, AppError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(AppError::from))
        .collect()
}

pub fn decode_row<T: DeserializeOwned>(row: Value) -> Result<T, AppError> {
    Ok(serde_json::from_value(row)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_follow_postgrest_syntax() {
        let query = Query::new()
            .select(&["visitor_id"])
            .eq("status", "new")
            .gte("created_at", "2024-01-01T00:00:00+00:00")
            .order_desc("created_at")
            .limit(10);

        assert_eq!(
            query.to_params(),
            vec![
                ("select".to_string(), "visitor_id".to_string()),
                ("status".to_string(), "eq.new".to_string()),
                ("created_at".to_string(), "gte.2024-01-01T00:00:00+00:00".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn default_query_selects_everything() {
        assert_eq!(Query::new().to_params(), vec![("select".to_string(), "*".to_string())]);
    }
}
