use std::{cmp::Ordering, collections::HashMap};

use actix_web::http::StatusCode;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    auth::password::{hash_password, verify_password},
    entities::session::{AuthEvent, AuthSession, Credentials, Identity},
    errors::{AppError, AuthError},
    repositories::gateway::{Filter, Gateway, Query},
};

const EVENT_CAPACITY: usize = 16;
const SESSION_LIFETIME_SECS: i64 = 3600;
pub const MEMORY_PUBLIC_BASE: &str = "http://localhost/storage/v1/object/public";

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

struct MemoryUser {
    identity: Identity,
    password_hash: String,
}

#[derive(Default, Clone)]
struct Faults {
    reads: Option<String>,
    writes: Option<String>,
}

/// In-process backend with the same contract as the hosted one.
///
/// Rows are plain JSON objects. Inserts get an `id` and timestamps when the
/// caller did not supply them, like the hosted database defaults do.
pub struct MemoryGateway {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    objects: DashMap<String, StoredObject>,
    users: RwLock<HashMap<String, MemoryUser>>,
    session: RwLock<Option<AuthSession>>,
    faults: RwLock<HashMap<String, Faults>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        MemoryGateway {
            tables: RwLock::new(HashMap::new()),
            objects: DashMap::new(),
            users: RwLock::new(HashMap::new()),
            session: RwLock::new(None),
            faults: RwLock::new(HashMap::new()),
            events,
        }
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        MemoryGateway::default()
    }

    // ───── Test Helpers ──────────────────────────────────────────────────

    /// Stores rows as given, without defaults.
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables.write().entry(table.to_string()).or_default().extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.read().get(table).cloned().unwrap_or_default()
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.objects.get(&object_key(bucket, path)).map(|entry| entry.value().clone())
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn register_user(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = Identity {
            id: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
        };
        let password_hash = hash_password(password)?;
        self.users.write().insert(
            email.to_lowercase(),
            MemoryUser { identity: identity.clone(), password_hash },
        );
        Ok(identity)
    }

    /// Makes every read of `table` fail with `message`.
    pub fn fail_reads(&self, table: &str, message: &str) {
        self.faults.write().entry(table.to_string()).or_default().reads = Some(message.to_string());
    }

    /// Makes every write to `table` (or `storage:{bucket}`) fail with `message`.
    pub fn reject_writes(&self, table: &str, message: &str) {
        self.faults.write().entry(table.to_string()).or_default().writes = Some(message.to_string());
    }

    pub fn clear_faults(&self) {
        self.faults.write().clear();
    }

    fn check_read(&self, table: &str) -> Result<(), AppError> {
        match self.faults.read().get(table).and_then(|f| f.reads.clone()) {
            Some(message) => Err(AppError::from_backend(StatusCode::BAD_REQUEST, message)),
            None => Ok(()),
        }
    }

    fn check_write(&self, table: &str) -> Result<(), AppError> {
        match self.faults.read().get(table).and_then(|f| f.writes.clone()) {
            Some(message) => Err(AppError::from_backend(StatusCode::BAD_REQUEST, message)),
            None => Ok(()),
        }
    }

    fn start_session(&self, identity: Identity) -> AuthSession {
        let session = AuthSession {
            access_token: format!("memory-access-{}", Uuid::new_v4()),
            refresh_token: Some(format!("memory-refresh-{}", Uuid::new_v4())),
            expires_at: Some(Utc::now().timestamp() + SESSION_LIFETIME_SECS),
            user: identity.clone(),
        };
        *self.session.write() = Some(session.clone());
        let _ = self.events.send(AuthEvent::SignedIn(identity));
        session
    }
}

fn object_key(bucket: &str, path: &str) -> String {
    format!("{}/{}", bucket, path)
}

fn storage_fault_key(bucket: &str) -> String {
    format!("storage:{}", bucket)
}

/// Text form used for comparisons, matching how filters are sent over the wire.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    if let (Ok(x), Ok(y)) = (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
        return x.cmp(&y);
    }
    if let (Ok(x), Ok(y)) = (a.parse::<f64>(), b.parse::<f64>()) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    a.cmp(b)
}

fn matches(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => row.get(column).is_some_and(|v| value_text(v) == *value),
        Filter::Gte { column, value } => row
            .get(column)
            .filter(|v| !v.is_null())
            .is_some_and(|v| compare_text(&value_text(v), value) != Ordering::Less),
    }
}

fn matches_all(row: &Value, query: &Query) -> bool {
    query.filters.iter().all(|filter| matches(row, filter))
}

fn project(row: &Value, columns: &Option<Vec<String>>) -> Value {
    match (columns, row.as_object()) {
        (Some(columns), Some(object)) => Value::Object(
            columns
                .iter()
                .filter_map(|c| object.get(c).map(|v| (c.clone(), v.clone())))
                .collect(),
        ),
        _ => row.clone(),
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, AppError> {
        self.check_read(table)?;

        let mut rows: Vec<Value> = self
            .tables
            .read()
            .get(table)
            .map(|rows| rows.iter().filter(|row| matches_all(row, query)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = &query.order {
            let key = |row: &Value| row.get(&order.column).map(value_text).unwrap_or_default();
            rows.sort_by(|a, b| {
                let ordering = compare_text(&key(a), &key(b));
                if order.ascending { ordering } else { ordering.reverse() }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows.iter().map(|row| project(row, &query.columns)).collect())
    }

    async fn count(&self, table: &str, query: &Query) -> Result<u64, AppError> {
        self.check_read(table)?;
        Ok(self
            .tables
            .read()
            .get(table)
            .map(|rows| rows.iter().filter(|row| matches_all(row, query)).count() as u64)
            .unwrap_or(0))
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, AppError> {
        self.check_write(table)?;

        let Value::Object(mut fields) = row else {
            return Err(AppError::Backend(format!("insert into {} expects an object", table)));
        };
        let now = Value::String(Utc::now().to_rfc3339());
        fields.entry("id").or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        fields.entry("created_at").or_insert_with(|| now.clone());
        fields.entry("updated_at").or_insert(now);

        let stored = Value::Object(fields);
        self.tables.write().entry(table.to_string()).or_default().push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>, AppError> {
        self.check_write(table)?;

        let Value::Object(patch) = patch else {
            return Err(AppError::Backend(format!("update of {} expects an object", table)));
        };

        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|row| matches_all(row, query)) {
            if let Value::Object(fields) = row {
                merge(fields, &patch);
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<(), AppError> {
        self.check_write(table)?;
        if let Some(rows) = self.tables.write().get_mut(table) {
            rows.retain(|row| !matches_all(row, query));
        }
        Ok(())
    }

    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        self.check_write(&storage_fault_key(bucket))?;

        let key = object_key(bucket, path);
        if self.objects.contains_key(&key) {
            return Err(AppError::Conflict(format!("The resource already exists: {}", path)));
        }
        self.objects.insert(
            key,
            StoredObject { bytes, content_type: content_type.to_string() },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{}/{}", MEMORY_PUBLIC_BASE, bucket, path)
    }

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), AppError> {
        self.check_write(&storage_fault_key(bucket))?;
        self.objects.remove(&object_key(bucket, path));
        Ok(())
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        let identity = {
            let users = self.users.read();
            let user = users
                .get(&credentials.email.to_lowercase())
                .ok_or(AuthError::WrongCredentials)?;
            if !verify_password(&credentials.password, &user.password_hash)? {
                return Err(AuthError::WrongCredentials);
            }
            user.identity.clone()
        };
        Ok(self.start_session(identity))
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        if self.users.read().contains_key(&credentials.email.to_lowercase()) {
            return Err(AuthError::SignUpRejected("User already registered".to_string()));
        }
        let identity = self.register_user(&credentials.email, &credentials.password)?;
        self.start_session(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.session.write().take().is_some() {
            let _ = self.events.send(AuthEvent::SignedOut);
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<Identity>, AuthError> {
        Ok(self.session.read().as_ref().map(|s| s.user.clone()))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

fn merge(fields: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        fields.insert(key.clone(), value.clone());
    }
}
