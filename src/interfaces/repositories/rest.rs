use std::{sync::Arc, time::Duration};

use actix_web::http::StatusCode as HttpStatus;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use reqwest::{
    header::{CACHE_CONTROL, CONTENT_RANGE, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use zeroize::Zeroizing;

use crate::{
    auth::token::{effective_expiry, needs_refresh},
    constants::UPLOAD_CACHE_CONTROL,
    entities::session::{AuthEvent, AuthSession, Credentials, Identity},
    errors::{AppError, AuthError},
    repositories::gateway::{Gateway, Query},
    settings::AppConfig,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const EVENT_CAPACITY: usize = 16;

/// Gateway to the hosted backend over its REST, storage and auth APIs.
#[derive(Clone)]
pub struct RestGateway {
    client: Client,
    base_url: String,
    anon_key: Arc<Zeroizing<String>>,
    session: Arc<RwLock<Option<AuthSession>>>,
    events: broadcast::Sender<AuthEvent>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: Identity,
}

impl TokenResponse {
    fn into_session(self) -> AuthSession {
        let reported = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp() + secs));
        AuthSession {
            expires_at: effective_expiry(&self.access_token, reported),
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            user: self.user,
        }
    }
}

impl RestGateway {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(RestGateway {
            client,
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            anon_key: Arc::new(Zeroizing::new(config.backend_anon_key.clone())),
            session: Arc::new(RwLock::new(None)),
            events,
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, encode_path(path))
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, endpoint)
    }

    fn publish(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn store_session(&self, session: AuthSession) {
        *self.session.write() = Some(session);
    }

    fn clear_session(&self) -> Option<AuthSession> {
        self.session.write().take()
    }

    /// Access token for the next request, refreshed first when close to expiry.
    async fn bearer(&self) -> String {
        let current = self.session.read().clone();
        match current {
            Some(session) if needs_refresh(session.expires_at) => match self.refresh(&session).await {
                Ok(refreshed) => refreshed.access_token,
                Err(e) => {
                    tracing::warn!(user_id = %session.user.id, "Session refresh failed, signing out: {}", e);
                    self.clear_session();
                    self.publish(AuthEvent::SignedOut);
                    self.anon_key.as_str().to_string()
                }
            },
            Some(session) => session.access_token,
            None => self.anon_key.as_str().to_string(),
        }
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, AuthError> {
        let refresh_token = session.refresh_token.as_deref().ok_or(AuthError::TokenExpired)?;
        let response = self
            .client
            .post(self.auth_url("token?grant_type=refresh_token"))
            .header("apikey", self.anon_key.as_str())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let refreshed = read_token_response(response).await?;
        self.store_session(refreshed.clone());
        tracing::debug!(user_id = %refreshed.user.id, "Access token refreshed");
        self.publish(AuthEvent::TokenRefreshed(refreshed.user.clone()));
        Ok(refreshed)
    }

    async fn request(&self, method: Method, url: String) -> RequestBuilder {
        let bearer = self.bearer().await;
        self.client
            .request(method, url)
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(bearer)
    }
}

async fn send(builder: RequestBuilder) -> Result<Response, AppError> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), body = %body, "Backend request failed");
    Err(backend_error(status, &body))
}

async fn read_token_response(response: Response) -> Result<AuthSession, AuthError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(auth_failure(status, &body));
    }
    let token: TokenResponse = response.json().await?;
    Ok(token.into_session())
}

fn backend_error(status: StatusCode, body: &str) -> AppError {
    let status = HttpStatus::from_u16(status.as_u16()).unwrap_or(HttpStatus::BAD_GATEWAY);
    AppError::from_backend(status, error_message(body))
}

fn auth_failure(status: StatusCode, body: &str) -> AuthError {
    let message = error_message(body);
    let lower = message.to_lowercase();
    match status.as_u16() {
        400 | 401 if lower.contains("invalid login credentials") || lower.contains("invalid_grant") => {
            AuthError::WrongCredentials
        }
        401 | 403 => AuthError::InvalidToken,
        _ => AuthError::Provider(message),
    }
}

/// Pulls the human-readable message out of a backend error body.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let trimmed = body.trim();
        return if trimmed.is_empty() { "unknown backend error".to_string() } else { trimmed.to_string() };
    };

    let message = ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| value.to_string());

    let code = match value.get("code") {
        Some(Value::String(code)) => Some(code.clone()),
        Some(Value::Number(code)) => Some(code.to_string()),
        _ => None,
    };

    match code {
        Some(code) if !message.contains(&code) => format!("{} ({})", message, code),
        _ => message,
    }
}

pub(crate) fn parse_content_range(value: Option<&str>) -> Result<u64, AppError> {
    value
        .and_then(|range| range.rsplit('/').next())
        .and_then(|total| total.trim().parse().ok())
        .ok_or_else(|| AppError::Backend("response carried no exact count".to_string()))
}

pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl Gateway for RestGateway {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, AppError> {
        let builder = self.request(Method::GET, self.rest_url(table)).await.query(&query.to_params());
        Ok(send(builder).await?.json().await?)
    }

    async fn count(&self, table: &str, query: &Query) -> Result<u64, AppError> {
        let builder = self
            .request(Method::HEAD, self.rest_url(table))
            .await
            .query(&query.to_params())
            .header("Prefer", "count=exact");
        let response = send(builder).await?;
        parse_content_range(
            response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok()),
        )
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, AppError> {
        let builder = self
            .request(Method::POST, self.rest_url(table))
            .await
            .header("Prefer", "return=representation")
            .json(&[row]);
        let rows: Vec<Value> = send(builder).await?.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Backend(format!("insert into {} returned no row", table)))
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>, AppError> {
        let builder = self
            .request(Method::PATCH, self.rest_url(table))
            .await
            .query(&query.to_params())
            .header("Prefer", "return=representation")
            .json(&patch);
        Ok(send(builder).await?.json().await?)
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<(), AppError> {
        let builder = self
            .request(Method::DELETE, self.rest_url(table))
            .await
            .query(&query.to_params());
        send(builder).await?;
        Ok(())
    }

    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), AppError> {
        let builder = self
            .request(Method::POST, self.object_url(bucket, path))
            .await
            .header(CONTENT_TYPE, content_type)
            .header(CACHE_CONTROL, format!("max-age={}", UPLOAD_CACHE_CONTROL))
            .header("x-upsert", "false")
            .body(bytes);
        send(builder).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, encode_path(path))
    }

    async fn remove(&self, bucket: &str, path: &str) -> Result<(), AppError> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, bucket);
        let builder = self
            .request(Method::DELETE, url)
            .await
            .json(&json!({ "prefixes": [path] }));
        send(builder).await?;
        Ok(())
    }

    async fn sign_in_with_password(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        let response = self
            .client
            .post(self.auth_url("token?grant_type=password"))
            .header("apikey", self.anon_key.as_str())
            .json(&json!({ "email": credentials.email, "password": credentials.password }))
            .send()
            .await?;

        let session = read_token_response(response).await?;
        self.store_session(session.clone());
        self.publish(AuthEvent::SignedIn(session.user.clone()));
        Ok(session)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let response = self
            .client
            .post(self.auth_url("signup"))
            .header("apikey", self.anon_key.as_str())
            .json(&json!({ "email": credentials.email, "password": credentials.password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(if status.is_client_error() {
                AuthError::SignUpRejected(error_message(&body))
            } else {
                AuthError::Provider(error_message(&body))
            });
        }

        // With email confirmation enabled the provider answers with the bare user.
        let body: Value = response.json().await?;
        if body.get("access_token").is_some() {
            let token: TokenResponse =
                serde_json::from_value(body).map_err(|e| AuthError::Provider(e.to_string()))?;
            let session = token.into_session();
            let identity = session.user.clone();
            self.store_session(session);
            self.publish(AuthEvent::SignedIn(identity.clone()));
            return Ok(identity);
        }

        let user = body.get("user").cloned().unwrap_or(body);
        serde_json::from_value(user).map_err(|e| AuthError::Provider(e.to_string()))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.clear_session() else {
            return Ok(());
        };
        self.publish(AuthEvent::SignedOut);

        let result = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(&session.access_token)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => Ok(()),
            // The token was already revoked or expired: nothing left to end.
            Ok(response) if matches!(response.status().as_u16(), 401 | 403 | 404) => Ok(()),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(AuthError::Provider(format!("sign-out failed ({}): {}", status, error_message(&body))))
            }
            Err(e) => Err(AuthError::from(e)),
        }
    }

    async fn current_user(&self) -> Result<Option<Identity>, AuthError> {
        if self.session.read().is_none() {
            return Ok(None);
        }

        let token = self.bearer().await;
        if self.session.read().is_none() {
            return Ok(None);
        }

        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                self.clear_session();
                Ok(None)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(auth_failure(status, &body))
            }
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postgrest_message_keeps_error_code() {
        let body = r#"{"code":"23505","details":null,"hint":null,"message":"duplicate key value violates unique constraint \"projects_pkey\""}"#;
        let message = error_message(body);
        assert!(message.ends_with("(23505)"));
        assert!(matches!(backend_error(StatusCode::CONFLICT, body), AppError::Conflict(_)));
    }

    #[test]
    fn row_level_security_is_permission_denied() {
        let body = r#"{"code":"42501","message":"new row violates row-level security policy for table \"projects\""}"#;
        assert!(matches!(
            backend_error(StatusCode::BAD_REQUEST, body),
            AppError::PermissionDenied(_)
        ));
    }

    #[test]
    fn auth_error_description_is_used() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(error_message(body), "Invalid login credentials");
        assert!(matches!(auth_failure(StatusCode::BAD_REQUEST, body), AuthError::WrongCredentials));
    }

    #[test]
    fn plain_text_body_is_kept() {
        assert_eq!(error_message("  upstream timeout "), "upstream timeout");
        assert_eq!(error_message(""), "unknown backend error");
    }

    #[test]
    fn content_range_total_is_parsed() {
        assert_eq!(parse_content_range(Some("0-24/3573")).unwrap(), 3573);
        assert_eq!(parse_content_range(Some("*/0")).unwrap(), 0);
        assert!(parse_content_range(Some("0-24/*")).is_err());
        assert!(parse_content_range(None).is_err());
    }

    #[test]
    fn object_paths_are_encoded_per_segment() {
        assert_eq!(encode_path("cvs/my cv.pdf"), "cvs/my%20cv.pdf");
    }

    #[test]
    fn public_url_points_at_public_bucket() {
        let config = AppConfig {
            backend_url: "https://abc.supabase.co/".to_string(),
            ..AppConfig::default()
        };
        let gateway = RestGateway::new(&config).unwrap();
        assert_eq!(
            gateway.public_url("documents", "cvs/cv-1.pdf"),
            "https://abc.supabase.co/storage/v1/object/public/documents/cvs/cv-1.pdf"
        );
    }
}
