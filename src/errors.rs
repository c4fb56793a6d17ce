use std::fmt;
use std::time::Duration;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

/// Substrings the backend uses when an access policy rejects a request.
const PERMISSION_MARKERS: [&str; 4] = [
    "permission denied",
    "row-level security",
    "not authorized",
    "violates row level security",
];

#[derive(Debug)]
pub enum AppError {
    Configuration(String),
    ValidationError(Vec<FieldError>),
    PermissionDenied(String),
    NotFound(String),
    Conflict(String),
    Network(String),
    Timeout(Duration),
    Backend(String),
    UnauthorizedAccess,
    InvalidInput(String),
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::PermissionDenied(msg) => write!(f, "Permission denied: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Timeout(after) => write!(f, "Request timed out after {}s", after.as_secs()),
            AppError::Backend(msg) => write!(f, "Backend error: {}", msg),
            AppError::UnauthorizedAccess => write!(f, "Unauthorized access"),
            AppError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Classifies a failed backend response by status and message text.
    pub fn from_backend(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        if is_permission_message(&message)
            || status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
        {
            return AppError::PermissionDenied(message);
        }

        match status {
            StatusCode::NOT_FOUND | StatusCode::NOT_ACCEPTABLE => AppError::NotFound(message),
            StatusCode::CONFLICT => AppError::Conflict(message),
            _ if message.contains("23505") || message.contains("duplicate key") => {
                AppError::Conflict(message)
            }
            _ => AppError::Backend(message),
        }
    }

    /// Short text shown to the user as a transient notification.
    pub fn notice(&self) -> String {
        match self {
            AppError::Configuration(_) => {
                "The site backend is not configured. Please check the environment settings.".to_string()
            }
            AppError::ValidationError(_) | AppError::InvalidInput(_) => {
                "Please fix the highlighted fields and try again.".to_string()
            }
            AppError::PermissionDenied(_) => {
                "Permission denied: your account is not allowed to change this content.".to_string()
            }
            AppError::NotFound(_) => "Nothing was found for this request.".to_string(),
            AppError::Conflict(_) => "This item already exists.".to_string(),
            AppError::Network(_) | AppError::Backend(_) | AppError::InternalError(_) => {
                "Something went wrong talking to the server. Please try again.".to_string()
            }
            AppError::Timeout(_) => {
                "The request is taking too long. Please try again later.".to_string()
            }
            AppError::UnauthorizedAccess => "Please sign in to continue.".to_string(),
        }
    }

    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }
}

pub fn is_permission_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    PERMISSION_MARKERS.iter().any(|marker| lower.contains(marker))
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": "Validation failed",
                    "notice": self.notice(),
                    "details": errors
                })
            }
            _ => {
                serde_json::json!({"error": self.to_string(), "notice": self.notice()})
            }
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::UnauthorizedAccess => StatusCode::UNAUTHORIZED,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationError(field_errors(&errors))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Network(format!("request timed out: {}", err))
        } else if err.is_decode() {
            AppError::Backend(format!("unexpected response body: {}", err))
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Backend(format!("unexpected record shape: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(format!("{:#}", err))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotConfigured(msg) => AppError::Configuration(msg),
            AuthError::Validation(errors) => AppError::ValidationError(errors),
            AuthError::Network(msg) => AppError::Network(msg),
            AuthError::NotAuthenticated => AppError::UnauthorizedAccess,
            other => AppError::PermissionDenied(other.to_string()),
        }
    }
}

pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(|e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string()),
            })
        })
        .collect()
}

#[derive(Debug, Display)]
pub enum AuthError {
    #[display("Wrong credentials")]
    WrongCredentials,

    #[display("Not signed in")]
    NotAuthenticated,

    #[display("Invalid token")]
    InvalidToken,

    #[display("Token expired")]
    TokenExpired,

    #[display("Authentication backend not configured: {_0}")]
    NotConfigured(String),

    #[display("Sign-up rejected: {_0}")]
    SignUpRejected(String),

    #[display("Authentication provider error: {_0}")]
    Provider(String),

    #[display("Network error: {_0}")]
    Network(String),

    #[display("Invalid credentials format")]
    Validation(Vec<FieldError>),
}

impl std::error::Error for AuthError {}

impl AuthError {
    pub fn to_http_response(&self) -> HttpResponse {
        self.error_response()
    }
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AuthError::Validation(errors) => serde_json::json!({
                "error": self.to_string(),
                "notice": "Please check your email and password.",
                "details": errors
            }),
            AuthError::NotConfigured(_) => serde_json::json!({
                "error": self.to_string(),
                "notice": "Sign-in is unavailable: the site backend is not configured."
            }),
            _ => serde_json::json!({
                "error": self.to_string(),
                "notice": "Sign-in failed. Please check your credentials and try again."
            }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            AuthError::WrongCredentials => StatusCode::UNAUTHORIZED,
            AuthError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::SignUpRejected(_) => StatusCode::BAD_REQUEST,
            AuthError::Provider(_) => StatusCode::BAD_GATEWAY,
            AuthError::Network(_) => StatusCode::BAD_GATEWAY,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ValidationErrors> for AuthError {
    fn from(errors: ValidationErrors) -> Self {
        AuthError::Validation(field_errors(&errors))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Network(err.to_string())
    }
}

#[derive(Debug, Display)]
pub enum PasswordError {
    #[display("Invalid password parameters: {_0}")]
    InvalidParameters(String),

    #[display("Password hashing failed: {_0}")]
    HashingError(String),

    #[display("Invalid password hash format: {_0}")]
    InvalidHashFormat(String),

    #[display("Password verification failed: {_0}")]
    VerificationError(String),
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Provider(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
