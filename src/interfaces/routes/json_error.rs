use actix_multipart::{form::MultipartFormConfig, MultipartError};
use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    http::StatusCode,
    web, HttpResponse, ResponseError,
};

use crate::handlers::json_error::json_error;

const MULTIPART_TOTAL_LIMIT: usize = 12 * 1024 * 1024;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        RequestError::from(err).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        RequestError::from(err).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        RequestError::from(err).into()
    }))
    .app_data(
        MultipartFormConfig::default()
            .total_limit(MULTIPART_TOTAL_LIMIT)
            .error_handler(|err, _req| RequestError::from(err).into()),
    );
}

/// A request rejected by an extractor before any handler ran.
#[derive(Debug)]
pub struct RequestError {
    error: &'static str,
    details: String,
    status: StatusCode,
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.details)
    }
}

impl ResponseError for RequestError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        json_error(self.status, self.error, &self.details)
    }
}

impl From<JsonPayloadError> for RequestError {
    fn from(err: JsonPayloadError) -> Self {
        let status = match err {
            JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            JsonPayloadError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            _ => StatusCode::BAD_REQUEST,
        };
        RequestError { error: "Invalid JSON payload", details: err.to_string(), status }
    }
}

impl From<QueryPayloadError> for RequestError {
    fn from(err: QueryPayloadError) -> Self {
        RequestError {
            error: "Invalid query string",
            details: err.to_string(),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl From<PathError> for RequestError {
    fn from(err: PathError) -> Self {
        RequestError {
            error: "Invalid path parameter",
            details: err.to_string(),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl From<MultipartError> for RequestError {
    fn from(err: MultipartError) -> Self {
        RequestError {
            error: "Invalid upload",
            details: err.to_string(),
            status: err.status_code(),
        }
    }
}
