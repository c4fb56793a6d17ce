use actix_web::{http::StatusCode, HttpResponse};

/// Error body for failures raised before a handler runs (bad JSON, query or path).
pub fn json_error(status: StatusCode, error: &str, details: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({
        "error": error,
        "notice": "Please check the submitted data and try again.",
        "details": details
    }))
}
