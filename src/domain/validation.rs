use validator::ValidationError;

use crate::entities::patch::Patch;

/// Rejects empty and whitespace-only text.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("This field is required".into());
        return Err(error);
    }
    Ok(())
}

/// Accepts absolute http(s) URLs only.
pub fn validate_http_url(value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => {
            let mut error = ValidationError::new("url");
            error.message = Some("Invalid URL".into());
            Err(error)
        }
    }
}

/// Empty text is allowed, anything else must be an http(s) URL.
pub fn validate_blank_or_url(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    validate_http_url(value)
}

pub fn validate_blank_or_email(value: &str) -> Result<(), ValidationError> {
    use validator::ValidateEmail;

    if value.trim().is_empty() || value.validate_email() {
        return Ok(());
    }
    let mut error = ValidationError::new("email");
    error.message = Some("Invalid email format".into());
    Err(error)
}

/// Each list entry must carry some text.
pub fn validate_entries(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        let mut error = ValidationError::new("blank_entry");
        error.message = Some("List entries cannot be blank".into());
        return Err(error);
    }
    Ok(())
}

pub fn validate_patch_not_blank(value: &Patch<String>) -> Result<(), ValidationError> {
    match value {
        Patch::Set(text) => validate_not_blank(text),
        Patch::Null => {
            let mut error = ValidationError::new("required");
            error.message = Some("This field cannot be cleared".into());
            Err(error)
        }
        Patch::Unchanged => Ok(()),
    }
}

pub fn validate_patch_url(value: &Patch<String>) -> Result<(), ValidationError> {
    match value {
        Patch::Set(url) => validate_http_url(url),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("Portfolio").is_ok());
    }

    #[test]
    fn url_shape_requires_scheme() {
        assert!(validate_http_url("https://github.com/me/repo").is_ok());
        assert!(validate_http_url("github.com/me/repo").is_err());
        assert!(validate_http_url("ftp://example.com").is_err());
    }

    #[test]
    fn blank_or_email_allows_empty() {
        assert!(validate_blank_or_email("").is_ok());
        assert!(validate_blank_or_email("me@example.com").is_ok());
        assert!(validate_blank_or_email("not-an-email").is_err());
    }

    #[test]
    fn patch_null_cannot_clear_required_text() {
        assert!(validate_patch_not_blank(&Patch::Null).is_err());
        assert!(validate_patch_not_blank(&Patch::Unchanged).is_ok());
    }
}
