use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    domain::validation::{validate_blank_or_email, validate_blank_or_url, validate_patch_url},
    entities::patch::Patch,
    errors::AppError,
    utils::markdown::safe_markdown_to_html,
};

// ───── Stored Record ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ContactInfo {
    #[serde(default)]
    #[validate(custom(function = "validate_blank_or_email"))]
    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    #[validate(custom(function = "validate_blank_or_url"))]
    pub linkedin: String,

    #[serde(default)]
    #[validate(custom(function = "validate_blank_or_url"))]
    pub github: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct About {
    pub id: i64,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub contact_info: ContactInfo,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AboutView {
    #[serde(flatten)]
    pub about: About,
    pub bio_html: String,
}

impl From<About> for AboutView {
    fn from(about: About) -> Self {
        let bio_html = safe_markdown_to_html(&about.bio);
        AboutView { about, bio_html }
    }
}

// ───── Input & Validation ───────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAbout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub contact_info: Option<ContactInfo>,

    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    #[validate(custom(function = "validate_patch_url"))]
    pub resume_url: Patch<String>,
}

impl UpdateAbout {
    pub fn is_empty(&self) -> bool {
        self.bio.is_none()
            && self.skills.is_none()
            && self.contact_info.is_none()
            && self.resume_url.is_unchanged()
    }

    pub fn prepare_for_update(&self, now: DateTime<Utc>) -> Result<serde_json::Value, AppError> {
        let mut patch = serde_json::to_value(self)?;
        if let Some(map) = patch.as_object_mut() {
            map.insert("updated_at".to_string(), serde_json::to_value(now)?);
        }
        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bio_markdown_is_rendered_and_sanitized() {
        let about = About {
            id: 1,
            bio: "**Network** engineer <script>alert(1)</script>".into(),
            skills: vec![],
            contact_info: ContactInfo::default(),
            resume_url: None,
            updated_at: None,
        };
        let view = AboutView::from(about);
        assert!(view.bio_html.contains("<strong>Network</strong>"));
        assert!(!view.bio_html.contains("<script>"));
    }

    #[test]
    fn invalid_contact_email_is_rejected() {
        let update = UpdateAbout {
            contact_info: Some(ContactInfo {
                email: "nope".into(),
                ..ContactInfo::default()
            }),
            ..UpdateAbout::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn missing_nested_contact_info_defaults_to_blank() {
        let about: About = serde_json::from_value(serde_json::json!({ "id": 1, "bio": "hi" })).unwrap();
        assert_eq!(about.contact_info, ContactInfo::default());
        assert!(about.skills.is_empty());
    }
}
