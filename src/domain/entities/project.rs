use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::validation::{
        validate_entries, validate_http_url, validate_not_blank, validate_patch_not_blank,
        validate_patch_url,
    },
    entities::patch::Patch,
    errors::AppError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectCategory {
    Network,
    Web,
    Ai,
}

impl ProjectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCategory::Network => "network",
            ProjectCategory::Web => "web",
            ProjectCategory::Ai => "ai",
        }
    }
}

impl fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "network" => Ok(ProjectCategory::Network),
            "web" => Ok(ProjectCategory::Web),
            "ai" => Ok(ProjectCategory::Ai),
            other => Err(AppError::InvalidInput(format!("Unknown project category: {}", other))),
        }
    }
}

// ───── Stored Record ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    pub image_url: Option<String>,
    pub demo_url: Option<String>,
    pub repo_url: Option<String>,
    pub category: ProjectCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───── Input & Validation ───────────────────────────────────────────

/// Payload of the admin "add project" form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProject {
    #[validate(custom(function = "validate_not_blank", message = "Title is required"))]
    pub title: String,

    #[validate(custom(function = "validate_not_blank", message = "Description is required"))]
    pub description: String,

    #[validate(
        length(min = 1, message = "Add at least one technology"),
        custom(function = "validate_entries")
    )]
    pub tech_stack: Vec<String>,

    #[validate(
        required(message = "Please upload a project image"),
        custom(function = "validate_http_url")
    )]
    pub image_url: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_http_url"))]
    pub demo_url: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_http_url"))]
    pub repo_url: Option<String>,

    pub category: ProjectCategory,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProject {
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    #[validate(custom(function = "validate_patch_not_blank"))]
    pub title: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    #[validate(custom(function = "validate_patch_not_blank"))]
    pub description: Patch<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, message = "Add at least one technology"),
        custom(function = "validate_entries")
    )]
    pub tech_stack: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    #[validate(custom(function = "validate_patch_url"))]
    pub image_url: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    #[validate(custom(function = "validate_patch_url"))]
    pub demo_url: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    #[validate(custom(function = "validate_patch_url"))]
    pub repo_url: Patch<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ProjectCategory>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub category: Option<ProjectCategory>,
}

impl NewProject {
    /// Trims text fields; the server assigns id and timestamps.
    pub fn prepare_for_insert(&self) -> Result<serde_json::Value, AppError> {
        let mut prepared = self.clone();
        prepared.title = prepared.title.trim().to_string();
        prepared.description = prepared.description.trim().to_string();
        prepared.tech_stack = prepared
            .tech_stack
            .iter()
            .map(|t| t.trim().to_string())
            .collect();
        Ok(serde_json::to_value(prepared)?)
    }
}

impl UpdateProject {
    pub fn is_empty(&self) -> bool {
        self.title.is_unchanged()
            && self.description.is_unchanged()
            && self.tech_stack.is_none()
            && self.image_url.is_unchanged()
            && self.demo_url.is_unchanged()
            && self.repo_url.is_unchanged()
            && self.category.is_none()
    }

    /// Serializes the provided fields and stamps `updated_at`.
    pub fn prepare_for_update(&self, now: DateTime<Utc>) -> Result<serde_json::Value, AppError> {
        let mut patch = serde_json::to_value(self)?;
        if let Some(map) = patch.as_object_mut() {
            map.insert("updated_at".to_string(), serde_json::to_value(now)?);
        }
        Ok(patch)
    }
}
