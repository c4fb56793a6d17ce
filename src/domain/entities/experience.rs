use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    domain::validation::{validate_entries, validate_not_blank, validate_patch_not_blank},
    entities::patch::Patch,
    errors::AppError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    #[serde(alias = "title")]
    pub position: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub description: Vec<String>,
    #[serde(default, alias = "technologies")]
    pub skills: Vec<String>,
    #[serde(default)]
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

/// Older rows store the description as one text block, newer ones as bullets.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(text)) if text.trim().is_empty() => Vec::new(),
        Some(OneOrMany::One(text)) => vec![text],
        Some(OneOrMany::Many(items)) => items,
        None => Vec::new(),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_new_date_range"))]
pub struct NewExperience {
    #[validate(custom(function = "validate_not_blank", message = "Position is required"))]
    pub position: String,

    #[validate(custom(function = "validate_not_blank", message = "Company is required"))]
    pub company: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub duration: Option<String>,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(custom(function = "validate_entries"))]
    pub description: Vec<String>,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateExperience {
    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    #[validate(custom(function = "validate_patch_not_blank"))]
    pub position: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    #[validate(custom(function = "validate_patch_not_blank"))]
    pub company: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub location: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub duration: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub start_date: Patch<NaiveDate>,

    #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
    pub end_date: Patch<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_entries"))]
    pub description: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

fn validate_new_date_range(experience: &NewExperience) -> Result<(), ValidationError> {
    match (experience.start_date, experience.end_date) {
        (Some(start), Some(end)) if end < start => {
            let mut err = ValidationError::new("date_range");
            err.message = Some("End date must not be before start date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

impl NewExperience {
    pub fn prepare_for_insert(&self) -> Result<serde_json::Value, AppError> {
        let mut prepared = self.clone();
        prepared.position = prepared.position.trim().to_string();
        prepared.company = prepared.company.trim().to_string();
        Ok(serde_json::to_value(prepared)?)
    }
}

impl UpdateExperience {
    pub fn is_empty(&self) -> bool {
        self.position.is_unchanged()
            && self.company.is_unchanged()
            && self.location.is_unchanged()
            && self.duration.is_unchanged()
            && self.start_date.is_unchanged()
            && self.end_date.is_unchanged()
            && self.description.is_none()
            && self.skills.is_none()
            && self.order.is_none()
    }

    pub fn prepare_for_update(&self) -> Result<serde_json::Value, AppError> {
        Ok(serde_json::to_value(self)?)
    }
}
