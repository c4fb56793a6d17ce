use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const PROJECTS_TABLE: &str = "projects";
pub const EXPERIENCES_TABLE: &str = "experiences";
pub const ABOUT_TABLE: &str = "about";
pub const DOCUMENTS_TABLE: &str = "documents";
pub const MESSAGES_TABLE: &str = "messages";
pub const PAGE_VIEWS_TABLE: &str = "page_views";
pub const PROJECT_VIEWS_TABLE: &str = "project_views";
pub const ADMINS_TABLE: &str = "admins";

/// The About record is a singleton stored under this id.
pub const ABOUT_ID: i64 = 1;

pub const DEFAULT_RECENT_ACTIVITY: usize = 10;
pub const UPLOAD_CACHE_CONTROL: &str = "3600";

pub const VISITOR_COOKIE: &str = "analytics_visitor_id";
pub const SESSION_COOKIE: &str = "analytics_session_id";
