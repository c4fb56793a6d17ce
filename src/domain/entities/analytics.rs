use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
        }
    }
}

// ───── Event Records ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct NewPageView {
    pub page_path: String,
    pub page_title: String,
    pub referrer: String,
    pub user_agent: String,
    pub device_type: DeviceType,
    pub browser: String,
    pub os: String,
    pub session_id: String,
    pub visitor_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProjectView {
    pub project_id: Uuid,
    pub session_id: String,
    pub visitor_id: String,
}

/// Pseudo-identifiers kept by the visitor's browser.
#[derive(Debug, Clone, PartialEq)]
pub struct VisitorIdentity {
    pub visitor_id: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PageViewRequest {
    pub page_path: String,
    #[serde(default)]
    pub page_title: String,
    #[serde(default)]
    pub referrer: Option<String>,
}

// ───── Aggregates ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentActivity {
    pub page_path: String,
    #[serde(default)]
    pub page_title: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub type DeviceCounts = BTreeMap<String, u64>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DevicePercentages {
    pub desktop: u8,
    pub mobile: u8,
    pub tablet: u8,
}

impl DevicePercentages {
    pub fn total(&self) -> u16 {
        self.desktop as u16 + self.mobile as u16 + self.tablet as u16
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_views: u64,
    pub unique_visitors: u64,
    pub project_views: u64,
    pub unread_messages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub window_days: i64,
    pub stats: DashboardStats,
    pub device_counts: DeviceCounts,
    pub device_percentages: DevicePercentages,
    pub recent_activity: Vec<RecentActivity>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionFailure {
    pub section: &'static str,
    pub error: String,
}

/// Dashboard where every section loads independently.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IsolatedDashboard {
    pub window_days: i64,
    pub total_views: Option<u64>,
    pub unique_visitors: Option<u64>,
    pub project_views: Option<u64>,
    pub unread_messages: Option<u64>,
    pub device_counts: Option<DeviceCounts>,
    pub device_percentages: Option<DevicePercentages>,
    pub recent_activity: Option<Vec<RecentActivity>>,
    pub messages: Option<Vec<Message>>,
    pub failures: Vec<SectionFailure>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub days: Option<i64>,
    #[serde(default)]
    pub isolated: bool,
}
