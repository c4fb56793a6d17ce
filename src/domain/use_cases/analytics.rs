use std::{collections::HashSet, sync::Arc};

use chrono::{Duration, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    constants::{DEFAULT_RECENT_ACTIVITY, MESSAGES_TABLE, PAGE_VIEWS_TABLE, PROJECT_VIEWS_TABLE},
    entities::{
        analytics::{
            Dashboard, DashboardStats, DeviceCounts, DevicePercentages, DeviceType, IsolatedDashboard,
            NewPageView, NewProjectView, PageViewRequest, RecentActivity, SectionFailure, VisitorIdentity,
        },
        message::{Message, MessageStatus},
    },
    errors::AppError,
    repositories::gateway::{decode_rows, Gateway, Query},
    settings::AppConfig,
    utils::device::UserAgentInfo,
};

const UNKNOWN_DEVICE: &str = "unknown";

/// Aggregates page/project views and contact messages for the admin dashboard.
pub struct AnalyticsHandler<G: Gateway + ?Sized> {
    gateway: Arc<G>,
    default_window_days: i64,
}

impl<G: Gateway + ?Sized> Clone for AnalyticsHandler<G> {
    fn clone(&self) -> Self {
        AnalyticsHandler {
            gateway: Arc::clone(&self.gateway),
            default_window_days: self.default_window_days,
        }
    }
}

fn window_start(days: i64) -> Result<String, AppError> {
    if days <= 0 {
        return Err(AppError::InvalidInput(format!("Window must be at least one day, got {}", days)));
    }
    Duration::try_days(days)
        .and_then(|window| Utc::now().checked_sub_signed(window))
        .map(|start| start.to_rfc3339())
        .ok_or_else(|| AppError::InvalidInput(format!("Window of {} days is out of range", days)))
}

/// Integer desktop/mobile/tablet shares.
///
/// Uses largest-remainder rounding so the three add up to exactly 100 when
/// any of them was seen; all zero otherwise. Other device labels are ignored.
pub fn device_percentages(counts: &DeviceCounts) -> DevicePercentages {
    let devices = [DeviceType::Desktop, DeviceType::Mobile, DeviceType::Tablet];
    let seen = devices.map(|device| counts.get(device.as_str()).copied().unwrap_or(0));
    let total: u64 = seen.iter().sum();
    if total == 0 {
        return DevicePercentages::default();
    }

    let mut shares = [0u64; 3];
    let mut remainders = [(0u64, 0usize); 3];
    for (i, count) in seen.iter().enumerate() {
        shares[i] = count * 100 / total;
        remainders[i] = (count * 100 % total, i);
    }

    let mut left = 100 - shares.iter().sum::<u64>();
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, i) in remainders {
        if left == 0 {
            break;
        }
        shares[i] += 1;
        left -= 1;
    }

    DevicePercentages {
        desktop: shares[0] as u8,
        mobile: shares[1] as u8,
        tablet: shares[2] as u8,
    }
}

fn section<T>(name: &'static str, result: Result<T, AppError>, failures: &mut Vec<SectionFailure>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(section = name, "Dashboard section failed: {}", e);
            failures.push(SectionFailure { section: name, error: e.to_string() });
            None
        }
    }
}

impl<G: Gateway + ?Sized> AnalyticsHandler<G> {
    pub fn new(gateway: Arc<G>, config: &AppConfig) -> Self {
        AnalyticsHandler {
            gateway,
            default_window_days: config.analytics_window_days,
        }
    }

    pub fn default_window_days(&self) -> i64 {
        self.default_window_days
    }

    // ───── Reads ─────────────────────────────────────────────────────

    pub async fn total_page_views(&self, days: i64) -> Result<u64, AppError> {
        let query = Query::new().gte("created_at", window_start(days)?);
        self.gateway.count(PAGE_VIEWS_TABLE, &query).await
    }

    pub async fn total_project_views(&self, days: i64) -> Result<u64, AppError> {
        let query = Query::new().gte("created_at", window_start(days)?);
        self.gateway.count(PROJECT_VIEWS_TABLE, &query).await
    }

    /// Distinct visitor ids seen in the window.
    pub async fn unique_visitors(&self, days: i64) -> Result<u64, AppError> {
        let query = Query::new()
            .select(&["visitor_id"])
            .gte("created_at", window_start(days)?);
        let rows = self.gateway.select(PAGE_VIEWS_TABLE, &query).await?;

        let visitors: HashSet<&str> = rows
            .iter()
            .filter_map(|row| row.get("visitor_id").and_then(Value::as_str))
            .collect();
        Ok(visitors.len() as u64)
    }

    pub async fn device_analytics(&self, days: i64) -> Result<DeviceCounts, AppError> {
        let query = Query::new()
            .select(&["device_type"])
            .gte("created_at", window_start(days)?);
        let rows = self.gateway.select(PAGE_VIEWS_TABLE, &query).await?;

        let mut counts = DeviceCounts::new();
        for row in &rows {
            let device = row
                .get("device_type")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_DEVICE);
            *counts.entry(device.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    pub async fn unread_messages_count(&self) -> Result<u64, AppError> {
        let query = Query::new().eq("status", MessageStatus::New.as_str());
        self.gateway.count(MESSAGES_TABLE, &query).await
    }

    pub async fn recent_activity(&self, limit: usize) -> Result<Vec<RecentActivity>, AppError> {
        let query = Query::new()
            .select(&["page_path", "page_title", "device_type", "created_at"])
            .order_desc("created_at")
            .limit(limit);
        decode_rows(self.gateway.select(PAGE_VIEWS_TABLE, &query).await?)
    }

    pub async fn contact_messages(&self, status: Option<MessageStatus>) -> Result<Vec<Message>, AppError> {
        let mut query = Query::new().order_desc("created_at");
        if let Some(status) = status {
            query = query.eq("status", status.as_str());
        }
        decode_rows(self.gateway.select(MESSAGES_TABLE, &query).await?)
    }

    // ───── Dashboard ─────────────────────────────────────────────────

    /// Loads every dashboard section concurrently; the first failure fails the whole load.
    pub async fn dashboard(&self, days: i64) -> Result<Dashboard, AppError> {
        window_start(days)?;

        let (total_views, unique_visitors, project_views, unread_messages, device_counts, recent_activity, messages) =
            tokio::try_join!(
                self.total_page_views(days),
                self.unique_visitors(days),
                self.total_project_views(days),
                self.unread_messages_count(),
                self.device_analytics(days),
                self.recent_activity(DEFAULT_RECENT_ACTIVITY),
                self.contact_messages(None),
            )?;

        Ok(Dashboard {
            window_days: days,
            stats: DashboardStats {
                total_views,
                unique_visitors,
                project_views,
                unread_messages,
            },
            device_percentages: device_percentages(&device_counts),
            device_counts,
            recent_activity,
            messages,
        })
    }

    /// Same sections as [`Self::dashboard`], each loaded independently.
    pub async fn dashboard_isolated(&self, days: i64) -> Result<IsolatedDashboard, AppError> {
        window_start(days)?;

        let (total_views, unique_visitors, project_views, unread_messages, device_counts, recent_activity, messages) =
            tokio::join!(
                self.total_page_views(days),
                self.unique_visitors(days),
                self.total_project_views(days),
                self.unread_messages_count(),
                self.device_analytics(days),
                self.recent_activity(DEFAULT_RECENT_ACTIVITY),
                self.contact_messages(None),
            );

        let mut failures = Vec::new();
        let device_counts = section("device_counts", device_counts, &mut failures);
        Ok(IsolatedDashboard {
            window_days: days,
            total_views: section("total_views", total_views, &mut failures),
            unique_visitors: section("unique_visitors", unique_visitors, &mut failures),
            project_views: section("project_views", project_views, &mut failures),
            unread_messages: section("unread_messages", unread_messages, &mut failures),
            device_percentages: device_counts.as_ref().map(device_percentages),
            device_counts,
            recent_activity: section("recent_activity", recent_activity, &mut failures),
            messages: section("messages", messages, &mut failures),
            failures,
        })
    }

    // ───── Tracking ──────────────────────────────────────────────────

    /// Records a page view. Failures are logged and never reach the visitor.
    pub async fn track_page_view(&self, request: &PageViewRequest, user_agent: &str, visitor: &VisitorIdentity) {
        let agent = UserAgentInfo::parse(user_agent);
        let view = NewPageView {
            page_path: request.page_path.clone(),
            page_title: request.page_title.clone(),
            referrer: request
                .referrer
                .clone()
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| "direct".to_string()),
            user_agent: user_agent.to_string(),
            device_type: agent.device,
            browser: agent.browser.to_string(),
            os: agent.os.to_string(),
            session_id: visitor.session_id.clone(),
            visitor_id: visitor.visitor_id.clone(),
        };

        let result = match serde_json::to_value(&view) {
            Ok(row) => self.gateway.insert(PAGE_VIEWS_TABLE, row).await.map(|_| ()),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::debug!(page = %request.page_path, "Page view not recorded: {}", e);
        }
    }

    pub async fn track_project_view(&self, project_id: Uuid, visitor: &VisitorIdentity) {
        let view = NewProjectView {
            project_id,
            session_id: visitor.session_id.clone(),
            visitor_id: visitor.visitor_id.clone(),
        };

        let result = match serde_json::to_value(&view) {
            Ok(row) => self.gateway.insert(PROJECT_VIEWS_TABLE, row).await.map(|_| ()),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::debug!(project_id = %project_id, "Project view not recorded: {}", e);
        }
    }
}
