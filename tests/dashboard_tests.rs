mod test_utils;

use chrono::{Duration, Utc};
use portfolio_site::constants::{MESSAGES_TABLE, PAGE_VIEWS_TABLE, PROJECT_VIEWS_TABLE};
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

fn page_view(visitor: &str, device: Option<&str>, days_ago: i64) -> Value {
    json!({
        "id": uuid::Uuid::new_v4(),
        "page_path": "/projects",
        "page_title": "Projects",
        "device_type": device,
        "visitor_id": visitor,
        "session_id": format!("session-{}", visitor),
        "created_at": (Utc::now() - Duration::days(days_ago)).to_rfc3339()
    })
}

fn seed_traffic(app: &TestApp) {
    app.gateway.seed(PAGE_VIEWS_TABLE, vec![
        page_view("visitor-a", Some("desktop"), 1),
        page_view("visitor-a", Some("desktop"), 2),
        page_view("visitor-b", Some("mobile"), 3),
        page_view("visitor-c", Some("tablet"), 5),
        page_view("visitor-d", Some("desktop"), 60),
    ]);
    app.gateway.seed(PROJECT_VIEWS_TABLE, vec![json!({
        "id": uuid::Uuid::new_v4(),
        "project_id": uuid::Uuid::new_v4(),
        "visitor_id": "visitor-a",
        "session_id": "session-visitor-a",
        "created_at": Utc::now().to_rfc3339()
    })]);
    app.gateway.seed(MESSAGES_TABLE, vec![json!({
        "id": uuid::Uuid::new_v4(),
        "name": "Ada",
        "email": "ada@example.com",
        "message": "Hi",
        "status": "new",
        "created_at": Utc::now().to_rfc3339()
    })]);
}

#[actix_rt::test]
async fn dashboard_aggregates_the_window() {
    let app = TestApp::spawn().await;
    seed_traffic(&app);
    app.sign_in_demo().await;

    let response = app.get("/admin/dashboard?days=30").await;
    assert_eq!(response.status(), StatusCode::OK);

    let dashboard: Value = response.json().await.unwrap();
    assert_eq!(dashboard["stats"]["total_views"], 4);
    assert_eq!(dashboard["stats"]["unique_visitors"], 3);
    assert_eq!(dashboard["stats"]["project_views"], 1);
    assert_eq!(dashboard["stats"]["unread_messages"], 1);
    assert_eq!(dashboard["device_counts"]["desktop"], 2);

    let percentages = &dashboard["device_percentages"];
    let total = percentages["desktop"].as_u64().unwrap()
        + percentages["mobile"].as_u64().unwrap()
        + percentages["tablet"].as_u64().unwrap();
    assert_eq!(total, 100);
    assert_eq!(percentages["desktop"], 50);

    assert_eq!(dashboard["recent_activity"].as_array().unwrap().len(), 5);
}

#[actix_rt::test]
async fn default_window_is_used_without_days() {
    let app = TestApp::spawn().await;
    seed_traffic(&app);
    app.sign_in_demo().await;

    let dashboard: Value = app.get("/admin/dashboard").await.json().await.unwrap();
    assert_eq!(dashboard["window_days"], app.config.analytics_window_days);
}

#[actix_rt::test]
async fn non_positive_window_is_rejected() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;

    let response = app.get("/admin/dashboard?days=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn oversized_window_is_rejected() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;

    let response = app.get("/admin/dashboard?days=1000000000").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/admin/dashboard?days=1000000000&isolated=true").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn empty_window_has_no_visitors() {
    let app = TestApp::spawn().await;
    app.gateway.seed(PAGE_VIEWS_TABLE, vec![page_view("visitor-old", Some("desktop"), 60)]);
    app.sign_in_demo().await;

    let dashboard: Value = app.get("/admin/dashboard?days=7").await.json().await.unwrap();
    assert_eq!(dashboard["stats"]["total_views"], 0);
    assert_eq!(dashboard["stats"]["unique_visitors"], 0);
    assert_eq!(dashboard["device_percentages"]["desktop"], 0);
}

#[actix_rt::test]
async fn unread_count_follows_contact_and_mark_read() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;

    let unread = |dashboard: Value| dashboard["stats"]["unread_messages"].as_u64().unwrap();
    let before = unread(app.get("/admin/dashboard").await.json().await.unwrap());

    let response = app
        .post_json("/api/contact", &json!({
            "name": "Grace",
            "email": "grace@example.com",
            "message": "Loved the router project"
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = response.json::<Value>().await.unwrap()["id"].as_str().unwrap().to_string();

    let after_submit = unread(app.get("/admin/dashboard").await.json().await.unwrap());
    assert_eq!(after_submit, before + 1);

    let response = app.post_json(&format!("/admin/messages/{}/read", id), &json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let after_read = unread(app.get("/admin/dashboard").await.json().await.unwrap());
    assert_eq!(after_read, before);
}

#[actix_rt::test]
async fn one_failing_section_fails_the_whole_dashboard() {
    let app = TestApp::spawn().await;
    seed_traffic(&app);
    app.sign_in_demo().await;
    app.gateway.fail_reads(MESSAGES_TABLE, "relation \"messages\" does not exist");

    let response = app.get("/admin/dashboard").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[actix_rt::test]
async fn isolated_dashboard_keeps_healthy_sections() {
    let app = TestApp::spawn().await;
    seed_traffic(&app);
    app.sign_in_demo().await;
    app.gateway.fail_reads(MESSAGES_TABLE, "relation \"messages\" does not exist");

    let response = app.get("/admin/dashboard?isolated=true").await;
    assert_eq!(response.status(), StatusCode::OK);

    let dashboard: Value = response.json().await.unwrap();
    assert_eq!(dashboard["total_views"], 4);
    assert_eq!(dashboard["unread_messages"], Value::Null);
    assert_eq!(dashboard["messages"], Value::Null);

    let failed: Vec<&str> = dashboard["failures"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["section"].as_str().unwrap())
        .collect();
    assert_eq!(failed, vec!["unread_messages", "messages"]);
}
