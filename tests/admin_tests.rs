mod test_utils;

use portfolio_site::constants::{ADMINS_TABLE, MESSAGES_TABLE};
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

#[actix_rt::test]
async fn admin_routes_require_sign_in() {
    let app = TestApp::spawn().await;

    let response = app.post_json("/admin/projects", &sample_project("Router", "network")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/admin/dashboard").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn signed_in_session_is_bound_to_the_signing_browser() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;

    let own = app.get("/admin/health").await;
    assert_eq!(own.status(), StatusCode::OK);

    let stranger = app
        .other_browser()
        .get(app.url("/admin/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(stranger.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn project_lifecycle() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;

    let response = app.post_json("/admin/projects", &sample_project("Router", "network")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let public: Vec<Value> = app.get("/api/projects").await.json().await.unwrap();
    assert_eq!(public.len(), 1);

    let response = app
        .put_json(&format!("/admin/projects/{}", id), &json!({ "title": "Edge Router", "demo_url": null }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["title"], "Edge Router");

    let public: Vec<Value> = app.get("/api/projects").await.json().await.unwrap();
    assert_eq!(public[0]["title"], "Edge Router");

    let response = app.delete(&format!("/admin/projects/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let public: Vec<Value> = app.get("/api/projects").await.json().await.unwrap();
    assert!(public.is_empty());
}

#[actix_rt::test]
async fn partial_update_leaves_other_fields_alone() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;

    let created: Value = app
        .post_json("/admin/projects", &sample_project("Router", "network"))
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .put_json(&format!("/admin/projects/{}", id), &json!({ "category": "web" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();

    assert_eq!(updated["category"], "web");
    for field in ["id", "title", "description", "tech_stack", "image_url", "repo_url", "demo_url", "created_at"] {
        assert_eq!(updated[field], created[field], "{} changed", field);
    }
}

#[actix_rt::test]
async fn deleting_twice_succeeds() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;

    let created: Value = app
        .post_json("/admin/projects", &sample_project("Router", "network"))
        .await
        .json()
        .await
        .unwrap();
    let path = format!("/admin/projects/{}", created["id"].as_str().unwrap());

    assert_eq!(app.delete(&path).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&path).await.status(), StatusCode::NO_CONTENT);

    let public: Vec<Value> = app.get("/api/projects").await.json().await.unwrap();
    assert!(public.is_empty());
}

#[actix_rt::test]
async fn project_without_image_is_rejected() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;

    let mut project = sample_project("Router", "network");
    project.as_object_mut().unwrap().remove("image_url");

    let response = app.post_json("/admin/projects", &project).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["details"][0]["field"], "image_url");
}

#[actix_rt::test]
async fn updating_a_missing_project_is_404() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;

    let response = app
        .put_json(&format!("/admin/projects/{}", uuid::Uuid::new_v4()), &json!({ "title": "Nope" }))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn malformed_id_is_a_json_400() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;

    let response = app.delete("/admin/projects/not-a-uuid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid path parameter");
}

#[actix_rt::test]
async fn about_is_created_on_first_save_then_patched() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;

    let response = app
        .put_json("/admin/about", &json!({ "bio": "I build **networks**", "skills": ["Rust"] }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .put_json("/admin/about", &json!({ "contact_info": { "email": "me@example.com" } }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let about: Value = response.json().await.unwrap();
    assert_eq!(about["bio"], "I build **networks**");
    assert_eq!(about["contact_info"]["email"], "me@example.com");

    assert_eq!(app.gateway.rows("about").len(), 1);
}

#[actix_rt::test]
async fn experience_lifecycle() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;

    let response = app
        .post_json("/admin/experience", &json!({
            "position": "Network Engineer",
            "company": "Acme",
            "description": ["Ran the backbone"],
            "skills": ["BGP"],
            "order": 1
        }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .put_json(&format!("/admin/experience/{}", id), &json!({ "company": "Acme Corp" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let listed: Vec<Value> = app.get("/api/experience").await.json().await.unwrap();
    assert_eq!(listed[0]["company"], "Acme Corp");

    let response = app.delete(&format!("/admin/experience/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn marking_a_message_read_is_idempotent() {
    let app = TestApp::spawn().await;
    app.post_json("/api/contact", &json!({
        "name": "Ada",
        "email": "ada@example.com",
        "message": "Hello there"
    }))
    .await;
    app.sign_in_demo().await;

    let messages: Vec<Value> = app.get("/admin/messages?status=new").await.json().await.unwrap();
    assert_eq!(messages.len(), 1);
    let id = messages[0]["id"].as_str().unwrap().to_string();

    for _ in 0..2 {
        let response = app.post_json(&format!("/admin/messages/{}/read", id), &json!({})).await;
        assert_eq!(response.status(), StatusCode::OK);
        let message: Value = response.json().await.unwrap();
        assert_eq!(message["status"], "read");
    }

    let unread: Vec<Value> = app.get("/admin/messages?status=new").await.json().await.unwrap();
    assert!(unread.is_empty());

    let response = app.delete(&format!("/admin/messages/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.gateway.rows(MESSAGES_TABLE).is_empty());
}

#[actix_rt::test]
async fn permission_errors_surface_as_403() {
    let app = TestApp::spawn().await;
    app.sign_in_demo().await;
    app.gateway.reject_writes("projects", "new row violates row-level security policy");

    let response = app.post_json("/admin/projects", &sample_project("Router", "network")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = response.json().await.unwrap();
    assert!(body["notice"].as_str().unwrap().starts_with("Permission denied"));
}

#[actix_rt::test]
async fn sign_up_signs_in_and_records_admin() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/auth/sign-up", &json!({ "email": "new@example.com", "password": "secret1" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let me: Value = app.get("/auth/me").await.json().await.unwrap();
    assert_eq!(me["state"], "authenticated");
    assert_eq!(me["user"]["email"], "new@example.com");
    assert_eq!(app.gateway.rows(ADMINS_TABLE).len(), 1);

    let response = app.get("/admin/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn short_sign_up_password_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/auth/sign-up", &json!({ "email": "new@example.com", "password": "123" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn wrong_password_keeps_visitor_anonymous() {
    let app = TestApp::spawn().await;
    app.gateway.register_user("owner@example.com", "correct-horse").unwrap();

    let response = app
        .post_json("/auth/sign-in", &json!({ "email": "owner@example.com", "password": "wrong" }))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let me: Value = app.get("/auth/me").await.json().await.unwrap();
    assert_eq!(me["state"], "anonymous");
}

#[actix_rt::test]
async fn sign_out_revokes_admin_access() {
    let app = TestApp::spawn().await;
    app.gateway.register_user("owner@example.com", "correct-horse").unwrap();

    let response = app
        .post_json("/auth/sign-in", &json!({ "email": "owner@example.com", "password": "correct-horse" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.get("/admin/health").await.status(), StatusCode::OK);

    let response = app.post_json("/auth/sign-out", &json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(app.get("/admin/health").await.status(), StatusCode::UNAUTHORIZED);
    let me: Value = app.get("/auth/me").await.json().await.unwrap();
    assert_eq!(me["state"], "anonymous");
}

#[actix_rt::test]
async fn sign_in_without_backend_reports_configuration() {
    let app = TestApp::spawn_with(portfolio_site::settings::AppConfig::default()).await;

    let response = app
        .post_json("/auth/sign-in", &json!({ "email": "owner@example.com", "password": "pw" }))
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
