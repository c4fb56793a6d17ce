#![allow(dead_code)]

use std::{net::TcpListener, sync::Arc, time::Duration};

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use portfolio_site::{
    repositories::{gateway::Gateway, memory::MemoryGateway},
    routes::configure_routes,
    settings::{AppConfig, AppEnvironment},
    AppState,
};
use reqwest::{Client, Response};
use serde_json::{json, Value};

pub const DEMO_EMAIL: &str = "admin@example.com";
pub const DEMO_PASSWORD: &str = "password123";

pub struct TestApp {
    pub state: Arc<AppState>,
    pub gateway: Arc<MemoryGateway>,
    pub address: String,
    pub client: Client,
    pub config: AppConfig,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: AppConfig) -> Self {
        let gateway = Arc::new(MemoryGateway::new());
        let shared: Arc<dyn Gateway> = gateway.clone();
        let state = Arc::new(AppState::new(config.clone(), shared));
        state.session.initialize().await;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let state_clone = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::from(state_clone.clone()))
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(1)
        .run();

        tokio::spawn(server);

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build client");
        while client.get(&address).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            state,
            gateway,
            address,
            client,
            config,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// A client with its own cookie jar, i.e. a different browser.
    pub fn other_browser(&self) -> Client {
        Client::builder().cookie_store(true).build().unwrap()
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.expect("GET failed")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client.post(self.url(path)).json(body).send().await.expect("POST failed")
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Response {
        self.client.put(self.url(path)).json(body).send().await.expect("PUT failed")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client.delete(self.url(path)).send().await.expect("DELETE failed")
    }

    pub async fn sign_in_demo(&self) -> Value {
        let response = self
            .post_json("/auth/sign-in", &json!({ "email": DEMO_EMAIL, "password": DEMO_PASSWORD }))
            .await;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            panic!("Sign-in failed: ({}): {}", status, body);
        }
        response.json().await.expect("Failed to parse sign-in response")
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "Portfolio Site Test".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        worker_count: 1,
        backend_url: "https://portfolio-test.supabase.co".to_string(),
        backend_anon_key: "test-anon-key-that-is-long-enough-1234567890".to_string(),
        allow_demo_login: true,
        demo_admin_email: DEMO_EMAIL.to_string(),
        demo_admin_password: DEMO_PASSWORD.to_string(),
        cors_allowed_origins: vec!["*".to_string()],
        ..AppConfig::default()
    }
}

pub fn sample_project(title: &str, category: &str) -> Value {
    json!({
        "title": title,
        "description": "A project used in tests",
        "tech_stack": ["Rust", "actix-web"],
        "image_url": "https://cdn.example.com/projects/cover.png",
        "repo_url": "https://github.com/example/project",
        "category": category
    })
}

/// Smallest valid PNG: signature plus IHDR chunk header.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R']);
    bytes.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0]);
    bytes.extend_from_slice(&[0x1F, 0x15, 0xC4, 0x89]);
    bytes
}

pub fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n".to_vec()
}
