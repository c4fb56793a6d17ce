use actix_web::{get, web, HttpResponse, Responder};

use crate::AppState;

#[get("/")]
pub async fn home(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "name": state.config.name,
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "theme": state.theme.theme(),
        "backend_configured": state.config.is_backend_configured(),
        "warning": state.config.config_warning(),
        "pages": ["/api/about", "/api/experience", "/api/projects", "/api/documents"]
    }))
}
