use actix_web::{
    cookie::{Cookie, SameSite},
    web, HttpResponse, Responder,
};

use crate::{
    entities::session::{Credentials, SignUpRequest},
    use_cases::extractors::CONSOLE_COOKIE,
    AppState,
};

fn console_cookie(key: String, secure: bool) -> Cookie<'static> {
    Cookie::build(CONSOLE_COOKIE, key)
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .finish()
}

pub async fn sign_in(
    state: web::Data<AppState>,
    credentials: web::Json<Credentials>,
) -> impl Responder {
    match state.session.sign_in(credentials.into_inner()).await {
        Ok(user) => {
            let key = state.console.issue();
            HttpResponse::Ok()
                .cookie(console_cookie(key, state.config.is_production()))
                .json(serde_json::json!({ "user": user }))
        }
        Err(e) => e.to_http_response(),
    }
}

pub async fn sign_up(
    state: web::Data<AppState>,
    request: web::Json<SignUpRequest>,
) -> impl Responder {
    match state.session.sign_up(request.into_inner()).await {
        Ok(user) => {
            let key = state.console.issue();
            HttpResponse::Created()
                .cookie(console_cookie(key, state.config.is_production()))
                .json(serde_json::json!({ "user": user }))
        }
        Err(e) => e.to_http_response(),
    }
}

/// Always ends the local session; a provider failure is only reported in the body.
pub async fn sign_out(state: web::Data<AppState>) -> impl Responder {
    let result = state.session.sign_out().await;
    state.console.revoke();

    let mut removal = Cookie::build(CONSOLE_COOKIE, "").path("/").finish();
    removal.make_removal();

    let body = match result {
        Ok(()) => serde_json::json!({ "message": "Signed out" }),
        Err(e) => serde_json::json!({
            "message": "Signed out",
            "warning": e.to_string()
        }),
    };
    HttpResponse::Ok().cookie(removal).json(body)
}

pub async fn me(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.session.state())
}
