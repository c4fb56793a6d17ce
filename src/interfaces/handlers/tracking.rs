use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    http::header::USER_AGENT,
    web, HttpRequest, HttpResponse, Responder,
};
use uuid::Uuid;

use crate::{
    constants::{SESSION_COOKIE, VISITOR_COOKIE},
    entities::analytics::{PageViewRequest, VisitorIdentity},
    utils::visitor::{is_well_formed, new_session_id, new_visitor_id},
    AppState,
};

const VISITOR_COOKIE_DAYS: i64 = 365;

/// Visitor identity read from the request, plus the cookies that must be
/// (re)issued because they were missing or malformed.
struct ResolvedVisitor {
    identity: VisitorIdentity,
    cookies: Vec<Cookie<'static>>,
}

fn resolve_visitor(req: &HttpRequest) -> ResolvedVisitor {
    let mut cookies = Vec::new();

    let visitor_id = match req.cookie(VISITOR_COOKIE) {
        Some(c) if is_well_formed(c.value(), "visitor") => c.value().to_string(),
        _ => {
            let id = new_visitor_id();
            cookies.push(
                Cookie::build(VISITOR_COOKIE, id.clone())
                    .path("/")
                    .same_site(SameSite::Lax)
                    .max_age(CookieDuration::days(VISITOR_COOKIE_DAYS))
                    .finish(),
            );
            id
        }
    };

    // No max-age: lives until the browser session ends.
    let session_id = match req.cookie(SESSION_COOKIE) {
        Some(c) if is_well_formed(c.value(), "session") => c.value().to_string(),
        _ => {
            let id = new_session_id();
            cookies.push(
                Cookie::build(SESSION_COOKIE, id.clone())
                    .path("/")
                    .same_site(SameSite::Lax)
                    .finish(),
            );
            id
        }
    };

    ResolvedVisitor {
        identity: VisitorIdentity { visitor_id, session_id },
        cookies,
    }
}

fn no_content_with(cookies: Vec<Cookie<'static>>) -> HttpResponse {
    let mut response = HttpResponse::NoContent();
    for cookie in cookies {
        response.cookie(cookie);
    }
    response.finish()
}

pub async fn track_page_view(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<PageViewRequest>,
) -> impl Responder {
    let visitor = resolve_visitor(&req);
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    state.analytics.track_page_view(&body, user_agent, &visitor.identity).await;
    no_content_with(visitor.cookies)
}

pub async fn track_project_view(
    req: HttpRequest,
    state: web::Data<AppState>,
    project_id: web::Path<Uuid>,
) -> impl Responder {
    let visitor = resolve_visitor(&req);
    state.analytics.track_project_view(project_id.into_inner(), &visitor.identity).await;
    no_content_with(visitor.cookies)
}
