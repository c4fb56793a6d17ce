use actix_web::web;

use crate::handlers::auth;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/sign-in", web::post().to(auth::sign_in))
            .route("/sign-up", web::post().to(auth::sign_up))
            .route("/sign-out", web::post().to(auth::sign_out))
            .route("/me", web::get().to(auth::me)),
    );
}
