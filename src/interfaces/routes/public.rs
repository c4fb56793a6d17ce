use actix_web::web;

use crate::handlers::{about, contact_me, documents, experience, projects, theme, tracking};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/about", web::get().to(about::get_about))
            .route("/experience", web::get().to(experience::list_experience))
            .route("/projects", web::get().to(projects::list_projects))
            .route("/documents", web::get().to(documents::list_documents))
            .route("/documents/cv", web::get().to(documents::latest_cv))
            .route("/contact", web::post().to(contact_me::submit_contact))
            .route("/theme", web::get().to(theme::get_theme))
            .route("/theme/toggle", web::post().to(theme::toggle_theme))
            .service(
                web::scope("/track")
                    .route("/page-view", web::post().to(tracking::track_page_view))
                    .route("/projects/{id}", web::post().to(tracking::track_project_view)),
            ),
    );
}
