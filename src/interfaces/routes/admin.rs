use actix_web::web;

use crate::handlers::{about, contact_me, dashboard, documents, experience, projects, system};

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/health", web::get().to(system::admin_health_check))
            .route("/dashboard", web::get().to(dashboard::get_dashboard))
            .service(
                web::resource("/about")
                    .route(web::get().to(about::get_about_record))
                    .route(web::put().to(about::update_about)),
            )
            .service(
                web::resource("/experience")
                    .route(web::get().to(experience::list_experience))
                    .route(web::post().to(experience::create_experience)),
            )
            .service(
                web::resource("/experience/{id}")
                    .route(web::put().to(experience::update_experience))
                    .route(web::delete().to(experience::delete_experience)),
            )
            .service(
                web::resource("/projects")
                    .route(web::get().to(projects::admin_list_projects))
                    .route(web::post().to(projects::create_project)),
            )
            .route("/projects/image", web::post().to(projects::upload_project_image))
            .service(
                web::resource("/projects/{id}")
                    .route(web::put().to(projects::update_project))
                    .route(web::delete().to(projects::delete_project)),
            )
            .service(
                web::resource("/documents")
                    .route(web::get().to(documents::list_documents))
                    .route(web::post().to(documents::upload_document)),
            )
            .route("/documents/{id}", web::delete().to(documents::delete_document))
            .route("/messages", web::get().to(contact_me::list_messages))
            .route("/messages/{id}/read", web::post().to(contact_me::mark_message_read))
            .route("/messages/{id}", web::delete().to(contact_me::delete_message)),
    );
}
