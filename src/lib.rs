use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;

pub use domain::{entities, use_cases, validation};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{auth, utils};

use repositories::gateway::Gateway;
use settings::AppConfig;
use use_cases::{
    about::AboutHandler, analytics::AnalyticsHandler, documents::DocumentHandler,
    experience::ExperienceHandler, extractors::ConsoleKey, messages::MessageHandler,
    projects::ProjectHandler, session::SessionStore, theme::ThemeStore,
};

pub type AppProjectHandler = ProjectHandler<dyn Gateway>;
pub type AppSessionStore = SessionStore<dyn Gateway>;

/// Everything the handlers share, built once per process.
pub struct AppState {
    pub config: AppConfig,
    pub gateway: Arc<dyn Gateway>,
    pub projects: AppProjectHandler,
    pub experience: ExperienceHandler<dyn Gateway>,
    pub about: AboutHandler<dyn Gateway>,
    pub documents: DocumentHandler<dyn Gateway>,
    pub messages: MessageHandler<dyn Gateway>,
    pub analytics: AnalyticsHandler<dyn Gateway>,
    pub session: AppSessionStore,
    pub theme: ThemeStore,
    pub console: ConsoleKey,
}

impl AppState {
    pub fn new(config: AppConfig, gateway: Arc<dyn Gateway>) -> Self {
        AppState {
            projects: ProjectHandler::new(Arc::clone(&gateway), &config),
            experience: ExperienceHandler::new(Arc::clone(&gateway), &config),
            about: AboutHandler::new(Arc::clone(&gateway), &config),
            documents: DocumentHandler::new(Arc::clone(&gateway), &config),
            messages: MessageHandler::new(Arc::clone(&gateway), &config),
            analytics: AnalyticsHandler::new(Arc::clone(&gateway), &config),
            session: SessionStore::new(Arc::clone(&gateway), &config),
            theme: ThemeStore::new(config.dark_mode),
            console: ConsoleKey::default(),
            gateway,
            config,
        }
    }
}
