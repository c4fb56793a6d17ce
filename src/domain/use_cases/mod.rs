pub mod about;
pub mod analytics;
pub mod documents;
pub mod experience;
pub mod extractors;
pub mod messages;
pub mod projects;
pub mod session;
pub mod theme;
mod uploads;
