pub mod about;
pub mod analytics;
pub mod document;
pub mod experience;
pub mod message;
pub mod patch;
pub mod project;
pub mod session;
