pub mod about;
pub mod auth;
pub mod contact_me;
pub mod dashboard;
pub mod documents;
pub mod experience;
pub mod home;
pub mod json_error;
pub mod projects;
pub mod system;
pub mod theme;
pub mod tracking;
