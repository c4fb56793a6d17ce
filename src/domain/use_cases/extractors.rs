use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{entities::session::Identity, errors::{AppError, AuthError}, AppState};

pub const CONSOLE_COOKIE: &str = "admin_console";

/// Binds the signed-in session to the browser that signed in.
///
/// The session store is process-wide, so admin routes additionally require
/// the cookie issued at sign-in.
#[derive(Debug, Default)]
pub struct ConsoleKey(RwLock<Option<String>>);

impl ConsoleKey {
    pub fn issue(&self) -> String {
        let key = Uuid::new_v4().simple().to_string();
        *self.0.write() = Some(key.clone());
        key
    }

    pub fn revoke(&self) {
        *self.0.write() = None;
    }

    pub fn verify(&self, presented: &str) -> bool {
        self.0.read().as_deref() == Some(presented)
    }
}

/// Extractor for the signed-in admin.
/// Returns 401 if nobody is signed in or the console cookie does not match.
/// Usage: Add `admin: AdminSession` as a parameter to your handler function.
#[derive(Debug)]
pub struct AdminSession(pub Identity);

impl FromRequest for AdminSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return ready(Err(AppError::InternalError("application state missing".into()).into()));
        };

        let presented = req.cookie(CONSOLE_COOKIE);
        match (state.session.user(), presented) {
            (Some(user), Some(cookie)) if state.console.verify(cookie.value()) => {
                ready(Ok(AdminSession(user)))
            }
            _ => ready(Err(AuthError::NotAuthenticated.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_latest_key_verifies() {
        let console = ConsoleKey::default();
        let first = console.issue();
        let second = console.issue();
        assert!(!console.verify(&first));
        assert!(console.verify(&second));
        console.revoke();
        assert!(!console.verify(&second));
    }
}
