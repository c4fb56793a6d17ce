use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEMO_USER_ID: &str = "demo-user";

/// Authenticated identity as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn demo(email: &str) -> Self {
        Identity {
            id: DEMO_USER_ID.to_string(),
            email: Some(email.to_string()),
        }
    }

    pub fn is_demo(&self) -> bool {
        self.id == DEMO_USER_ID
    }
}

/// Tokens issued by the auth provider for the signed-in identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: Identity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "user", rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Anonymous,
    Authenticated(Identity),
}

impl SessionState {
    pub fn user(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Identity-change notification pushed by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Identity),
    SignedOut,
    TokenRefreshed(Identity),
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl From<SignUpRequest> for Credentials {
    fn from(request: SignUpRequest) -> Self {
        Credentials {
            email: request.email,
            password: request.password,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminInsert<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sign_up_password_is_rejected() {
        let request = SignUpRequest {
            email: "me@example.com".into(),
            password: "12345".into(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn session_state_serializes_with_tag() {
        let state = SessionState::Authenticated(Identity::demo("admin@example.com"));
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["state"], "authenticated");
        assert_eq!(value["user"]["id"], DEMO_USER_ID);
    }
}
