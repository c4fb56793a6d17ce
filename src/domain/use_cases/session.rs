use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use tokio::{
    sync::{broadcast::error::RecvError, watch},
    task::JoinHandle,
};
use validator::Validate;
use zeroize::Zeroizing;

use crate::{
    constants::ADMINS_TABLE,
    entities::session::{AdminInsert, AuthEvent, Credentials, Identity, SessionState, SignUpRequest},
    errors::AuthError,
    repositories::gateway::Gateway,
    settings::AppConfig,
};

struct DemoAccount {
    email: String,
    password: Zeroizing<String>,
}

impl DemoAccount {
    fn matches(&self, credentials: &Credentials) -> bool {
        self.email.eq_ignore_ascii_case(credentials.email.trim()) && *self.password == credentials.password
    }
}

/// Process-wide record of who is signed in.
///
/// State changes come from this store's own operations and from the
/// gateway's identity notifications (token refreshes, remote sign-outs).
pub struct SessionStore<G: Gateway + ?Sized> {
    gateway: Arc<G>,
    state: Arc<watch::Sender<SessionState>>,
    listener: Mutex<Option<JoinHandle<()>>>,
    demo: Option<DemoAccount>,
    backend_configured: bool,
}

impl<G: Gateway + ?Sized> SessionStore<G> {
    pub fn new(gateway: Arc<G>, config: &AppConfig) -> Self {
        let demo = config.allow_demo_login.then(|| DemoAccount {
            email: config.demo_admin_email.clone(),
            password: Zeroizing::new(config.demo_admin_password.clone()),
        });
        let (state, _) = watch::channel(SessionState::Uninitialized);

        SessionStore {
            gateway,
            state: Arc::new(state),
            listener: Mutex::new(None),
            demo,
            backend_configured: config.is_backend_configured(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn user(&self) -> Option<Identity> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn set(&self, next: SessionState) {
        self.state.send_replace(next);
    }

    fn not_configured() -> AuthError {
        AuthError::NotConfigured(
            "set APP_BACKEND_URL and APP_BACKEND_ANON_KEY to enable sign-in".to_string(),
        )
    }

    /// Loads the current identity and starts following identity changes.
    ///
    /// Never fails: a provider error is logged and the store becomes anonymous.
    pub async fn initialize(&self) {
        let events = self.gateway.subscribe();

        match self.gateway.current_user().await {
            Ok(Some(identity)) => {
                tracing::info!(user_id = %identity.id, "Restored signed-in session");
                self.set(SessionState::Authenticated(identity));
            }
            Ok(None) => self.set(SessionState::Anonymous),
            Err(e) => {
                tracing::error!("Failed to load the current session: {}", e);
                self.set(SessionState::Anonymous);
            }
        }

        let mut listener = self.listener.lock();
        if listener.is_none() {
            *listener = Some(tokio::spawn(follow_identity_changes(events, Arc::clone(&self.state))));
        }
    }

    pub async fn sign_in(&self, credentials: Credentials) -> Result<Identity, AuthError> {
        credentials.validate()?;

        if let Some(demo) = self.demo.as_ref().filter(|demo| demo.matches(&credentials)) {
            let identity = Identity::demo(&demo.email);
            tracing::warn!("Signed in with the demo account");
            self.set(SessionState::Authenticated(identity.clone()));
            return Ok(identity);
        }

        if !self.backend_configured {
            return Err(Self::not_configured());
        }

        match self.gateway.sign_in_with_password(&credentials).await {
            Ok(session) => {
                tracing::info!(user_id = %session.user.id, "Signed in");
                self.set(SessionState::Authenticated(session.user.clone()));
                Ok(session.user)
            }
            Err(e) => {
                tracing::warn!("Sign-in failed: {}", e);
                if !self.is_authenticated() {
                    self.set(SessionState::Anonymous);
                }
                Err(e)
            }
        }
    }

    /// Creates an account and signs it in. The companion admin row is best effort.
    pub async fn sign_up(&self, request: SignUpRequest) -> Result<Identity, AuthError> {
        request.validate()?;
        if !self.backend_configured {
            return Err(Self::not_configured());
        }

        let credentials = Credentials::from(request);
        let identity = self.gateway.sign_up(&credentials).await?;
        tracing::info!(user_id = %identity.id, "Account created");
        self.set(SessionState::Authenticated(identity.clone()));

        let email = identity.email.as_deref().unwrap_or(credentials.email.as_str());
        let admin = AdminInsert { user_id: &identity.id, email };
        if let Err(e) = self.gateway.insert(ADMINS_TABLE, json!(admin)).await {
            tracing::warn!(user_id = %identity.id, "Could not record admin row: {}", e);
        }

        Ok(identity)
    }

    /// Ends the session. The store is anonymous afterwards even if the provider call fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let is_demo = self.user().is_some_and(|user| user.is_demo());
        let result = if is_demo { Ok(()) } else { self.gateway.sign_out().await };

        self.set(SessionState::Anonymous);
        if let Err(e) = &result {
            tracing::warn!("Provider sign-out failed: {}", e);
        }
        result
    }
}

async fn follow_identity_changes(
    mut events: tokio::sync::broadcast::Receiver<AuthEvent>,
    state: Arc<watch::Sender<SessionState>>,
) {
    loop {
        match events.recv().await {
            Ok(AuthEvent::SignedIn(identity)) | Ok(AuthEvent::TokenRefreshed(identity)) => {
                state.send_replace(SessionState::Authenticated(identity));
            }
            Ok(AuthEvent::SignedOut) => {
                // The demo identity has no provider session to lose.
                if !state.borrow().user().is_some_and(Identity::is_demo) {
                    state.send_replace(SessionState::Anonymous);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Missed identity notifications");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

impl<G: Gateway + ?Sized> Drop for SessionStore<G> {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.lock().take() {
            listener.abort();
        }
    }
}
