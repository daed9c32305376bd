use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tracing::{info, instrument};

use crate::error::SessionError;
use crate::model::{AuthState, Role, Session};
use crate::store::SessionStore;

/// Single source of truth for the session during one process lifetime.
///
/// The in-memory state is published through a watch channel before any
/// persistence happens, so observers (the navigation gate) never wait on
/// disk. Durable writes are serialized so they land in call order.
pub struct SessionManager {
    state: watch::Sender<AuthState>,
    store: Arc<SessionStore>,
    persist: Mutex<()>,
}

impl SessionManager {
    /// Manager in the `Restoring` state. Call [`restore`](Self::restore)
    /// before rendering anything.
    pub fn new(store: Arc<SessionStore>) -> Self {
        let (state, _) = watch::channel(AuthState::Restoring);
        Self {
            state,
            store,
            persist: Mutex::new(()),
        }
    }

    /// Construct and restore in one step.
    pub async fn start(store: Arc<SessionStore>) -> Arc<Self> {
        let manager = Arc::new(Self::new(store));
        manager.restore().await;
        manager
    }

    /// Hydrate from durable storage. Anything short of a complete stored
    /// session yields `SignedOut`.
    ///
    /// Only replaces `Restoring`: a login or logout issued while the load was
    /// in flight wins, and its own write lands on disk after this one.
    #[instrument(skip(self), target = "session")]
    pub async fn restore(&self) -> AuthState {
        let _guard = self.persist.lock().await;
        let restored = self.store.load().await;

        let next = match restored {
            Some(s) => {
                info!(role = %s.role, user_id = %s.user_id, "session restored");
                AuthState::SignedIn(s)
            }
            None => {
                info!("no usable stored session");
                AuthState::SignedOut
            }
        };

        let applied = self.state.send_if_modified(|state| {
            if *state != AuthState::Restoring {
                return false;
            }
            *state = next;
            true
        });
        if !applied {
            info!("session changed during restore; keeping the newer state");
        }

        self.state()
    }

    /// Mark the user authenticated, then persist.
    ///
    /// A storage failure is logged by the store and does not fail the login:
    /// memory stays authoritative until the next restart.
    #[instrument(skip(self, token, user), target = "session")]
    pub async fn login(
        &self,
        token: &str,
        role: &str,
        user_id: &str,
        user: Value,
    ) -> Result<Session, SessionError> {
        let session = Session::new(token, role, user_id, user)?;

        self.state.send_replace(AuthState::SignedIn(session.clone()));
        info!(role = %session.role, "logged in");

        let _guard = self.persist.lock().await;
        self.store.save(&session).await;

        Ok(session)
    }

    /// Clear the session in memory and on disk.
    ///
    /// Idempotent. Returns `true` if a session was actually ended.
    #[instrument(skip(self), target = "session")]
    pub async fn logout(&self) -> bool {
        let mut ended = false;
        self.state.send_if_modified(|state| {
            if *state == AuthState::SignedOut {
                return false;
            }
            ended = state.is_logged_in();
            *state = AuthState::SignedOut;
            true
        });
        if ended {
            info!("logged out");
        }

        let _guard = self.persist.lock().await;
        self.store.clear().await;

        ended
    }

    /// Log out only if the current session still carries `token`.
    ///
    /// Used when the backend rejects a credential: a response to a request
    /// issued under an older token must not end a newer session.
    pub async fn expire(&self, token: &str) -> bool {
        let current = self.token();
        if current.as_deref() != Some(token) {
            info!("ignoring rejection for a token that is no longer current");
            return false;
        }

        info!("credential rejected by backend; forcing logout");
        self.logout().await
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state.borrow().is_logged_in()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.borrow().session().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().session().map(|s| s.token.clone())
    }

    pub fn role(&self) -> Option<Role> {
        self.state.borrow().session().map(|s| s.role.clone())
    }

    pub fn user_id(&self) -> Option<String> {
        self.state.borrow().session().map(|s| s.user_id.clone())
    }

    pub fn user(&self) -> Option<Value> {
        self.state.borrow().session().map(|s| s.user.clone())
    }

    /// Change notifications for the navigation gate and other observers.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }
}
