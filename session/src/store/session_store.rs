use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::logger::warn_if_slow;
use tracing::{debug, info, instrument, warn};

use super::KeyValueStore;
use crate::model::{KEY_ROLE, KEY_TOKEN, KEY_USER, KEY_USER_ID, SESSION_KEYS, Session};

/// Four-key, all-or-nothing persistence of a [`Session`].
///
/// The `load`/`save`/`clear` entry points are best-effort: storage failures
/// are logged and swallowed so that the worst outcome is a fresh login. The
/// `try_*` variants surface the error for callers that care.
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub async fn load(&self) -> Option<Session> {
        match self.try_load().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "failed to read stored session; starting signed out");
                None
            }
        }
    }

    pub async fn save(&self, session: &Session) {
        if let Err(e) = self.try_save(session).await {
            warn!(error = %e, "failed to persist session");
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.try_clear().await {
            warn!(error = %e, "failed to clear stored session");
        }
    }

    /// `Ok(None)` when any of the four keys is missing or unusable; a partial
    /// session is never restored.
    #[instrument(skip(self), target = "store")]
    pub async fn try_load(&self) -> anyhow::Result<Option<Session>> {
        let stored = warn_if_slow("session_kv_load", Duration::from_millis(100), async {
            self.kv.get_many(&SESSION_KEYS).await
        })
        .await
        .context("reading session keys")?;

        let field = |k: &str| stored.get(k).filter(|v| !v.trim().is_empty());

        let (Some(token), Some(role), Some(user_id), Some(user_json)) = (
            field(KEY_TOKEN),
            field(KEY_ROLE),
            field(KEY_USER_ID),
            field(KEY_USER),
        ) else {
            let present: Vec<&str> = SESSION_KEYS
                .iter()
                .copied()
                .filter(|k| field(*k).is_some())
                .collect();
            info!(?present, "incomplete session in storage; ignoring");
            return Ok(None);
        };

        let user = match serde_json::from_str::<serde_json::Value>(user_json) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "stored user record is not valid JSON; ignoring session");
                return Ok(None);
            }
        };

        match Session::new(token.clone(), role, user_id.clone(), user) {
            Ok(s) => {
                debug!(role = %s.role, user_id = %s.user_id, "session restored from storage");
                Ok(Some(s))
            }
            Err(e) => {
                warn!(error = %e, "stored session rejected");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, session), target = "store", fields(role = %session.role))]
    pub async fn try_save(&self, session: &Session) -> anyhow::Result<()> {
        let user_json = serde_json::to_string(&session.user)?;
        let entries = [
            (KEY_TOKEN, session.token.clone()),
            (KEY_ROLE, session.role.as_str().to_string()),
            (KEY_USER_ID, session.user_id.clone()),
            (KEY_USER, user_json),
        ];

        warn_if_slow("session_kv_save", Duration::from_millis(100), async {
            self.kv.set_many(&entries).await
        })
        .await
        .context("writing session keys")?;

        debug!("session saved");
        Ok(())
    }

    #[instrument(skip(self), target = "store")]
    pub async fn try_clear(&self) -> anyhow::Result<()> {
        warn_if_slow("session_kv_clear", Duration::from_millis(100), async {
            self.kv.remove_many(&SESSION_KEYS).await
        })
        .await
        .context("removing session keys")?;

        debug!("session keys cleared");
        Ok(())
    }
}
