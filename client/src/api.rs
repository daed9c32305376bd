use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use common::logger::warn_if_slow;
use session::SessionManager;

use crate::de;
use crate::error::ClientError;
use crate::http::{ApiRequest, RawResponse, Transport};

/// Backend messages that mean the credential is no longer accepted, for
/// endpoints that do not answer with HTTP 401.
const REJECTION_MARKERS: &[&str] = &["invalid session", "session expired"];

const SLOW_CALL: Duration = Duration::from_secs(3);

/// The `{status|success, message, ...}` wrapper every endpoint uses.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default, deserialize_with = "de::opt_flag")]
    pub status: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_flag")]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: serde_json::Map<String, Value>,
}

impl Envelope {
    pub fn ok(&self) -> bool {
        self.status == Some(true) || self.success == Some(true)
    }

    /// Turn a failed envelope into `Rejected`, using the backend message when
    /// it sent one.
    pub fn into_result(self, fallback: &str) -> Result<Self, ClientError> {
        if self.ok() {
            Ok(self)
        } else {
            Err(ClientError::Rejected(
                self.message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            ))
        }
    }

    /// Deserialize one payload field (`orders`, `profile`, ...).
    pub fn field<T: DeserializeOwned>(&self, name: &str) -> Result<T, ClientError> {
        let v = self.data.get(name).cloned().unwrap_or(Value::Null);
        serde_json::from_value(v)
            .map_err(|e| ClientError::InvalidResponse(format!("field `{name}`: {e}")))
    }
}

pub fn is_rejection_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    REJECTION_MARKERS.iter().any(|m| lower.contains(m))
}

/// Parse a raw body as JSON; anything else is a malformed response.
pub fn parse_json(raw: &RawResponse) -> Result<Value, ClientError> {
    serde_json::from_str(&raw.body).map_err(|e| {
        warn!(status = raw.status, error = %e, "non-JSON response body");
        ClientError::InvalidResponse(e.to_string())
    })
}

/// HTTP access to the backend on behalf of the current session.
///
/// Authenticated calls attach the current bearer token. Any authorization
/// rejection (HTTP 401, or a body message saying the session is invalid or
/// expired) forces a global logout and surfaces as `SessionExpired`,
/// whichever screen or background refresh issued the call.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionManager>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub async fn get(&self, path: &str) -> Result<Envelope, ClientError> {
        self.authorized(ApiRequest::get(path)).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Result<Envelope, ClientError> {
        self.authorized(ApiRequest::post_json(path, body)).await
    }

    pub async fn post_form(
        &self,
        path: &str,
        fields: Vec<(String, String)>,
    ) -> Result<Envelope, ClientError> {
        self.authorized(ApiRequest::post_form(path, fields)).await
    }

    /// Unauthenticated call. Never triggers a logout.
    pub async fn public(&self, req: ApiRequest) -> Result<Value, ClientError> {
        let raw = self.transport.execute(req).await?;
        parse_json(&raw)
    }

    #[instrument(skip(self, req), fields(path = %req.path), target = "api")]
    async fn authorized(&self, req: ApiRequest) -> Result<Envelope, ClientError> {
        let token = self.session.token().ok_or(ClientError::NotLoggedIn)?;
        let raw = warn_if_slow(
            "api_call",
            SLOW_CALL,
            self.transport.execute(req.with_bearer(token.clone())),
        )
        .await?;

        if raw.status == 401 {
            return Err(self.reject(&token).await);
        }

        let body = parse_json(&raw)?;
        let envelope: Envelope = serde_json::from_value(body)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if let Some(msg) = &envelope.message {
            if is_rejection_message(msg) {
                return Err(self.reject(&token).await);
            }
        }

        debug!(status = raw.status, ok = envelope.ok(), "api call completed");
        Ok(envelope)
    }

    async fn reject(&self, token: &str) -> ClientError {
        warn!("backend rejected the session credential");
        self.session.expire(token).await;
        ClientError::SessionExpired
    }
}
