use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use session::Session;

use crate::api::{ApiClient, Envelope};
use crate::de;
use crate::error::ClientError;
use crate::http::ApiRequest;

const LOGIN_PATH: &str = "login_with_code.php";
const VALIDATE_PATH: &str = "validate_token.php";
const SWITCH_ROLE_PATH: &str = "switch_role.php";
const PROFILE_PATH: &str = "get_profile_data.php";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<Value>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    user_id: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    role: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    user_id: Option<String>,
}

/// Login exchange and other identity operations.
pub struct AuthService {
    api: ApiClient,
    validate_token: bool,
}

impl AuthService {
    pub fn new(api: ApiClient, validate_token: bool) -> Self {
        Self {
            api,
            validate_token,
        }
    }

    /// Exchange phone + access code for a session.
    ///
    /// On any failure the session holder is left untouched, so the user stays
    /// on the login screen.
    #[instrument(skip(self, access_code), target = "auth")]
    pub async fn login_with_code(
        &self,
        phone: &str,
        access_code: &str,
    ) -> Result<Session, ClientError> {
        let body = json!({ "phone": phone, "access_code": access_code });
        let value = self.api.public(ApiRequest::post_json(LOGIN_PATH, body)).await?;

        let resp: LoginResponse = serde_json::from_value(value)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if !resp.success {
            warn!(message = ?resp.message, "login refused");
            return Err(ClientError::Rejected(
                resp.message
                    .unwrap_or_else(|| "Invalid code or phone number".to_string()),
            ));
        }

        let token = resp
            .token
            .as_deref()
            .map(strip_bearer)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::InvalidResponse("login response has no token".into()))?
            .to_string();

        let (mut role, mut user_id) = (resp.role, resp.user_id);

        if self.validate_token {
            let validated = self.validate(&token).await?;
            role = validated.role.or(role);
            user_id = validated.user_id.or(user_id);
        }

        let role = role.ok_or_else(|| ClientError::InvalidResponse("no role for user".into()))?;
        let user_id =
            user_id.ok_or_else(|| ClientError::InvalidResponse("no user id for user".into()))?;
        let user = resp.user.unwrap_or(Value::Null);

        let session = self
            .api
            .session()
            .login(&token, &role, &user_id, user)
            .await?;

        info!(role = %session.role, user_id = %session.user_id, "login complete");
        Ok(session)
    }

    /// Second round trip confirming a freshly issued token. Failure routes to
    /// the same outcome as a refused login.
    async fn validate(&self, token: &str) -> Result<ValidateResponse, ClientError> {
        let value = self
            .api
            .public(ApiRequest::get(VALIDATE_PATH).with_bearer(token))
            .await
            .map_err(|e| match e {
                ClientError::InvalidResponse(_) => {
                    ClientError::Rejected("Failed to validate session. Please try again.".into())
                }
                other => other,
            })?;

        let resp: ValidateResponse = serde_json::from_value(value)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if !resp.success {
            warn!("token validation refused");
            return Err(ClientError::Rejected(
                "Your session is invalid or expired.".into(),
            ));
        }

        Ok(resp)
    }

    /// Move the current user to another role using a role access code. On
    /// success the session is re-established with the new role, which moves
    /// the navigation gate to that role's workspace.
    #[instrument(skip(self, access_code), target = "auth")]
    pub async fn switch_role(
        &self,
        new_role: &str,
        access_code: &str,
    ) -> Result<Session, ClientError> {
        if new_role.trim().is_empty() || access_code.trim().is_empty() {
            return Err(ClientError::Rejected(
                "Please select a role and enter access code".into(),
            ));
        }

        let current = self.api.session().session().ok_or(ClientError::NotLoggedIn)?;

        self.api
            .post_form(
                SWITCH_ROLE_PATH,
                vec![
                    ("user_id".into(), current.user_id.clone()),
                    ("new_role".into(), new_role.to_string()),
                    ("access_code".into(), access_code.to_string()),
                ],
            )
            .await?
            .into_result("Invalid access code")?;

        let session = self
            .api
            .session()
            .login(&current.token, new_role, &current.user_id, current.user)
            .await?;

        info!(role = %session.role, "role switched");
        Ok(session)
    }

    /// Purely local.
    pub async fn logout(&self) -> bool {
        self.api.session().logout().await
    }

    pub async fn profile(&self) -> Result<Value, ClientError> {
        let env: Envelope = self
            .api
            .get(PROFILE_PATH)
            .await?
            .into_result("Failed to fetch profile")?;
        env.field("profile")
    }
}

fn strip_bearer(raw: &str) -> &str {
    raw.trim().strip_prefix("Bearer ").unwrap_or(raw.trim()).trim()
}
