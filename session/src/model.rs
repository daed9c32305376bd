use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::SessionError;

/// Durable storage keys. All four must be present for a stored session to be
/// usable; the set is written and removed as one batch.
pub const KEY_TOKEN: &str = "token";
pub const KEY_ROLE: &str = "role";
pub const KEY_USER_ID: &str = "user_id";
pub const KEY_USER: &str = "user";

pub const SESSION_KEYS: [&str; 4] = [KEY_TOKEN, KEY_ROLE, KEY_USER_ID, KEY_USER];

/// Classification of the logged-in actor.
///
/// Parsing lower-cases the raw string, so `"Trader"`, `"TRADER"` and
/// `"trader"` are the same role. Nothing downstream compares role strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Trader,
    Rider,
    Staff,
    /// Any role the app has no workspace for, kept normalized.
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "trader" => Role::Trader,
            "rider" => Role::Rider,
            "staff" => Role::Staff,
            _ => Role::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Trader => "trader",
            Role::Rider => "rider",
            Role::Staff => "staff",
            Role::Other(s) => s,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(SessionError::MissingField(KEY_ROLE));
        }
        Ok(Role::parse(s))
    }
}

/// Authenticated identity held for the lifetime of a login.
///
/// Every field is present by construction: [`Session::new`] rejects empty
/// strings and a `null` user record.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub user_id: String,
    /// Profile snapshot captured at login.
    pub user: Value,
}

impl Session {
    pub fn new(
        token: impl Into<String>,
        role: &str,
        user_id: impl Into<String>,
        user: Value,
    ) -> Result<Self, SessionError> {
        let token = token.into();
        let user_id = user_id.into();

        if token.trim().is_empty() {
            return Err(SessionError::MissingField(KEY_TOKEN));
        }
        let role: Role = role.parse()?;
        if user_id.trim().is_empty() {
            return Err(SessionError::MissingField(KEY_USER_ID));
        }
        if user.is_null() {
            return Err(SessionError::MissingField(KEY_USER));
        }

        Ok(Self {
            token,
            role,
            user_id,
            user,
        })
    }
}

/// What the rest of the app sees of the session at any instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AuthState {
    /// Durable restore has not finished yet.
    #[default]
    Restoring,
    SignedOut,
    SignedIn(Session),
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, AuthState::SignedIn(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::SignedIn(s) => Some(s),
            _ => None,
        }
    }
}
