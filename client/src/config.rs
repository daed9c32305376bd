use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Base URL every endpoint path is joined onto.
    pub api_base_url: String,

    /// SQLite URL of the durable session store.
    ///
    /// Only the four session keys are ever written or removed there, so the
    /// file can be shared with other local app state.
    pub session_db_url: String,

    /// Per-request timeout for backend calls.
    pub http_timeout_secs: u64,

    /// Run the second round trip (`validate_token.php`) after a successful
    /// code login before treating the user as logged in.
    pub validate_token: bool,

    /// One JSON object per log line instead of human-readable output.
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://stainbursters.name.ng/api".to_string(),
            session_db_url: "sqlite://stainbursters_session.db?mode=rwc".to_string(),
            http_timeout_secs: 10,
            validate_token: true,
            json_logs: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any variable source. Unparseable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("STAINBURSTERS_API_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let session_db_url = lookup("STAINBURSTERS_SESSION_DB").unwrap_or(defaults.session_db_url);

        let http_timeout_secs = parse_or(
            &lookup,
            "STAINBURSTERS_HTTP_TIMEOUT_SECS",
            defaults.http_timeout_secs,
        );

        let validate_token = lookup("STAINBURSTERS_VALIDATE_TOKEN")
            .map(|v| parse_flag(&v, defaults.validate_token))
            .unwrap_or(defaults.validate_token);

        let json_logs = lookup("APP_ENV").unwrap_or_default() == "production";

        Self {
            api_base_url,
            session_db_url,
            http_timeout_secs,
            validate_token,
            json_logs,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "unparseable config value; using default");
            default
        }),
    }
}

fn parse_flag(raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            tracing::warn!(value = %raw, default, "unparseable flag; using default");
            default
        }
    }
}
