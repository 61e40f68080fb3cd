use axum_extra::extract::cookie::Key;
use url::Url;

use super::error::ApiError;
use crate::codes;
use crate::oauth::{AuthClient, OAuthConfig};

/// Shared gate settings used by both config and runtime state.
#[derive(Clone)]
pub(crate) struct GateSettings {
    pub(crate) cookie_key: Key,
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl_days: i64,
    pub(crate) secure_cookies: bool,
    pub(crate) auth_path: String,
    pub(crate) login_redirect: String,
    pub(crate) logout_redirect: String,
    pub(crate) error_redirect: String,
    pub(crate) dev_login_enabled: bool,
}

impl GateSettings {
    fn defaults() -> Self {
        Self {
            cookie_key: Key::generate(),
            session_cookie_name: "__tempmail_session".into(),
            session_ttl_days: 30,
            secure_cookies: true,
            auth_path: "/api/auth".into(),
            login_redirect: "/dashboard".into(),
            logout_redirect: "/".into(),
            error_redirect: "/login".into(),
            dev_login_enabled: false,
        }
    }
}

/// Gate service configuration.
///
/// Required fields (`client`) are constructor parameters — no runtime
/// "missing field" errors.
///
/// Use [`from_env()`](GateConfig::from_env) for convention-based setup,
/// or [`new()`](GateConfig::new) with `with_*` methods for full control.
pub struct GateConfig {
    pub(super) client: AuthClient,
    pub(super) settings: GateSettings,
    pub(super) service_api_url: Url,
    pub(super) redemption_codes: Vec<String>,
    pub(super) port: u16,
}

impl GateConfig {
    /// Create config with the required `AuthClient`.
    ///
    /// All optional fields use sensible defaults. Override with `with_*` methods.
    #[must_use]
    pub fn new(client: AuthClient) -> Self {
        Self {
            client,
            settings: GateSettings::defaults(),
            service_api_url: "http://127.0.0.1:4000"
                .parse()
                .expect("valid default URL"),
            redemption_codes: codes::DEFAULT_CODES
                .iter()
                .map(|c| (*c).to_string())
                .collect(),
            port: 3001,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `DISCORD_CLIENT_ID`: OAuth2 client ID
    /// - `DISCORD_CLIENT_SECRET`: OAuth2 client secret
    /// - `DISCORD_REDIRECT_URI`: OAuth2 callback URI (must be a valid URL)
    ///
    /// # Optional env vars
    /// - `DISCORD_AUTH_URL` / `DISCORD_TOKEN_URL` / `DISCORD_USERINFO_URL`: endpoint overrides
    /// - `GATE_SCOPES`: Comma-separated OAuth2 scopes
    /// - `SERVICE_API_URL`: Upstream service API base for dashboard data
    /// - `REDEMPTION_CODES`: Comma-separated allow-list override
    /// - `DEV_AUTH`: Set to `"1"` or `"true"` to enable dev-login route and disable secure cookies
    /// - `COOKIE_KEY`: Cookie encryption key bytes (at least 64)
    /// - `PORT`: Listen port (default 3001)
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if required env vars are missing or values
    /// are invalid.
    pub fn from_env() -> Result<Self, ApiError> {
        let client_id = std::env::var("DISCORD_CLIENT_ID")
            .map_err(|_| ApiError::Config("DISCORD_CLIENT_ID is required".into()))?;
        let client_secret = std::env::var("DISCORD_CLIENT_SECRET")
            .map_err(|_| ApiError::Config("DISCORD_CLIENT_SECRET is required".into()))?;
        let redirect_uri: Url = std::env::var("DISCORD_REDIRECT_URI")
            .map_err(|_| ApiError::Config("DISCORD_REDIRECT_URI is required".into()))?
            .parse()
            .map_err(|e| ApiError::Config(format!("DISCORD_REDIRECT_URI: {e}")))?;

        let mut oauth = OAuthConfig::new(client_id, client_secret, redirect_uri);

        if let Ok(url_str) = std::env::var("DISCORD_AUTH_URL") {
            let url: Url = url_str
                .parse()
                .map_err(|e| ApiError::Config(format!("DISCORD_AUTH_URL: {e}")))?;
            oauth = oauth.with_auth_url(url);
        }
        if let Ok(url_str) = std::env::var("DISCORD_TOKEN_URL") {
            let url: Url = url_str
                .parse()
                .map_err(|e| ApiError::Config(format!("DISCORD_TOKEN_URL: {e}")))?;
            oauth = oauth.with_token_url(url);
        }
        if let Ok(url_str) = std::env::var("DISCORD_USERINFO_URL") {
            let url: Url = url_str
                .parse()
                .map_err(|e| ApiError::Config(format!("DISCORD_USERINFO_URL: {e}")))?;
            oauth = oauth.with_userinfo_url(url);
        }
        if let Ok(scopes) = std::env::var("GATE_SCOPES") {
            oauth =
                oauth.with_scopes(scopes.split(',').map(|s| s.trim().to_string()).collect());
        }

        let dev_auth = matches!(
            std::env::var("DEV_AUTH").as_deref(),
            Ok("1") | Ok("true"),
        );

        let cookie_key = match std::env::var("COOKIE_KEY") {
            Ok(k) => Key::try_from(k.as_bytes()).map_err(|_| {
                ApiError::Config(
                    "COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?,
            Err(_) => Key::generate(),
        };

        let mut config = Self::new(AuthClient::new(oauth))
            .with_cookie_key(cookie_key)
            .with_secure_cookies(!dev_auth)
            .with_dev_login_enabled(dev_auth);

        if let Ok(url_str) = std::env::var("SERVICE_API_URL") {
            let url: Url = url_str
                .parse()
                .map_err(|e| ApiError::Config(format!("SERVICE_API_URL: {e}")))?;
            config = config.with_service_api_url(url);
        }
        if let Ok(list) = std::env::var("REDEMPTION_CODES") {
            config = config
                .with_redemption_codes(list.split(',').map(|s| s.trim().to_string()).collect());
        }
        if let Ok(port_str) = std::env::var("PORT") {
            let port = port_str
                .parse()
                .map_err(|e| ApiError::Config(format!("PORT: {e}")))?;
            config = config.with_port(port);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_ttl_days(mut self, days: i64) -> Self {
        self.settings.session_ttl_days = days;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.settings.auth_path = path.into();
        self
    }

    #[must_use]
    pub fn with_login_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.login_redirect = path.into();
        self
    }

    #[must_use]
    pub fn with_logout_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.logout_redirect = path.into();
        self
    }

    #[must_use]
    pub fn with_error_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.error_redirect = path.into();
        self
    }

    #[must_use]
    pub fn with_dev_login_enabled(mut self, enabled: bool) -> Self {
        self.settings.dev_login_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_service_api_url(mut self, url: Url) -> Self {
        self.service_api_url = url;
        self
    }

    #[must_use]
    pub fn with_redemption_codes(mut self, codes: Vec<String>) -> Self {
        self.redemption_codes = codes;
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Listen port for the binary.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}
