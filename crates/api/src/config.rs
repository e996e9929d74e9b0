use crate::auth::captcha::CaptchaConfig;
use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Connection strings for the database, key-value store and object store are
/// read separately in `main`, since tests swap those collaborators out.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Whether the session cookie carries the `Secure` attribute
    /// (default: `true`; turn off for plain-HTTP local development).
    pub cookie_secure: bool,
    /// Whether `X-Forwarded-For` / `X-Real-IP` name the client for rate
    /// limiting (default: `false`). Only enable behind a proxy that
    /// overwrites those headers; otherwise the socket peer is used.
    pub trust_proxy_headers: bool,
    /// Session token signing and lifetime.
    pub jwt: JwtConfig,
    /// Login CAPTCHA verification. `None` skips verification.
    pub captcha: Option<CaptchaConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `COOKIE_SECURE`        | `true`                     |
    /// | `TRUST_PROXY_HEADERS`  | `false`                    |
    ///
    /// See [`JwtConfig::from_env`] and [`CaptchaConfig::from_env`] for the
    /// nested sections.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let cookie_secure: bool = std::env::var("COOKIE_SECURE")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("COOKIE_SECURE must be true or false");

        let trust_proxy_headers: bool = std::env::var("TRUST_PROXY_HEADERS")
            .unwrap_or_else(|_| "false".into())
            .parse()
            .expect("TRUST_PROXY_HEADERS must be true or false");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            cookie_secure,
            trust_proxy_headers,
            jwt: JwtConfig::from_env(),
            captcha: CaptchaConfig::from_env(),
        }
    }
}
