//! Session token signing and verification.
//!
//! Tokens are HS256-signed JWTs carrying a [`Claims`] payload. A token only
//! grants access while its `jti` is also present in the session index (see
//! [`super::session`]); this module checks the signature and expiry alone.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use pura_core::types::DbId;
use serde::{Deserialize, Serialize};

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the user's database id.
    pub sub: DbId,
    /// Unique token id (UUID v4). Keys the session index entry.
    pub jti: String,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Lifetime of both the token and its index entry (default: 24).
    pub session_ttl_hours: i64,
}

const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var             | Required | Default |
    /// |---------------------|----------|---------|
    /// | `JWT_SECRET`        | **yes**  | --      |
    /// | `SESSION_TTL_HOURS` | no       | `24`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let session_ttl_hours: i64 = std::env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| DEFAULT_SESSION_TTL_HOURS.to_string())
            .parse()
            .expect("SESSION_TTL_HOURS must be a valid i64");
        assert!(session_ttl_hours > 0, "SESSION_TTL_HOURS must be positive");

        Self {
            secret,
            session_ttl_hours,
        }
    }

    /// Session lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.session_ttl_hours * 3600
    }
}

/// Sign a token for `user_id` with the given token id.
pub fn encode_token(
    user_id: DbId,
    jti: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        jti: jti.to_string(),
        iat: now,
        exp: now + config.ttl_secs(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature and expiry, returning the embedded [`Claims`].
pub fn decode_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}
