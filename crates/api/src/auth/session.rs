//! Session issue, validation and revocation.
//!
//! A token is usable only while both hold: its signature and expiry verify,
//! and the index entry `session:{jti}` still exists in the key-value store.
//! Revocation deletes the entry; expiry lets it lapse.

use std::sync::Arc;
use std::time::Duration;

use pura_core::types::DbId;
use uuid::Uuid;

use super::jwt::{decode_token, encode_token, JwtConfig};
use crate::kv::{KeyValueStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Bad signature, malformed token or past `exp`.
    #[error("invalid token")]
    InvalidToken,

    /// Signature is valid but the index entry is gone.
    #[error("session revoked or expired")]
    Revoked,

    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: String,
}

/// The identity behind a validated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub user_id: DbId,
    pub token_id: String,
}

#[derive(Clone)]
pub struct SessionService {
    kv: Arc<dyn KeyValueStore>,
    jwt: JwtConfig,
}

fn index_key(token_id: &str) -> String {
    format!("session:{token_id}")
}

impl SessionService {
    pub fn new(kv: Arc<dyn KeyValueStore>, jwt: JwtConfig) -> Self {
        Self { kv, jwt }
    }

    /// Session lifetime, shared by the token, the index entry and the cookie.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.jwt.ttl_secs().unsigned_abs())
    }

    /// Sign a token for `user_id` and record its index entry.
    pub async fn issue_token(&self, user_id: DbId) -> Result<IssuedToken, SessionError> {
        let token_id = Uuid::new_v4().to_string();
        let token = encode_token(user_id, &token_id, &self.jwt).map_err(SessionError::Signing)?;

        self.kv
            .set_ex(&index_key(&token_id), &user_id.to_string(), self.ttl())
            .await?;

        tracing::debug!(user_id, token_id = %token_id, "Session issued");
        Ok(IssuedToken { token, token_id })
    }

    /// Verify `raw` and confirm its session is still live.
    pub async fn validate_token(&self, raw: &str) -> Result<SessionClaims, SessionError> {
        let claims = decode_token(raw, &self.jwt).map_err(|_| SessionError::InvalidToken)?;

        let stored = self
            .kv
            .get(&index_key(&claims.jti))
            .await?
            .ok_or(SessionError::Revoked)?;

        // The index must point back at the same user.
        if stored.parse::<DbId>().ok() != Some(claims.sub) {
            return Err(SessionError::InvalidToken);
        }

        Ok(SessionClaims {
            user_id: claims.sub,
            token_id: claims.jti,
        })
    }

    /// Delete the index entry for `token_id`. Revoking twice is not an error.
    pub async fn revoke_token(&self, token_id: &str) -> Result<(), SessionError> {
        let existed = self.kv.del(&index_key(token_id)).await?;
        tracing::debug!(token_id, existed, "Session revoked");
        Ok(())
    }

    /// User id from a token whose signature verifies, without consulting the
    /// index. Only for keying rate-limit counters.
    pub fn peek_user_id(&self, raw: &str) -> Option<DbId> {
        decode_token(raw, &self.jwt).ok().map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::kv::InMemoryStore;

    fn service() -> (SessionService, InMemoryStore) {
        let kv = InMemoryStore::new();
        let jwt = JwtConfig {
            secret: "session-test-secret".to_string(),
            session_ttl_hours: 24,
        };
        (SessionService::new(Arc::new(kv.clone()), jwt), kv)
    }

    #[tokio::test]
    async fn issue_validate_revoke_round_trip() {
        let (sessions, _) = service();
        let issued = sessions.issue_token(7).await.unwrap();

        let claims = sessions.validate_token(&issued.token).await.unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.token_id, issued.token_id);

        sessions.revoke_token(&issued.token_id).await.unwrap();
        assert_matches!(
            sessions.validate_token(&issued.token).await,
            Err(SessionError::Revoked)
        );
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let (sessions, _) = service();
        let issued = sessions.issue_token(1).await.unwrap();
        sessions.revoke_token(&issued.token_id).await.unwrap();
        sessions.revoke_token(&issued.token_id).await.unwrap();
    }

    #[tokio::test]
    async fn index_entry_is_written_with_user_id() {
        let (sessions, kv) = service();
        let issued = sessions.issue_token(99).await.unwrap();
        let stored = kv
            .get(&format!("session:{}", issued.token_id))
            .await
            .unwrap();
        assert_eq!(stored.as_deref(), Some("99"));
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let (sessions, _) = service();
        assert_matches!(
            sessions.validate_token("not.a.jwt").await,
            Err(SessionError::InvalidToken)
        );
        assert_eq!(sessions.peek_user_id("not.a.jwt"), None);
    }

    #[tokio::test]
    async fn index_pointing_at_another_user_is_invalid() {
        let (sessions, kv) = service();
        let issued = sessions.issue_token(5).await.unwrap();
        kv.set_ex(
            &format!("session:{}", issued.token_id),
            "6",
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        assert_matches!(
            sessions.validate_token(&issued.token).await,
            Err(SessionError::InvalidToken)
        );
    }

    #[tokio::test]
    async fn peek_reads_subject_of_revoked_token() {
        let (sessions, _) = service();
        let issued = sessions.issue_token(12).await.unwrap();
        sessions.revoke_token(&issued.token_id).await.unwrap();
        assert_eq!(sessions.peek_user_id(&issued.token), Some(12));
    }
}
