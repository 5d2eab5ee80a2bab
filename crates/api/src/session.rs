use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

use better_auth_bridge_core::{AuthError, AuthResult, Headers, Session, UserSession};

use crate::config::AuthConfig;
use crate::store::{CreateSession, MemoryStore};

type HmacSha256 = Hmac<Sha256>;

/// Issues, resolves and revokes sessions.
pub struct SessionManager {
    config: Arc<AuthConfig>,
    store: Arc<MemoryStore>,
}

impl SessionManager {
    pub fn new(config: Arc<AuthConfig>, store: Arc<MemoryStore>) -> Self {
        Self { config, store }
    }

    pub fn create_session(
        &self,
        user_id: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AuthResult<Session> {
        self.store.create_session(CreateSession {
            user_id: user_id.to_string(),
            expires_at: Utc::now() + self.config.session.expires_in,
            ip_address,
            user_agent,
        })
    }

    /// Look up a live session by raw token. Expired sessions are deleted.
    pub fn get_session(&self, token: &str) -> AuthResult<Option<Session>> {
        let Some(mut session) = self.store.session(token)? else {
            return Ok(None);
        };

        if session.expires_at < Utc::now() {
            self.store.delete_session(token)?;
            return Ok(None);
        }

        if self.config.session.update_age {
            let expires_at = Utc::now() + self.config.session.expires_in;
            self.store.update_session_expiry(token, expires_at)?;
            session.expires_at = expires_at;
        }

        Ok(Some(session))
    }

    /// Resolve the user and session carried by `headers`.
    pub fn resolve(&self, headers: &Headers) -> AuthResult<Option<UserSession>> {
        let Some(token) = self.extract_session_token(headers) else {
            return Ok(None);
        };
        let Some(session) = self.get_session(&token)? else {
            return Ok(None);
        };

        match self.store.user_by_id(&session.user_id)? {
            Some(user) => Ok(Some(UserSession { user, session })),
            None => {
                self.store.delete_session(&token)?;
                Ok(None)
            }
        }
    }

    pub fn delete_session(&self, token: &str) -> AuthResult<bool> {
        self.store.delete_session(token)
    }

    pub fn cleanup_expired_sessions(&self) -> AuthResult<usize> {
        self.store.delete_expired_sessions()
    }

    /// Sign a token as `token.base64url(hmac_sha256(secret, token))`.
    pub fn sign_token(&self, token: &str) -> AuthResult<String> {
        let signature = compute_hmac_signature(token, &self.config.secret)?;
        Ok(format!("{}.{}", token, signature))
    }

    /// Verify a signed cookie value and return the raw token.
    pub fn verify_signed_token(&self, signed_value: &str) -> Option<String> {
        let (token, signature) = signed_value.rsplit_once('.')?;
        if token.is_empty() || signature.is_empty() {
            return None;
        }

        let expected = compute_hmac_signature(token, &self.config.secret).ok()?;
        if signature.len() != expected.len() {
            return None;
        }
        let diff = signature
            .as_bytes()
            .iter()
            .zip(expected.as_bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        if diff != 0 {
            return None;
        }

        Some(token.to_string())
    }

    /// Bearer token first when bearer sessions are enabled, then the signed
    /// session cookie.
    pub fn extract_session_token(&self, headers: &Headers) -> Option<String> {
        if self.config.bearer
            && let Some(token) = headers.bearer_token()
        {
            return Some(token.to_string());
        }

        headers
            .cookie(&self.config.session.cookie_name)
            .and_then(|value| self.verify_signed_token(value))
    }
}

fn compute_hmac_signature(token: &str, secret: &str) -> AuthResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AuthError::internal(format!("Invalid HMAC key: {}", e)))?;
    mac.update(token.as_bytes());
    Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
}
