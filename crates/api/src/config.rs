use better_auth_bridge_core::{AuthError, AuthHooks, DEFAULT_BASE_PATH, Logger, TracingLogger};
use chrono::Duration;
use std::sync::Arc;

/// Configuration for [`BetterAuth`](crate::BetterAuth).
#[derive(Clone)]
pub struct AuthConfig {
    /// Secret used to sign session cookies. At least 32 characters.
    pub secret: String,

    /// Defaults to `"Better Auth"`.
    pub app_name: String,

    /// Public origin of the service (e.g. `"http://localhost:3000"`).
    pub base_url: String,

    /// Prefix of every engine route. Defaults to `"/api/auth"`.
    pub base_path: String,

    /// Accept `Authorization: Bearer <token>` and expose `set-auth-token`
    /// on sign-in responses.
    pub bearer: bool,

    pub logger: Arc<dyn Logger>,

    /// Hooks the engine starts with. The adapter may splice more in.
    pub hooks: AuthHooks,

    pub session: SessionConfig,

    pub password: PasswordConfig,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("app_name", &self.app_name)
            .field("base_url", &self.base_url)
            .field("base_path", &self.base_path)
            .field("bearer", &self.bearer)
            .field("hooks", &self.hooks)
            .field("session", &self.session)
            .field("password", &self.password)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub expires_in: Duration,

    /// Push the expiry forward every time the session is read.
    pub update_age: bool,

    pub cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_http_only: bool,
    pub cookie_same_site: SameSite,
}

#[derive(Debug, Clone)]
pub struct PasswordConfig {
    pub min_length: usize,
    pub max_length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            app_name: "Better Auth".to_string(),
            base_url: "http://localhost:3000".to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            bearer: false,
            logger: Arc::new(TracingLogger),
            hooks: AuthHooks::default(),
            session: SessionConfig::default(),
            password: PasswordConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expires_in: Duration::hours(24 * 7),
            update_age: true,
            cookie_name: "better-auth.session_token".to_string(),
            cookie_secure: true,
            cookie_http_only: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
        }
    }
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = path.into();
        self
    }

    /// Enable bearer-token sessions.
    pub fn bearer(mut self, enabled: bool) -> Self {
        self.bearer = enabled;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn hooks(mut self, hooks: AuthHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn session_expires_in(mut self, duration: Duration) -> Self {
        self.session.expires_in = duration;
        self
    }

    pub fn cookie_secure(mut self, secure: bool) -> Self {
        self.session.cookie_secure = secure;
        self
    }

    pub fn password_min_length(mut self, length: usize) -> Self {
        self.password.min_length = length;
        self
    }

    pub fn validate(&self) -> Result<(), AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::config("Secret key cannot be empty"));
        }

        if self.secret.len() < 32 {
            return Err(AuthError::config(
                "Secret key must be at least 32 characters",
            ));
        }

        if !self.base_path.is_empty() && !self.base_path.starts_with('/') {
            return Err(AuthError::config(format!(
                "Base path must start with '/': {}",
                self.base_path
            )));
        }

        if self.password.min_length > self.password.max_length {
            return Err(AuthError::config(
                "Minimum password length exceeds the maximum",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secrets_are_rejected() {
        let err = AuthConfig::new("too-short").validate().unwrap_err();
        assert!(err.to_string().contains("at least 32 characters"));
        assert!(AuthConfig::new("").validate().is_err());
    }

    #[test]
    fn relative_base_path_is_rejected() {
        let config = AuthConfig::new("x".repeat(32)).base_path("api/auth");
        assert!(config.validate().is_err());
    }

    #[test]
    fn defaults_are_valid_with_a_secret() {
        let config = AuthConfig::new("x".repeat(32));
        config.validate().unwrap();
        assert_eq!(config.base_path, "/api/auth");
        assert!(!config.bearer);
        assert_eq!(config.password.min_length, 8);
    }
}
