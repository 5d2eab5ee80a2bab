//! The contract an authentication engine fulfils so the adapter can mount it.

use async_trait::async_trait;

use crate::error::AuthResult;
use crate::headers::Headers;
use crate::hooks::AuthHooks;
use crate::types::{StandardRequest, StandardResponse, UserSession};

/// Base path used when an engine does not report one.
pub const DEFAULT_BASE_PATH: &str = "/api/auth";

/// An engine owning credential logic, session storage and its own routes.
///
/// The adapter never looks inside: it builds one instance with
/// [`AuthEngine::from_config`], forwards catch-all traffic to
/// [`AuthEngine::handler`], and asks [`AuthEngine::get_session`] whether a
/// request carries a valid session. Hook slots are only reachable through
/// `&mut self`, so they can be rewritten while the adapter still owns the
/// engine and are frozen once it is shared.
#[async_trait]
pub trait AuthEngine: Send + Sync + 'static {
    /// Engine-specific configuration, passed through untouched by the adapter.
    type Config: Send + Sync + 'static;

    async fn from_config(config: &Self::Config) -> AuthResult<Self>
    where
        Self: Sized;

    /// Path prefix of the engine's own routes, if configured.
    fn base_path(&self) -> Option<&str>;

    /// `None` when the engine does not support hooks at all.
    fn hooks(&self) -> Option<&AuthHooks>;

    fn hooks_mut(&mut self) -> Option<&mut AuthHooks>;

    /// Resolve the session carried by `headers`, if any.
    async fn get_session(&self, headers: &Headers) -> AuthResult<Option<UserSession>>;

    /// Handle one request addressed to the engine's routes.
    async fn handler(&self, request: StandardRequest) -> AuthResult<StandardResponse>;
}
