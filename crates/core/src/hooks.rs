//! Request hooks an engine runs around its own route handling.
//!
//! An engine owns at most one `before` and one `after` hook ([`AuthHooks`]).
//! Each is an [`AuthMiddleware`] receiving a mutable [`HookContext`]; an
//! `Err` returned by a hook is treated by the engine like an error raised
//! by its own handlers.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::AuthResult;
use crate::headers::Headers;
use crate::types::{HttpMethod, StandardResponse};

/// The two points at which an engine invokes hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
    Before,
    After,
}

impl HookPhase {
    pub const ALL: [HookPhase; 2] = [HookPhase::Before, HookPhase::After];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request state handed to every hook.
#[derive(Debug, Clone)]
pub struct HookContext {
    /// Engine-internal route path, with the base path already stripped
    /// (e.g. `/sign-up/email`).
    pub path: String,
    pub method: HttpMethod,
    pub headers: Headers,
    /// Request body parsed as JSON, if it was JSON.
    pub body: Option<serde_json::Value>,
    pub query: Vec<(String, String)>,
    /// The response produced by the engine. Only set while `after` hooks run;
    /// an after hook may replace it.
    pub returned: Option<StandardResponse>,
}

impl HookContext {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            headers: Headers::new(),
            body: None,
            query: Vec::new(),
            returned: None,
        }
    }

    /// Deserialize the JSON body, treating a missing body as `{}`.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.body {
            Some(body) => T::deserialize(body),
            None => serde_json::from_str("{}"),
        }
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn phase(&self) -> HookPhase {
        if self.returned.is_some() {
            HookPhase::After
        } else {
            HookPhase::Before
        }
    }
}

/// Boxed future returned by hook closures.
pub type HookFuture<'a> = Pin<Box<dyn Future<Output = AuthResult<()>> + Send + 'a>>;

/// A hook callable.
#[async_trait]
pub trait AuthMiddleware: Send + Sync {
    async fn call(&self, ctx: &mut HookContext) -> AuthResult<()>;
}

impl fmt::Debug for dyn AuthMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn AuthMiddleware")
    }
}

/// [`AuthMiddleware`] backed by a closure. Built with [`create_auth_middleware`].
pub struct FnMiddleware<F> {
    f: F,
}

#[async_trait]
impl<F> AuthMiddleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut HookContext) -> HookFuture<'a> + Send + Sync,
{
    async fn call(&self, ctx: &mut HookContext) -> AuthResult<()> {
        (self.f)(ctx).await
    }
}

/// Wrap a closure as a shareable hook.
///
/// ```rust
/// use better_auth_bridge_core::hooks::create_auth_middleware;
///
/// let hook = create_auth_middleware(|ctx| {
///     Box::pin(async move {
///         ctx.headers.append("x-seen-by", "hook");
///         Ok(())
///     })
/// });
/// # let _ = hook;
/// ```
pub fn create_auth_middleware<F>(f: F) -> Arc<dyn AuthMiddleware>
where
    F: for<'a> Fn(&'a mut HookContext) -> HookFuture<'a> + Send + Sync + 'static,
{
    Arc::new(FnMiddleware { f })
}

/// The engine's hook slots.
#[derive(Clone, Default)]
pub struct AuthHooks {
    pub before: Option<Arc<dyn AuthMiddleware>>,
    pub after: Option<Arc<dyn AuthMiddleware>>,
}

impl fmt::Debug for AuthHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHooks")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

impl AuthHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before(mut self, hook: Arc<dyn AuthMiddleware>) -> Self {
        self.before = Some(hook);
        self
    }

    pub fn after(mut self, hook: Arc<dyn AuthMiddleware>) -> Self {
        self.after = Some(hook);
        self
    }

    pub fn get(&self, phase: HookPhase) -> Option<&Arc<dyn AuthMiddleware>> {
        match phase {
            HookPhase::Before => self.before.as_ref(),
            HookPhase::After => self.after.as_ref(),
        }
    }

    pub fn take(&mut self, phase: HookPhase) -> Option<Arc<dyn AuthMiddleware>> {
        match phase {
            HookPhase::Before => self.before.take(),
            HookPhase::After => self.after.take(),
        }
    }

    pub fn set(&mut self, phase: HookPhase, hook: Arc<dyn AuthMiddleware>) {
        match phase {
            HookPhase::Before => self.before = Some(hook),
            HookPhase::After => self.after = Some(hook),
        }
    }

    /// Run the hook for `phase`, if one is installed.
    pub async fn run(&self, phase: HookPhase, ctx: &mut HookContext) -> AuthResult<()> {
        match self.get(phase) {
            Some(hook) => hook.call(ctx).await,
            None => Ok(()),
        }
    }
}
