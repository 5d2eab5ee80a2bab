//! # Better Auth Bridge
//!
//! Mounts a better-auth engine into an axum or actix-web application.
//!
//! - A catch-all route under the engine's base path forwards every request
//!   to the engine through a runtime-independent request/response pair.
//! - [`AuthGuard`] resolves the session on protected routes and answers
//!   `401` without one, unless the route carries the skip flag in the
//!   [`Reflector`].
//! - [`HookProvider`] methods are spliced into the engine's before/after
//!   hooks, matched by exact route path.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use better_auth_bridge::{
//!     AuthGuardLayer, AxumAdapter, BetterAuthModule, CurrentUser, ModuleOptions,
//! };
//! use better_auth_engine::{AuthConfig, BetterAuth};
//!
//! async fn me(CurrentUser(user): CurrentUser) -> String {
//!     format!("Hello {}", user.email.unwrap_or_default())
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuthConfig::new("your-secret-key-that-is-at-least-32-chars");
//!     let module = BetterAuthModule::<BetterAuth>::for_root(ModuleOptions::new(config))
//!         .build()
//!         .await?;
//!
//!     let protected = Router::new()
//!         .route("/me", get(me))
//!         .route_layer(AuthGuardLayer::new(module.guard()));
//!
//!     let mut adapter = AxumAdapter::new(protected);
//!     module.configure(&mut adapter)?;
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, adapter.into_router()).await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod bridge;
pub mod context;
pub mod error;
pub mod guard;
pub mod hooks;
pub mod metadata;
pub mod module;
pub mod options;

pub use adapters::{HttpAdapter, SUPPORTED_ADAPTERS};
pub use bridge::{AuthBridge, NativeExchange};
pub use context::{
    CurrentSession, CurrentUser, CurrentUserSession, OptionalUserSession, SessionSlot,
    SessionView, current_session,
};
pub use error::{BridgeError, ModuleError, SessionContextError, Unauthorized};
pub use guard::{AuthGuard, RequestContext};
pub use hooks::{HookMethod, HookProvider, HookRegistration, HookSplicer};
pub use metadata::{Reflector, RouteTarget};
pub use module::{BetterAuthModule, ModuleBuilder};
pub use options::ModuleOptions;

#[cfg(feature = "actix")]
pub use adapters::actix::{ActixAdapter, require_session};
#[cfg(feature = "axum")]
pub use adapters::axum::{AuthGuardLayer, AxumAdapter};

pub use better_auth_bridge_core::{
    AuthEngine, AuthError, AuthHooks, AuthMiddleware, AuthResult, Headers, HookContext,
    HookPhase, HttpMethod, Logger, Session, SessionField, StandardRequest, StandardResponse,
    TracingLogger, User, UserSession, create_auth_middleware,
};
