//! # Better Auth Bridge Core
//!
//! The contract between `better-auth-bridge` and an authentication engine:
//! runtime-independent requests and responses, canonical headers, session
//! types, hook slots, and the [`AuthEngine`] trait.

pub mod engine;
pub mod error;
pub mod headers;
pub mod hooks;
pub mod logger;
pub mod types;

pub use engine::{AuthEngine, DEFAULT_BASE_PATH};
pub use error::{AuthError, AuthResult};
pub use headers::Headers;
pub use hooks::{
    AuthHooks, AuthMiddleware, FnMiddleware, HookContext, HookFuture, HookPhase,
    create_auth_middleware,
};
pub use logger::{Logger, TracingLogger, default_logger};
pub use types::{
    HttpMethod, Session, SessionField, StandardRequest, StandardResponse, User, UserSession,
};
