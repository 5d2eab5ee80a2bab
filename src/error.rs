use better_auth_bridge_core::AuthError;
use serde_json::{Value, json};
use thiserror::Error;

/// Startup failures. Returned by module construction and `configure`.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error(
        "BetterAuthModule does not support {adapter} adapter. Supported types are: {}",
        .supported.join(", ")
    )]
    UnsupportedAdapter {
        adapter: String,
        supported: &'static [&'static str],
    },

    #[error("Hook method '{method}' has an invalid path '{path}': hook paths must start with '/'")]
    InvalidHookPath { method: String, path: String },

    #[error(transparent)]
    Engine(#[from] AuthError),
}

/// A failure while translating between a runtime and the engine.
///
/// Never reaches the client: the bridge logs it and answers with the
/// generic `AUTH_FAILURE` reply.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Unsupported HTTP method: {0}")]
    Method(String),

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Request body is not valid UTF-8: {0}")]
    Body(#[from] std::str::Utf8Error),

    #[error("Engine handler failed: {0}")]
    Engine(#[from] AuthError),

    #[error("Invalid engine response: {0}")]
    Response(String),
}

/// Rejection produced by the guard when no session is present.
#[derive(Error, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[error("Unauthorized")]
pub struct Unauthorized;

impl Unauthorized {
    pub const STATUS: u16 = 401;

    pub fn body(&self) -> Value {
        json!({ "code": "UNAUTHORIZED", "message": "Unauthorized" })
    }
}

/// A session accessor was used where the guard did not run or attached nothing.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionContextError {
    #[error("No session context on this request; is the route behind the auth guard?")]
    GuardNotRun,

    #[error("The auth guard attached no session to this request")]
    SessionMissing,
}

impl SessionContextError {
    pub const STATUS: u16 = 500;

    pub fn code(&self) -> &'static str {
        "SESSION_CONTEXT_MISSING"
    }

    pub fn body(&self) -> Value {
        json!({ "code": self.code(), "message": self.to_string() })
    }
}
