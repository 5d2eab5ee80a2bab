//! # Better Auth Engine
//!
//! An in-memory authentication engine implementing
//! [`AuthEngine`](better_auth_bridge_core::AuthEngine): email/password
//! sign-up and sign-in, signed session cookies, optional bearer tokens and
//! before/after request hooks.
//!
//! ```rust,no_run
//! use better_auth_bridge_core::AuthEngine;
//! use better_auth_engine::{AuthConfig, BetterAuth};
//!
//! # async fn run() -> better_auth_bridge_core::AuthResult<()> {
//! let config = AuthConfig::new("your-very-secure-secret-key-at-least-32-chars")
//!     .base_url("http://localhost:3000")
//!     .bearer(true);
//! let auth = BetterAuth::from_config(&config).await?;
//! assert_eq!(auth.base_path(), Some("/api/auth"));
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod cookie_utils;
pub mod plugins;
pub mod session;
pub mod store;

pub use auth::BetterAuth;
pub use config::{AuthConfig, PasswordConfig, SameSite, SessionConfig};
pub use plugins::{AuthContext, AuthPlugin, AuthRoute, EmailPasswordPlugin, SessionManagementPlugin};
pub use session::SessionManager;
pub use store::MemoryStore;
