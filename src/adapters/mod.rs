//! Runtime adapters.

use better_auth_bridge_core::AuthEngine;

use crate::bridge::AuthBridge;
use crate::guard::AuthGuard;

#[cfg(feature = "actix")]
pub mod actix;
#[cfg(feature = "axum")]
pub mod axum;

/// Adapter types `BetterAuthModule::configure` accepts.
pub const SUPPORTED_ADAPTERS: &[&str] = &["axum", "actix-web"];

/// A router the module can mount its catch-all handler on.
pub trait HttpAdapter<E: AuthEngine> {
    fn adapter_type(&self) -> &str;

    /// Catch-all segment appended to the base path, in the router's syntax.
    fn wildcard_suffix(&self) -> &'static str;

    /// Make the guard reachable from the runtime's middleware, if it needs
    /// shared state for that.
    fn install_guard(&mut self, _guard: AuthGuard<E>) {}

    fn mount_auth_handler(&mut self, pattern: &str, bridge: AuthBridge<E>);
}
