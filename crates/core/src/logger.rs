//! Logging seam shared by the adapter and engines.
//!
//! [`Logger`] is a plain sink with four levels. The adapter writes through
//! whichever implementation is configured on its options; the default,
//! [`TracingLogger`], emits `tracing` events under the `better_auth` target.

use std::fmt;
use std::sync::Arc;

/// Log sink.
///
/// ```rust
/// use better_auth_bridge_core::logger::Logger;
///
/// struct Stderr;
/// impl Logger for Stderr {
///     fn info(&self, message: &str) { eprintln!("[INFO] {}", message); }
///     fn warn(&self, message: &str) { eprintln!("[WARN] {}", message); }
///     fn error(&self, message: &str) { eprintln!("[ERROR] {}", message); }
///     fn debug(&self, message: &str) { eprintln!("[DEBUG] {}", message); }
/// }
///
/// Stderr.info("Middleware configured.");
/// ```
pub trait Logger: Send + Sync {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);

    fn debug(&self, message: &str);
}

impl fmt::Debug for dyn Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Logger")
    }
}

/// Forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "better_auth", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "better_auth", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "better_auth", "{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!(target: "better_auth", "{}", message);
    }
}

pub fn default_logger() -> Arc<dyn Logger> {
    Arc::new(TracingLogger)
}
