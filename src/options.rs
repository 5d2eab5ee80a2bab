use std::fmt;
use std::sync::Arc;

use better_auth_bridge_core::logger::{Logger, default_logger};

/// Options for [`BetterAuthModule::for_root`](crate::BetterAuthModule::for_root).
///
/// `C` is the engine's own configuration; the module hands it to the
/// engine factory untouched.
#[derive(Clone)]
pub struct ModuleOptions<C> {
    pub auth_config: C,

    /// Route metadata key that marks a handler or scope as public.
    ///
    /// Unset means every guarded route requires a session.
    pub skip_auth_metadata_key: Option<String>,

    /// Defaults to [`TracingLogger`](better_auth_bridge_core::TracingLogger).
    pub logger: Arc<dyn Logger>,
}

impl<C> ModuleOptions<C> {
    pub fn new(auth_config: C) -> Self {
        Self {
            auth_config,
            skip_auth_metadata_key: None,
            logger: default_logger(),
        }
    }

    pub fn skip_auth_metadata_key(mut self, key: impl Into<String>) -> Self {
        self.skip_auth_metadata_key = Some(key.into());
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }
}

impl<C: fmt::Debug> fmt::Debug for ModuleOptions<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleOptions")
            .field("auth_config", &self.auth_config)
            .field("skip_auth_metadata_key", &self.skip_auth_metadata_key)
            .finish_non_exhaustive()
    }
}
