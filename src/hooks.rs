//! Application hook methods spliced into the engine's hook slots.
//!
//! A [`HookProvider`] lists [`HookMethod`]s, each annotated with the
//! internal engine path it reacts to before and/or after the engine runs.
//! At startup the [`HookSplicer`] collects every annotation into
//! [`HookRegistration`]s and installs one wrapper per phase that runs the
//! engine's original hook first, then every registered method whose path
//! equals the request's path, in registration order.
//!
//! ```rust
//! use std::sync::Arc;
//! use better_auth_bridge::hooks::{HookMethod, HookProvider};
//!
//! struct SignUpAudit;
//!
//! impl HookProvider for SignUpAudit {
//!     fn hook_methods(self: Arc<Self>) -> Vec<HookMethod> {
//!         vec![HookMethod::from_fn("record_sign_up", |ctx| {
//!             Box::pin(async move {
//!                 ctx.headers.append("x-audited", "1");
//!                 Ok(())
//!             })
//!         })
//!         .after("/sign-up/email")]
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use better_auth_bridge_core::hooks::{
    AuthHooks, AuthMiddleware, HookContext, HookFuture, HookPhase, create_auth_middleware,
};
use better_auth_bridge_core::logger::Logger;
use better_auth_bridge_core::{AuthEngine, AuthResult};

use crate::error::ModuleError;

/// A type that contributes hook methods.
pub trait HookProvider: Send + Sync + 'static {
    fn hook_methods(self: Arc<Self>) -> Vec<HookMethod>;
}

/// One hook method and its path annotations.
#[derive(Clone)]
pub struct HookMethod {
    name: String,
    before: Option<String>,
    after: Option<String>,
    callback: Arc<dyn AuthMiddleware>,
}

impl HookMethod {
    pub fn new(name: impl Into<String>, callback: Arc<dyn AuthMiddleware>) -> Self {
        Self {
            name: name.into(),
            before: None,
            after: None,
            callback,
        }
    }

    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut HookContext) -> HookFuture<'a> + Send + Sync + 'static,
    {
        Self::new(name, create_auth_middleware(f))
    }

    /// Run before the engine handles `path`. A later call replaces the path.
    pub fn before(mut self, path: impl Into<String>) -> Self {
        self.before = Some(path.into());
        self
    }

    /// Run after the engine handles `path`. A later call replaces the path.
    pub fn after(mut self, path: impl Into<String>) -> Self {
        self.after = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self, phase: HookPhase) -> Option<&str> {
        match phase {
            HookPhase::Before => self.before.as_deref(),
            HookPhase::After => self.after.as_deref(),
        }
    }
}

impl fmt::Debug for HookMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookMethod")
            .field("name", &self.name)
            .field("before", &self.before)
            .field("after", &self.after)
            .finish_non_exhaustive()
    }
}

/// A discovered `(path, phase, method)` annotation.
#[derive(Clone)]
pub struct HookRegistration {
    pub path: String,
    pub phase: HookPhase,
    pub method: String,
    pub callback: Arc<dyn AuthMiddleware>,
}

impl fmt::Debug for HookRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistration")
            .field("path", &self.path)
            .field("phase", &self.phase)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct HookSplicer {
    registrations: Vec<HookRegistration>,
}

impl HookSplicer {
    /// Providers in order, methods in declaration order, before then after.
    pub fn discover(providers: &[Arc<dyn HookProvider>]) -> Result<Self, ModuleError> {
        let mut registrations = Vec::new();

        for provider in providers {
            for method in provider.clone().hook_methods() {
                for phase in HookPhase::ALL {
                    let Some(path) = method.path(phase) else {
                        continue;
                    };
                    if !path.starts_with('/') {
                        return Err(ModuleError::InvalidHookPath {
                            method: method.name.clone(),
                            path: path.to_string(),
                        });
                    }
                    registrations.push(HookRegistration {
                        path: path.to_string(),
                        phase,
                        method: method.name.clone(),
                        callback: method.callback.clone(),
                    });
                }
            }
        }

        Ok(Self { registrations })
    }

    pub fn registrations(&self) -> &[HookRegistration] {
        &self.registrations
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Install the registrations into `hooks`, keeping any hook already there.
    pub fn splice(self, hooks: &mut AuthHooks) {
        for phase in HookPhase::ALL {
            let routes: Vec<(String, Arc<dyn AuthMiddleware>)> = self
                .registrations
                .iter()
                .filter(|registration| registration.phase == phase)
                .map(|registration| (registration.path.clone(), registration.callback.clone()))
                .collect();
            if routes.is_empty() {
                continue;
            }

            let previous = hooks.take(phase);
            hooks.set(phase, Arc::new(SplicedHook { previous, routes }));
        }
    }

    /// Splice into an engine's slots; a no-op when the engine has none.
    pub fn splice_into<E: AuthEngine>(self, engine: &mut E, logger: &dyn Logger) {
        if self.is_empty() {
            return;
        }
        let count = self.registrations.len();
        match engine.hooks_mut() {
            Some(hooks) => {
                self.splice(hooks);
                logger.debug(&format!("Spliced {} hook registration(s)", count));
            }
            None => logger.debug(&format!(
                "Engine exposes no hook slots; {} hook registration(s) ignored",
                count
            )),
        }
    }
}

/// One phase's compiled hook chain.
struct SplicedHook {
    previous: Option<Arc<dyn AuthMiddleware>>,
    routes: Vec<(String, Arc<dyn AuthMiddleware>)>,
}

#[async_trait]
impl AuthMiddleware for SplicedHook {
    async fn call(&self, ctx: &mut HookContext) -> AuthResult<()> {
        if let Some(previous) = &self.previous {
            previous.call(ctx).await?;
        }
        for (path, hook) in &self.routes {
            if *path == ctx.path {
                hook.call(ctx).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use better_auth_bridge_core::HttpMethod;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording(log: &Log, label: &'static str) -> Arc<dyn AuthMiddleware> {
        let log = log.clone();
        create_auth_middleware(move |_ctx| {
            let log = log.clone();
            Box::pin(async move {
                log.lock().unwrap().push(label.to_string());
                Ok(())
            })
        })
    }

    struct Provider {
        methods: Vec<HookMethod>,
    }

    impl HookProvider for Provider {
        fn hook_methods(self: Arc<Self>) -> Vec<HookMethod> {
            self.methods.clone()
        }
    }

    #[test]
    fn discovery_orders_and_validates() {
        let log = Log::default();
        let first: Arc<dyn HookProvider> = Arc::new(Provider {
            methods: vec![
                HookMethod::new("a", recording(&log, "a"))
                    .after("/sign-in/email")
                    .before("/sign-up/email"),
                HookMethod::new("b", recording(&log, "b")).before("/sign-in/email"),
            ],
        });
        let splicer = HookSplicer::discover(&[first]).unwrap();
        let found: Vec<(&str, HookPhase, &str)> = splicer
            .registrations()
            .iter()
            .map(|r| (r.method.as_str(), r.phase, r.path.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("a", HookPhase::Before, "/sign-up/email"),
                ("a", HookPhase::After, "/sign-in/email"),
                ("b", HookPhase::Before, "/sign-in/email"),
            ]
        );

        let bad: Arc<dyn HookProvider> = Arc::new(Provider {
            methods: vec![HookMethod::new("c", recording(&log, "c")).before("sign-up")],
        });
        assert!(matches!(
            HookSplicer::discover(&[bad]),
            Err(ModuleError::InvalidHookPath { .. })
        ));
    }

    #[tokio::test]
    async fn spliced_chain_runs_original_then_matching_in_order() {
        let log = Log::default();
        let provider: Arc<dyn HookProvider> = Arc::new(Provider {
            methods: vec![
                HookMethod::new("one", recording(&log, "one")).before("/sign-up/email"),
                HookMethod::new("other", recording(&log, "other")).before("/sign-in/email"),
                HookMethod::new("two", recording(&log, "two")).before("/sign-up/email"),
            ],
        });

        let mut hooks = AuthHooks::new().before(recording(&log, "original"));
        HookSplicer::discover(&[provider]).unwrap().splice(&mut hooks);
        assert!(hooks.after.is_none());

        let mut ctx = HookContext::new(HttpMethod::Post, "/sign-up/email");
        hooks.run(HookPhase::Before, &mut ctx).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["original", "one", "two"]);
    }
}
