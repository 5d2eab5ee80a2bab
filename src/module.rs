use std::sync::Arc;

use better_auth_bridge_core::AuthEngine;

use crate::adapters::{HttpAdapter, SUPPORTED_ADAPTERS};
use crate::bridge::{AuthBridge, mount_pattern, normalize_base_path};
use crate::error::ModuleError;
use crate::guard::AuthGuard;
use crate::hooks::{HookProvider, HookSplicer};
use crate::metadata::Reflector;
use crate::options::ModuleOptions;

/// One engine instance wired for an application.
///
/// ```rust,no_run
/// use better_auth_bridge::{AxumAdapter, BetterAuthModule, ModuleOptions};
/// use better_auth_engine::{AuthConfig, BetterAuth};
///
/// # async fn run() -> Result<(), better_auth_bridge::ModuleError> {
/// let config = AuthConfig::new("your-very-secure-secret-key-at-least-32-chars");
/// let module = BetterAuthModule::<BetterAuth>::for_root(
///     ModuleOptions::new(config).skip_auth_metadata_key("PUBLIC"),
/// )
/// .build()
/// .await?;
///
/// let mut adapter = AxumAdapter::new(axum::Router::new());
/// module.configure(&mut adapter)?;
/// let app = adapter.into_router();
/// # let _ = app;
/// # Ok(())
/// # }
/// ```
pub struct BetterAuthModule<E: AuthEngine> {
    engine: Arc<E>,
    options: Arc<ModuleOptions<E::Config>>,
    reflector: Arc<Reflector>,
    base_path: String,
}

impl<E: AuthEngine> Clone for BetterAuthModule<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            options: self.options.clone(),
            reflector: self.reflector.clone(),
            base_path: self.base_path.clone(),
        }
    }
}

pub struct ModuleBuilder<E: AuthEngine> {
    options: ModuleOptions<E::Config>,
    providers: Vec<Arc<dyn HookProvider>>,
    reflector: Reflector,
}

impl<E: AuthEngine> BetterAuthModule<E> {
    pub fn for_root(options: ModuleOptions<E::Config>) -> ModuleBuilder<E> {
        ModuleBuilder {
            options,
            providers: Vec::new(),
            reflector: Reflector::new(),
        }
    }

    /// The shared engine instance.
    pub fn auth(&self) -> &Arc<E> {
        &self.engine
    }

    pub fn options(&self) -> &Arc<ModuleOptions<E::Config>> {
        &self.options
    }

    pub fn reflector(&self) -> &Arc<Reflector> {
        &self.reflector
    }

    /// Normalized engine base path.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn guard(&self) -> AuthGuard<E> {
        AuthGuard::new(
            self.engine.clone(),
            self.reflector.clone(),
            self.options.skip_auth_metadata_key.clone(),
            self.options.logger.clone(),
        )
    }

    pub fn bridge(&self) -> AuthBridge<E> {
        AuthBridge::new(self.engine.clone(), self.options.logger.clone())
    }

    /// Mount the catch-all auth route on `adapter`.
    ///
    /// Fails without touching the adapter when its runtime is not supported.
    pub fn configure<A>(&self, adapter: &mut A) -> Result<(), ModuleError>
    where
        A: HttpAdapter<E> + ?Sized,
    {
        let adapter_type = adapter.adapter_type();
        if !SUPPORTED_ADAPTERS
            .iter()
            .any(|supported| *supported == adapter_type)
        {
            return Err(ModuleError::UnsupportedAdapter {
                adapter: adapter_type.to_string(),
                supported: SUPPORTED_ADAPTERS,
            });
        }

        let pattern = mount_pattern(&self.base_path, adapter.wildcard_suffix());
        adapter.install_guard(self.guard());
        adapter.mount_auth_handler(&pattern, self.bridge());

        self.options
            .logger
            .debug(&format!("Auth handler mounted on {}", pattern));
        self.options.logger.info("Middleware configured.");
        Ok(())
    }
}

impl<E: AuthEngine> ModuleBuilder<E> {
    pub fn provider<P: HookProvider>(mut self, provider: P) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    pub fn shared_provider(mut self, provider: Arc<dyn HookProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn reflector(mut self, reflector: Reflector) -> Self {
        self.reflector = reflector;
        self
    }

    /// Construct the engine and splice the discovered hooks into it.
    pub async fn build(self) -> Result<BetterAuthModule<E>, ModuleError> {
        let splicer = HookSplicer::discover(&self.providers)?;

        let mut engine = E::from_config(&self.options.auth_config).await?;
        splicer.splice_into(&mut engine, self.options.logger.as_ref());

        let base_path = normalize_base_path(engine.base_path());

        Ok(BetterAuthModule {
            engine: Arc::new(engine),
            options: Arc::new(self.options),
            reflector: Arc::new(self.reflector),
            base_path,
        })
    }
}
