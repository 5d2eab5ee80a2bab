use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

use better_auth_bridge_core::{
    AuthEngine, AuthError, AuthHooks, AuthResult, Headers, HookContext, HookPhase, HttpMethod,
    StandardRequest, StandardResponse, UserSession,
};

use crate::config::AuthConfig;
use crate::plugins::{AuthContext, AuthPlugin, EmailPasswordPlugin, SessionManagementPlugin};
use crate::session::SessionManager;
use crate::store::MemoryStore;

/// The in-memory engine.
pub struct BetterAuth {
    config: Arc<AuthConfig>,
    context: AuthContext,
    plugins: Vec<Box<dyn AuthPlugin>>,
    hooks: AuthHooks,
}

#[derive(Debug, Serialize)]
struct OkResponse {
    ok: bool,
}

impl BetterAuth {
    /// Validate `config` and build an engine with the built-in route groups.
    pub fn new(config: AuthConfig) -> AuthResult<Self> {
        config.validate()?;

        let hooks = config.hooks.clone();
        let config = Arc::new(config);
        let store = Arc::new(MemoryStore::new());
        let context = AuthContext {
            config: config.clone(),
            store: store.clone(),
            sessions: SessionManager::new(config.clone(), store),
        };

        Ok(Self {
            config,
            context,
            plugins: vec![
                Box::new(EmailPasswordPlugin::new()),
                Box::new(SessionManagementPlugin::new()),
            ],
            hooks,
        })
    }

    /// Add a route group. Plugins are tried in registration order.
    pub fn plugin<P: AuthPlugin + 'static>(mut self, plugin: P) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.context.sessions
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.context.store
    }

    /// Every `(method, path)` the engine serves, relative to its base path.
    pub fn routes(&self) -> Vec<(HttpMethod, &'static str)> {
        let mut routes = vec![(HttpMethod::Get, "/ok"), (HttpMethod::Get, "/error")];
        for plugin in &self.plugins {
            routes.extend(plugin.routes().into_iter().map(|r| (r.method, r.path)));
        }
        routes
    }

    /// Strip the base path, or `None` if `path` is outside it.
    fn route_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        let base = self.config.base_path.trim_end_matches('/');
        let rest = path.strip_prefix(base)?;
        match rest {
            "" => Some("/"),
            rest if rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }

    fn hook_context(&self, request: &StandardRequest, path: &str) -> AuthResult<HookContext> {
        let body = match request.body.as_deref() {
            Some(text) if !text.trim().is_empty() => {
                let is_json = request
                    .headers
                    .get("content-type")
                    .is_none_or(|ct| ct.contains("json"));
                if is_json {
                    Some(serde_json::from_str(text).map_err(|e| {
                        AuthError::bad_request(format!("Invalid JSON: {}", e))
                    })?)
                } else {
                    None
                }
            }
            _ => None,
        };

        Ok(HookContext {
            path: path.to_string(),
            method: request.method,
            headers: request.headers.clone(),
            body,
            query: request.query_pairs(),
            returned: None,
        })
    }

    async fn dispatch(&self, ctx: &HookContext) -> AuthResult<StandardResponse> {
        match (ctx.method, ctx.path.as_str()) {
            (HttpMethod::Get, "/ok") => return Ok(StandardResponse::json(200, &OkResponse { ok: true })?),
            (HttpMethod::Get, "/error") => {
                return Ok(StandardResponse::json(200, &OkResponse { ok: false })?);
            }
            _ => {}
        }

        for plugin in &self.plugins {
            if let Some(response) = plugin.on_request(ctx, &self.context).await? {
                return Ok(response);
            }
        }

        Err(AuthError::not_found("No handler found for this request"))
    }

    fn error_response(&self, path: &str, err: AuthError) -> StandardResponse {
        if err.status_code() >= 500 {
            self.config
                .logger
                .error(&format!("Request to {} failed: {}", path, err));
        }
        err.into_response()
    }
}

#[async_trait]
impl AuthEngine for BetterAuth {
    type Config = AuthConfig;

    async fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        Self::new(config.clone())
    }

    fn base_path(&self) -> Option<&str> {
        Some(&self.config.base_path)
    }

    fn hooks(&self) -> Option<&AuthHooks> {
        Some(&self.hooks)
    }

    fn hooks_mut(&mut self) -> Option<&mut AuthHooks> {
        Some(&mut self.hooks)
    }

    async fn get_session(&self, headers: &Headers) -> AuthResult<Option<UserSession>> {
        self.context.sessions.resolve(headers)
    }

    /// Run before hook, route, after hook. Handler and hook errors become
    /// their JSON error response; only infrastructure faults are returned as `Err`.
    async fn handler(&self, request: StandardRequest) -> AuthResult<StandardResponse> {
        let Some(path) = self.route_path(request.path()) else {
            return Ok(AuthError::not_found("No handler found for this request").into_response());
        };

        let mut ctx = match self.hook_context(&request, path) {
            Ok(ctx) => ctx,
            Err(err) => return Ok(self.error_response(path, err)),
        };

        let response = match self.hooks.run(HookPhase::Before, &mut ctx).await {
            Ok(()) => match self.dispatch(&ctx).await {
                Ok(response) => response,
                Err(err) => self.error_response(path, err),
            },
            Err(err) => self.error_response(path, err),
        };

        ctx.returned = Some(response);
        if let Err(err) = self.hooks.run(HookPhase::After, &mut ctx).await {
            return Ok(self.error_response(path, err));
        }

        ctx.returned
            .take()
            .ok_or_else(|| AuthError::internal("after hook cleared the response"))
    }
}
