//! Shared test harness.
//!
//! - [`FakeEngine`]: a scripted [`AuthEngine`] that records what the
//!   adapter hands it.
//! - [`CaptureLogger`]: a [`Logger`] that keeps every line for assertions.
//! - Helpers around the in-memory `better-auth-engine`.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use better_auth_bridge::{
    AuthEngine, AuthError, AuthHooks, AuthResult, Headers, HookContext, HookPhase, Logger,
    ModuleOptions, Session, StandardRequest, StandardResponse, User, UserSession,
};
use better_auth_bridge::bridge::normalize_base_path;
use better_auth_engine::AuthConfig;

pub const SECRET: &str = "test-secret-key-that-is-at-least-32-characters-long";
pub const VALID_TOKEN: &str = "valid-token";

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Debug,
}

#[derive(Default)]
pub struct CaptureLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl CaptureLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, level: Level, fragment: &str) -> bool {
        self.lines()
            .iter()
            .any(|(l, message)| *l == level && message.contains(fragment))
    }

    fn push(&self, level: Level, message: &str) {
        self.lines.lock().unwrap().push((level, message.to_string()));
    }
}

impl Logger for CaptureLogger {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }

    fn debug(&self, message: &str) {
        self.push(Level::Debug, message);
    }
}

// ---------------------------------------------------------------------------
// Fake engine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct FakeConfig {
    pub base_path: Option<String>,
    /// `get_session` fails instead of answering.
    pub fail_session: bool,
    /// `handler` fails instead of answering.
    pub fail_handler: bool,
    /// The engine reports no hook slots.
    pub no_hooks: bool,
    /// Canned reply; otherwise the request is echoed back as JSON.
    pub response: Option<StandardResponse>,
}

pub struct FakeEngine {
    config: FakeConfig,
    hooks: AuthHooks,
    requests: Mutex<Vec<StandardRequest>>,
    session_lookups: AtomicUsize,
}

impl FakeEngine {
    pub fn requests(&self) -> Vec<StandardRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn session_lookups(&self) -> usize {
        self.session_lookups.load(Ordering::SeqCst)
    }

    fn echo(request: &StandardRequest) -> StandardResponse {
        StandardResponse::json(
            200,
            &serde_json::json!({
                "method": request.method.as_str(),
                "path": request.path(),
                "query": request.url.query(),
                "body": request.body,
            }),
        )
        .unwrap()
    }
}

#[async_trait]
impl AuthEngine for FakeEngine {
    type Config = FakeConfig;

    async fn from_config(config: &FakeConfig) -> AuthResult<Self> {
        Ok(Self {
            config: config.clone(),
            hooks: AuthHooks::new(),
            requests: Mutex::new(Vec::new()),
            session_lookups: AtomicUsize::new(0),
        })
    }

    fn base_path(&self) -> Option<&str> {
        self.config.base_path.as_deref()
    }

    fn hooks(&self) -> Option<&AuthHooks> {
        (!self.config.no_hooks).then_some(&self.hooks)
    }

    fn hooks_mut(&mut self) -> Option<&mut AuthHooks> {
        if self.config.no_hooks {
            None
        } else {
            Some(&mut self.hooks)
        }
    }

    async fn get_session(&self, headers: &Headers) -> AuthResult<Option<UserSession>> {
        self.session_lookups.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_session {
            return Err(AuthError::internal("session store offline"));
        }
        Ok((headers.bearer_token() == Some(VALID_TOKEN)).then(sample_session))
    }

    async fn handler(&self, request: StandardRequest) -> AuthResult<StandardResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if self.config.fail_handler {
            return Err(AuthError::internal("engine exploded"));
        }

        let base = normalize_base_path(self.base_path());
        let path = request
            .path()
            .strip_prefix(base.trim_end_matches('/'))
            .unwrap_or(request.path())
            .to_string();
        let mut ctx = HookContext::new(request.method, path);
        ctx.headers = request.headers.clone();

        if let Err(err) = self.hooks.run(HookPhase::Before, &mut ctx).await {
            return Ok(err.into_response());
        }

        let response = self
            .config
            .response
            .clone()
            .unwrap_or_else(|| Self::echo(&request));
        ctx.returned = Some(response);

        if let Err(err) = self.hooks.run(HookPhase::After, &mut ctx).await {
            return Ok(err.into_response());
        }
        Ok(ctx.returned.unwrap_or_else(|| StandardResponse::new(204)))
    }
}

pub fn sample_session() -> UserSession {
    let now = Utc::now();
    UserSession {
        user: User {
            id: "user_1".into(),
            name: Some("t".into()),
            email: Some("test@x.com".into()),
            email_verified: false,
            image: None,
            created_at: now,
            updated_at: now,
        },
        session: Session {
            id: "sess_1".into(),
            expires_at: now + Duration::days(7),
            token: VALID_TOKEN.into(),
            created_at: now,
            updated_at: now,
            ip_address: None,
            user_agent: None,
            user_id: "user_1".into(),
        },
    }
}

pub fn fake_options(config: FakeConfig, logger: &Arc<CaptureLogger>) -> ModuleOptions<FakeConfig> {
    ModuleOptions::new(config).logger(logger.clone())
}

// ---------------------------------------------------------------------------
// Real engine
// ---------------------------------------------------------------------------

/// Bearer-enabled engine config accepting two-character passwords.
pub fn engine_config() -> AuthConfig {
    AuthConfig::new(SECRET)
        .base_url("http://localhost:3000")
        .password_min_length(2)
        .bearer(true)
}

pub fn sign_up_body() -> serde_json::Value {
    serde_json::json!({ "email": "test@x.com", "password": "pw", "name": "t" })
}

pub fn sign_in_body() -> serde_json::Value {
    serde_json::json!({ "email": "test@x.com", "password": "pw" })
}
