//! Route groups served by the engine.

use async_trait::async_trait;
use std::sync::Arc;
use validator::Validate;

use better_auth_bridge_core::{
    AuthResult, HookContext, HttpMethod, Session, StandardResponse,
};

use crate::config::AuthConfig;
use crate::cookie_utils::create_session_cookie;
use crate::session::SessionManager;
use crate::store::MemoryStore;

pub mod email_password;
pub mod session_management;

pub use email_password::EmailPasswordPlugin;
pub use session_management::SessionManagementPlugin;

/// Shared state handed to every plugin.
pub struct AuthContext {
    pub config: Arc<AuthConfig>,
    pub store: Arc<MemoryStore>,
    pub sessions: SessionManager,
}

/// A path served by a plugin.
#[derive(Debug, Clone)]
pub struct AuthRoute {
    pub method: HttpMethod,
    pub path: &'static str,
}

impl AuthRoute {
    pub const fn get(path: &'static str) -> Self {
        Self {
            method: HttpMethod::Get,
            path,
        }
    }

    pub const fn post(path: &'static str) -> Self {
        Self {
            method: HttpMethod::Post,
            path,
        }
    }
}

#[async_trait]
pub trait AuthPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    fn routes(&self) -> Vec<AuthRoute>;

    /// Handle the request if it belongs to this plugin.
    async fn on_request(
        &self,
        req: &HookContext,
        ctx: &AuthContext,
    ) -> AuthResult<Option<StandardResponse>>;
}

/// Parse and validate a JSON body, or produce the 400/422 response to send.
pub(crate) fn validate_request_body<T>(req: &HookContext) -> Result<T, StandardResponse>
where
    T: serde::de::DeserializeOwned + Validate,
{
    let value: T = req.body_as().map_err(|e| {
        StandardResponse::json(
            400,
            &serde_json::json!({
                "code": "BAD_REQUEST",
                "message": format!("Invalid JSON: {}", e),
            }),
        )
        .unwrap_or_else(|_| StandardResponse::text(400, "Invalid JSON"))
    })?;

    value
        .validate()
        .map_err(|errors| validation_error_response(&errors))?;

    Ok(value)
}

fn validation_error_response(errors: &validator::ValidationErrors) -> StandardResponse {
    let field_errors: std::collections::HashMap<String, Vec<String>> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect();

    StandardResponse::json(
        422,
        &serde_json::json!({
            "code": "VALIDATION_ERROR",
            "message": "Validation failed",
            "errors": field_errors,
        }),
    )
    .unwrap_or_else(|_| StandardResponse::text(422, "Validation failed"))
}

/// Attach the session cookie and, with bearer enabled, the token headers.
pub(crate) fn with_session_headers(
    response: StandardResponse,
    session: &Session,
    ctx: &AuthContext,
) -> AuthResult<StandardResponse> {
    let signed = ctx.sessions.sign_token(&session.token)?;
    let mut response =
        response.with_header("set-cookie", create_session_cookie(&signed, &ctx.config.session));

    if ctx.config.bearer {
        response.headers.set("set-auth-token", session.token.clone());
        response
            .headers
            .set("access-control-expose-headers", "set-auth-token");
    }

    Ok(response)
}

pub(crate) fn client_ip(req: &HookContext) -> Option<String> {
    req.headers
        .get("x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

pub(crate) fn user_agent(req: &HookContext) -> Option<String> {
    req.headers.get("user-agent").map(str::to_string)
}
