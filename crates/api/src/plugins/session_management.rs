use async_trait::async_trait;
use serde::Serialize;

use better_auth_bridge_core::{AuthResult, HookContext, HttpMethod, StandardResponse};

use super::{AuthContext, AuthPlugin, AuthRoute};
use crate::cookie_utils::create_clear_session_cookie;

/// `get-session` and `sign-out`.
#[derive(Debug, Default)]
pub struct SessionManagementPlugin;

#[derive(Debug, Serialize)]
struct SignOutResponse {
    success: bool,
}

impl SessionManagementPlugin {
    pub fn new() -> Self {
        Self
    }

    fn handle_get_session(&self, req: &HookContext, ctx: &AuthContext) -> AuthResult<StandardResponse> {
        let session = ctx.sessions.resolve(&req.headers)?;
        Ok(StandardResponse::json(200, &session)?)
    }

    fn handle_sign_out(&self, req: &HookContext, ctx: &AuthContext) -> AuthResult<StandardResponse> {
        if let Some(token) = ctx.sessions.extract_session_token(&req.headers) {
            ctx.sessions.delete_session(&token)?;
        }

        Ok(StandardResponse::json(200, &SignOutResponse { success: true })?
            .with_header("set-cookie", create_clear_session_cookie(&ctx.config.session)))
    }
}

#[async_trait]
impl AuthPlugin for SessionManagementPlugin {
    fn name(&self) -> &'static str {
        "session-management"
    }

    fn routes(&self) -> Vec<AuthRoute> {
        vec![AuthRoute::get("/get-session"), AuthRoute::post("/sign-out")]
    }

    async fn on_request(
        &self,
        req: &HookContext,
        ctx: &AuthContext,
    ) -> AuthResult<Option<StandardResponse>> {
        match (req.method, req.path.as_str()) {
            (HttpMethod::Get, "/get-session") => Ok(Some(self.handle_get_session(req, ctx)?)),
            (HttpMethod::Post, "/sign-out") => Ok(Some(self.handle_sign_out(req, ctx)?)),
            _ => Ok(None),
        }
    }
}
