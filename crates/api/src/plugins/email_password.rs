use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use validator::Validate;

use better_auth_bridge_core::{
    AuthError, AuthResult, HookContext, HttpMethod, StandardResponse, User,
};

use super::{
    AuthContext, AuthPlugin, AuthRoute, client_ip, user_agent, validate_request_body,
    with_session_headers,
};

/// Email and password sign-up / sign-in.
pub struct EmailPasswordPlugin {
    enable_signup: bool,
}

#[derive(Debug, Deserialize, Validate)]
struct SignUpRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    name: String,
    #[validate(email(message = "Invalid email address"))]
    email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

#[derive(Debug, Deserialize, Validate)]
struct SignInRequest {
    #[validate(email(message = "Invalid email address"))]
    email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
    #[serde(rename = "callbackURL")]
    callback_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct SignUpResponse {
    token: String,
    user: User,
}

#[derive(Debug, Serialize)]
struct SignInResponse {
    redirect: bool,
    token: String,
    url: Option<String>,
    user: User,
}

impl Default for EmailPasswordPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailPasswordPlugin {
    pub fn new() -> Self {
        Self {
            enable_signup: true,
        }
    }

    pub fn enable_signup(mut self, enable: bool) -> Self {
        self.enable_signup = enable;
        self
    }

    async fn handle_sign_up(
        &self,
        req: &HookContext,
        ctx: &AuthContext,
    ) -> AuthResult<StandardResponse> {
        if !self.enable_signup {
            return Err(AuthError::forbidden("User registration is not enabled"));
        }

        let body: SignUpRequest = match validate_request_body(req) {
            Ok(body) => body,
            Err(response) => return Ok(response),
        };

        validate_password(&body.password, ctx)?;

        if ctx.store.user_by_email(&body.email)?.is_some() {
            return Err(AuthError::conflict("A user with this email already exists"));
        }

        let password_hash = hash_password(&body.password)?;
        let user = ctx
            .store
            .create_user(Some(body.name), &body.email, password_hash)?;
        let session = ctx
            .sessions
            .create_session(&user.id, client_ip(req), user_agent(req))?;

        let response = StandardResponse::json(
            200,
            &SignUpResponse {
                token: session.token.clone(),
                user,
            },
        )?;
        with_session_headers(response, &session, ctx)
    }

    async fn handle_sign_in(
        &self,
        req: &HookContext,
        ctx: &AuthContext,
    ) -> AuthResult<StandardResponse> {
        let body: SignInRequest = match validate_request_body(req) {
            Ok(body) => body,
            Err(response) => return Ok(response),
        };

        let stored = ctx
            .store
            .user_by_email(&body.email)?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&body.password, &stored.password_hash)?;

        let session = ctx
            .sessions
            .create_session(&stored.user.id, client_ip(req), user_agent(req))?;

        let response = StandardResponse::json(
            200,
            &SignInResponse {
                redirect: body.callback_url.is_some(),
                token: session.token.clone(),
                url: body.callback_url,
                user: stored.user,
            },
        )?;
        with_session_headers(response, &session, ctx)
    }
}

fn validate_password(password: &str, ctx: &AuthContext) -> AuthResult<()> {
    let limits = &ctx.config.password;
    if password.len() < limits.min_length {
        return Err(AuthError::bad_request(format!(
            "Password must be at least {} characters long",
            limits.min_length
        )));
    }
    if password.len() > limits.max_length {
        return Err(AuthError::bad_request(format!(
            "Password must be at most {} characters long",
            limits.max_length
        )));
    }
    Ok(())
}

fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> AuthResult<()> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::PasswordHash(format!("Invalid password hash: {}", e)))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[async_trait]
impl AuthPlugin for EmailPasswordPlugin {
    fn name(&self) -> &'static str {
        "email-password"
    }

    fn routes(&self) -> Vec<AuthRoute> {
        vec![
            AuthRoute::post("/sign-up/email"),
            AuthRoute::post("/sign-in/email"),
        ]
    }

    async fn on_request(
        &self,
        req: &HookContext,
        ctx: &AuthContext,
    ) -> AuthResult<Option<StandardResponse>> {
        match (req.method, req.path.as_str()) {
            (HttpMethod::Post, "/sign-up/email") => Ok(Some(self.handle_sign_up(req, ctx).await?)),
            (HttpMethod::Post, "/sign-in/email") => Ok(Some(self.handle_sign_in(req, ctx).await?)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_and_mismatches_are_invalid_credentials() {
        let hash = hash_password("correct horse").unwrap();
        verify_password("correct horse", &hash).unwrap();
        let err = verify_password("battery staple", &hash).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}
