//! Catch-all forwarding of native requests to the engine's handler.

use serde_json::json;
use std::sync::Arc;
use url::Url;

use better_auth_bridge_core::logger::Logger;
use better_auth_bridge_core::{
    AuthEngine, DEFAULT_BASE_PATH, Headers, StandardRequest, StandardResponse,
};

use crate::error::BridgeError;

/// Conversions between one runtime's request/reply types and the engine's.
pub trait NativeExchange {
    type Request;
    type Reply;

    fn read_request(request: Self::Request) -> Result<StandardRequest, BridgeError>;

    fn write_reply(response: StandardResponse) -> Result<Self::Reply, BridgeError>;

    /// Must not fail: writes the replies the bridge produces itself.
    fn fallback_reply(response: StandardResponse) -> Self::Reply;
}

/// Forwards everything under the base path to the engine.
pub struct AuthBridge<E> {
    engine: Arc<E>,
    logger: Arc<dyn Logger>,
}

impl<E> Clone for AuthBridge<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            logger: self.logger.clone(),
        }
    }
}

impl<E: AuthEngine> AuthBridge<E> {
    pub fn new(engine: Arc<E>, logger: Arc<dyn Logger>) -> Self {
        Self { engine, logger }
    }

    pub async fn handle<X: NativeExchange>(&self, request: X::Request) -> X::Reply {
        match self.forward::<X>(request).await {
            Ok(reply) => reply,
            Err(BridgeError::Method(method)) => {
                self.logger
                    .debug(&format!("Rejected unsupported method {}", method));
                X::fallback_reply(method_not_allowed_response(&method))
            }
            Err(err) => {
                self.logger
                    .error(&format!("Better Auth handler failed: {}", err));
                X::fallback_reply(fallback_response())
            }
        }
    }

    async fn forward<X: NativeExchange>(&self, request: X::Request) -> Result<X::Reply, BridgeError> {
        let request = X::read_request(request)?;
        let response = self.engine.handler(request).await?;
        X::write_reply(response)
    }
}

/// `500 {"error":"Internal authentication error","code":"AUTH_FAILURE"}`.
pub fn fallback_response() -> StandardResponse {
    let body = json!({
        "error": "Internal authentication error",
        "code": "AUTH_FAILURE",
    });
    StandardResponse {
        status: 500,
        headers: [("content-type", "application/json")].into_iter().collect(),
        body: Some(body.to_string().into_bytes()),
    }
}

/// `405 {"code":"METHOD_NOT_ALLOWED",..}` for methods the engine cannot model.
pub fn method_not_allowed_response(method: &str) -> StandardResponse {
    let body = json!({
        "code": "METHOD_NOT_ALLOWED",
        "message": format!("Method {} is not supported", method),
    });
    StandardResponse {
        status: 405,
        headers: [("content-type", "application/json")].into_iter().collect(),
        body: Some(body.to_string().into_bytes()),
    }
}

/// Defaults to `/api/auth`, forces a leading `/`, drops trailing `/`.
/// The root path stays `/`.
pub fn normalize_base_path(base_path: Option<&str>) -> String {
    let path = base_path
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .unwrap_or(DEFAULT_BASE_PATH);

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Route pattern for the catch-all: base path joined with a runtime wildcard.
pub fn mount_pattern(base_path: &str, wildcard_suffix: &str) -> String {
    if base_path == "/" {
        wildcard_suffix.to_string()
    } else {
        format!("{}{}", base_path, wildcard_suffix)
    }
}

/// Absolute URL from the pieces a runtime exposes.
pub fn build_url(
    scheme: &str,
    host: &str,
    path: &str,
    query: Option<&str>,
) -> Result<Url, BridgeError> {
    let mut url = Url::parse(&format!("{}://{}", scheme, host))?;
    url.set_path(path);
    url.set_query(query.filter(|query| !query.is_empty()));
    Ok(url)
}

/// Canonical headers from a runtime's `(name, raw value)` pairs, in
/// arrival order. Empty values are skipped; non-UTF-8 bytes are decoded
/// lossily rather than dropped.
pub fn canonical_headers<'a, I>(pairs: I) -> Headers
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    pairs
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| (name, String::from_utf8_lossy(value).into_owned()))
        .collect()
}

/// The client-facing hop of an `x-forwarded-proto` value such as
/// `https, http`.
pub fn forwarded_scheme(value: &str) -> Option<&str> {
    value
        .split(',')
        .next()
        .map(str::trim)
        .filter(|scheme| !scheme.is_empty())
}

/// `Some(text)` for a non-empty UTF-8 body, `None` for an empty one.
pub fn body_text(bytes: &[u8]) -> Result<Option<String>, BridgeError> {
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(std::str::from_utf8(bytes)?.to_string()))
}
