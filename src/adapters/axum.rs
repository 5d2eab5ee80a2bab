//! axum integration.
//!
//! - [`AxumAdapter`] mounts the catch-all auth route on a [`Router`].
//! - [`AuthGuardLayer`] protects routes; install it with
//!   [`Router::route_layer`] so the matched route pattern is known.
//! - The session extractors implement [`FromRequestParts`].

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{
    FromRequestParts, MatchedPath, OptionalFromRequestParts, Request,
};
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use better_auth_bridge_core::{AuthEngine, Headers, HttpMethod, StandardRequest, StandardResponse};

use super::HttpAdapter;
use crate::bridge::{
    AuthBridge, NativeExchange, body_text, build_url, canonical_headers, forwarded_scheme,
};
use crate::context::{
    CurrentSession, CurrentUser, CurrentUserSession, OptionalUserSession, SessionSlot,
};
use crate::error::{BridgeError, SessionContextError, Unauthorized};
use crate::guard::{AuthGuard, RequestContext};
use crate::metadata::RouteTarget;

/// Wraps a stateless [`Router`] so the module can mount on it.
#[derive(Debug, Default)]
pub struct AxumAdapter {
    router: Router,
}

impl AxumAdapter {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

impl<E: AuthEngine> HttpAdapter<E> for AxumAdapter {
    fn adapter_type(&self) -> &str {
        "axum"
    }

    fn wildcard_suffix(&self) -> &'static str {
        "/{*path}"
    }

    fn mount_auth_handler(&mut self, pattern: &str, bridge: AuthBridge<E>) {
        let router = std::mem::take(&mut self.router);
        self.router = router.route(
            pattern,
            any(
                move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
                    let bridge = bridge.clone();
                    async move {
                        bridge
                            .handle::<AxumExchange>(AxumInbound {
                                method,
                                uri,
                                headers,
                                body,
                            })
                            .await
                    }
                },
            ),
        );
    }
}

/// A buffered axum request, as seen by the catch-all handler.
#[derive(Debug)]
pub struct AxumInbound {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

pub struct AxumExchange;

impl NativeExchange for AxumExchange {
    type Request = AxumInbound;
    type Reply = Response;

    fn read_request(request: AxumInbound) -> Result<StandardRequest, BridgeError> {
        let method: HttpMethod = request
            .method
            .as_str()
            .parse()
            .map_err(|_| BridgeError::Method(request.method.to_string()))?;

        let scheme = request
            .uri
            .scheme_str()
            .or_else(|| {
                header_str(&request.headers, "x-forwarded-proto").and_then(forwarded_scheme)
            })
            .unwrap_or("http");
        let host = header_str(&request.headers, HOST.as_str())
            .or_else(|| request.uri.authority().map(|authority| authority.as_str()))
            .unwrap_or("localhost");
        let url = build_url(scheme, host, request.uri.path(), request.uri.query())?;

        Ok(StandardRequest {
            method,
            url,
            headers: native_headers(&request.headers),
            body: body_text(&request.body)?,
        })
    }

    fn write_reply(response: StandardResponse) -> Result<Response, BridgeError> {
        let status = StatusCode::from_u16(response.status)
            .map_err(|_| BridgeError::Response(format!("invalid status {}", response.status)))?;

        let mut builder = Response::builder().status(status);
        for (name, value) in response.headers.iter() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| BridgeError::Response(format!("invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| BridgeError::Response(format!("invalid value for {}: {}", name, e)))?;
            builder = builder.header(name, value);
        }

        builder
            .body(Body::from(response.body.unwrap_or_default()))
            .map_err(|e| BridgeError::Response(e.to_string()))
    }

    fn fallback_reply(response: StandardResponse) -> Response {
        let status =
            StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut reply = Response::new(Body::from(response.body.unwrap_or_default()));
        *reply.status_mut() = status;
        reply
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        reply
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

fn native_headers(headers: &HeaderMap) -> Headers {
    canonical_headers(
        headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_bytes())),
    )
}

impl RequestContext for Request {
    fn route(&self) -> Option<RouteTarget> {
        self.extensions().get::<MatchedPath>().map(|matched| RouteTarget {
            method: self.method().as_str().parse().ok(),
            pattern: matched.as_str().to_string(),
        })
    }

    fn headers(&self) -> Headers {
        native_headers(Request::headers(self))
    }

    fn attach_session(&mut self, slot: SessionSlot) {
        self.extensions_mut().insert(slot);
    }
}

/// [`Layer`] running the guard in front of the wrapped routes.
pub struct AuthGuardLayer<E> {
    guard: AuthGuard<E>,
}

impl<E: AuthEngine> AuthGuardLayer<E> {
    pub fn new(guard: AuthGuard<E>) -> Self {
        Self { guard }
    }
}

impl<E> Clone for AuthGuardLayer<E> {
    fn clone(&self) -> Self {
        Self {
            guard: self.guard.clone(),
        }
    }
}

impl<S, E> Layer<S> for AuthGuardLayer<E> {
    type Service = AuthGuardService<S, E>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthGuardService {
            inner,
            guard: self.guard.clone(),
        }
    }
}

pub struct AuthGuardService<S, E> {
    inner: S,
    guard: AuthGuard<E>,
}

impl<S: Clone, E> Clone for AuthGuardService<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            guard: self.guard.clone(),
        }
    }
}

impl<S, E> Service<Request> for AuthGuardService<S, E>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    E: AuthEngine,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let guard = self.guard.clone();
        // The clone may not be ready; keep the one that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match guard.can_activate(&mut request).await {
                Ok(()) => inner.call(request).await,
                Err(rejection) => Ok(rejection.into_response()),
            }
        })
    }
}

impl IntoResponse for Unauthorized {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, axum::Json(self.body())).into_response()
    }
}

impl IntoResponse for SessionContextError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(self.body())).into_response()
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUserSession {
    type Rejection = SessionContextError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_slot(parts.extensions.get::<SessionSlot>())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = SessionContextError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_slot(parts.extensions.get::<SessionSlot>())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = SessionContextError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_slot(parts.extensions.get::<SessionSlot>())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for OptionalUserSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_slot(parts.extensions.get::<SessionSlot>()))
    }
}

impl<S: Send + Sync> OptionalFromRequestParts<S> for CurrentUserSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(OptionalUserSession::from_slot(parts.extensions.get::<SessionSlot>()).0.map(Self))
    }
}
