//! actix-web integration.
//!
//! ```rust,no_run
//! use actix_web::{App, middleware::from_fn, web};
//! use better_auth_bridge::{ActixAdapter, BetterAuthModule, CurrentUser, require_session};
//! use better_auth_engine::BetterAuth;
//!
//! async fn me(CurrentUser(user): CurrentUser) -> String {
//!     user.email.unwrap_or_default()
//! }
//!
//! # fn app(module: BetterAuthModule<BetterAuth>) {
//! let app = App::new()
//!     .configure(|cfg| {
//!         module
//!             .configure(&mut ActixAdapter::new(cfg))
//!             .expect("actix-web is supported");
//!     })
//!     .service(
//!         web::resource("/me")
//!             .wrap(from_fn(require_session::<BetterAuth, _>))
//!             .route(web::get().to(me)),
//!     );
//! # let _ = app;
//! # }
//! ```

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::middleware::Next;
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError, web};
use std::future::{Ready, ready};

use better_auth_bridge_core::logger::default_logger;
use better_auth_bridge_core::{AuthEngine, Headers, HttpMethod, StandardRequest, StandardResponse};

use super::HttpAdapter;
use crate::bridge::{AuthBridge, NativeExchange, body_text, build_url, canonical_headers};
use crate::context::{
    CurrentSession, CurrentUser, CurrentUserSession, OptionalUserSession, SessionSlot,
};
use crate::error::{BridgeError, SessionContextError, Unauthorized};
use crate::guard::{AuthGuard, RequestContext};
use crate::metadata::RouteTarget;

/// Mounts onto the [`web::ServiceConfig`] handed to `App::configure`.
pub struct ActixAdapter<'a> {
    cfg: &'a mut web::ServiceConfig,
}

impl<'a> ActixAdapter<'a> {
    pub fn new(cfg: &'a mut web::ServiceConfig) -> Self {
        Self { cfg }
    }
}

impl<E: AuthEngine> HttpAdapter<E> for ActixAdapter<'_> {
    fn adapter_type(&self) -> &str {
        "actix-web"
    }

    fn wildcard_suffix(&self) -> &'static str {
        "/{tail:.*}"
    }

    /// [`require_session`] reads the guard back from app data.
    fn install_guard(&mut self, guard: AuthGuard<E>) {
        self.cfg.app_data(web::Data::new(guard));
    }

    fn mount_auth_handler(&mut self, pattern: &str, bridge: AuthBridge<E>) {
        self.cfg.route(
            pattern,
            web::route().to(move |request: HttpRequest, body: web::Bytes| {
                let bridge = bridge.clone();
                async move {
                    bridge
                        .handle::<ActixExchange>(ActixInbound { request, body })
                        .await
                }
            }),
        );
    }
}

pub struct ActixInbound {
    pub request: HttpRequest,
    pub body: web::Bytes,
}

pub struct ActixExchange;

impl NativeExchange for ActixExchange {
    type Request = ActixInbound;
    type Reply = HttpResponse;

    fn read_request(inbound: ActixInbound) -> Result<StandardRequest, BridgeError> {
        let request = &inbound.request;
        let method: HttpMethod = request
            .method()
            .as_str()
            .parse()
            .map_err(|_| BridgeError::Method(request.method().to_string()))?;

        let url = {
            let connection = request.connection_info();
            build_url(
                connection.scheme(),
                connection.host(),
                request.path(),
                Some(request.query_string()),
            )?
        };

        Ok(StandardRequest {
            method,
            url,
            headers: native_headers(request.headers()),
            body: body_text(&inbound.body)?,
        })
    }

    fn write_reply(response: StandardResponse) -> Result<HttpResponse, BridgeError> {
        let status = StatusCode::from_u16(response.status)
            .map_err(|_| BridgeError::Response(format!("invalid status {}", response.status)))?;

        let mut builder = HttpResponse::build(status);
        for (name, value) in response.headers.iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| BridgeError::Response(format!("invalid header name {}: {}", name, e)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| BridgeError::Response(format!("invalid value for {}: {}", name, e)))?;
            builder.append_header((header_name, header_value));
        }

        Ok(builder.body(response.body.unwrap_or_default()))
    }

    fn fallback_reply(response: StandardResponse) -> HttpResponse {
        let status =
            StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        HttpResponse::build(status)
            .content_type("application/json")
            .body(response.body.unwrap_or_default())
    }
}

fn native_headers(headers: &HeaderMap) -> Headers {
    canonical_headers(
        headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_bytes())),
    )
}

impl RequestContext for ServiceRequest {
    fn route(&self) -> Option<RouteTarget> {
        self.match_pattern().map(|pattern| RouteTarget {
            method: self.method().as_str().parse().ok(),
            pattern,
        })
    }

    fn headers(&self) -> Headers {
        native_headers(ServiceRequest::headers(self))
    }

    fn attach_session(&mut self, slot: SessionSlot) {
        self.extensions_mut().insert(slot);
    }
}

/// Guard middleware for `actix_web::middleware::from_fn`.
///
/// Expects `web::Data<AuthGuard<E>>` in app data, which
/// [`BetterAuthModule::configure`](crate::BetterAuthModule::configure)
/// registers through [`ActixAdapter`].
pub async fn require_session<E, B>(
    mut req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, actix_web::Error>
where
    E: AuthEngine,
    B: MessageBody + 'static,
{
    let Some(guard) = req.app_data::<web::Data<AuthGuard<E>>>().cloned() else {
        default_logger().error("No AuthGuard in app data; was the module configured on this app?");
        return Err(actix_web::error::ErrorInternalServerError(
            "authentication guard is not configured",
        ));
    };

    match guard.can_activate(&mut req).await {
        Ok(()) => next.call(req).await.map(ServiceResponse::map_into_left_body),
        Err(rejection) => Ok(req.error_response(rejection).map_into_right_body()),
    }
}

impl ResponseError for Unauthorized {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::Unauthorized().json(self.body())
    }
}

impl ResponseError for SessionContextError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::InternalServerError().json(self.body())
    }
}

impl FromRequest for CurrentUserSession {
    type Error = SessionContextError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        ready(Self::from_slot(extensions.get::<SessionSlot>()))
    }
}

impl FromRequest for CurrentUser {
    type Error = SessionContextError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        ready(Self::from_slot(extensions.get::<SessionSlot>()))
    }
}

impl FromRequest for CurrentSession {
    type Error = SessionContextError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        ready(Self::from_slot(extensions.get::<SessionSlot>()))
    }
}

impl FromRequest for OptionalUserSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let extensions = req.extensions();
        ready(Ok(Self::from_slot(extensions.get::<SessionSlot>())))
    }
}
