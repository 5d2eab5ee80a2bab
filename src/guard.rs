//! Session-presence gate for application routes.

use std::sync::Arc;

use better_auth_bridge_core::logger::Logger;
use better_auth_bridge_core::{AuthEngine, Headers, UserSession};

use crate::context::SessionSlot;
use crate::error::Unauthorized;
use crate::metadata::{Reflector, RouteTarget};

/// What the guard needs from a runtime's in-flight request.
pub trait RequestContext {
    /// The matched route, when the runtime knows it.
    fn route(&self) -> Option<RouteTarget>;

    fn headers(&self) -> Headers;

    fn attach_session(&mut self, slot: SessionSlot);
}

/// Decides whether a request may reach a protected handler.
///
/// Routes tagged with the configured skip key pass without a session
/// lookup. Every other request must carry a session the engine recognises;
/// the lookup result is attached to the request either way.
pub struct AuthGuard<E> {
    engine: Arc<E>,
    reflector: Arc<Reflector>,
    skip_key: Option<String>,
    logger: Arc<dyn Logger>,
}

impl<E> Clone for AuthGuard<E> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            reflector: self.reflector.clone(),
            skip_key: self.skip_key.clone(),
            logger: self.logger.clone(),
        }
    }
}

impl<E: AuthEngine> AuthGuard<E> {
    pub fn new(
        engine: Arc<E>,
        reflector: Arc<Reflector>,
        skip_key: Option<String>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            engine,
            reflector,
            skip_key,
            logger,
        }
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// True when the route carries the skip flag set to `true`.
    pub fn is_exempt(&self, route: Option<&RouteTarget>) -> bool {
        if let Some(key) = &self.skip_key
            && let Some(route) = route
        {
            return self.reflector.get_all_and_override::<bool>(key, route) == Some(true);
        }
        false
    }

    /// Run the guard for one request.
    ///
    /// Exempt routes get an empty [`SessionSlot`] without a lookup, so the
    /// strict extractors report `SessionMissing` there; use
    /// `OptionalUserSession` on public routes.
    pub async fn can_activate<C>(&self, ctx: &mut C) -> Result<(), Unauthorized>
    where
        C: RequestContext + ?Sized,
    {
        let route = ctx.route();
        if self.is_exempt(route.as_ref()) {
            if let Some(route) = &route {
                self.logger
                    .debug(&format!("Skipping session check for {}", route.pattern));
            }
            ctx.attach_session(SessionSlot::new(None, self.logger.clone()));
            return Ok(());
        }

        let session = self.resolve_session(&ctx.headers()).await;
        let authenticated = session.is_some();
        ctx.attach_session(SessionSlot::new(session, self.logger.clone()));

        if authenticated {
            Ok(())
        } else {
            Err(Unauthorized)
        }
    }

    /// Engine lookup; a failing engine counts as "no session".
    pub async fn resolve_session(&self, headers: &Headers) -> Option<UserSession> {
        match self.engine.get_session(headers).await {
            Ok(session) => session,
            Err(err) => {
                self.logger
                    .warn(&format!("Session lookup failed: {}", err));
                None
            }
        }
    }
}
