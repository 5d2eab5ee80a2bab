//! Reading the guard's outcome from inside a handler.
//!
//! The guard always leaves a [`SessionSlot`] in the request extensions. The
//! extractors [`CurrentUserSession`], [`CurrentUser`], [`CurrentSession`]
//! and [`OptionalUserSession`] read it back. Their runtime impls live in
//! the adapter modules.

use serde::Serialize;
use std::sync::Arc;

use better_auth_bridge_core::logger::{Logger, default_logger};
use better_auth_bridge_core::{Session, SessionField, User, UserSession};

use crate::error::SessionContextError;

/// Request-extension entry written by the guard.
#[derive(Debug, Clone)]
pub struct SessionSlot {
    session: Option<UserSession>,
    logger: Arc<dyn Logger>,
}

impl SessionSlot {
    pub(crate) fn new(session: Option<UserSession>, logger: Arc<dyn Logger>) -> Self {
        Self { session, logger }
    }

    pub fn session(&self) -> Option<&UserSession> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn view(&self, field: Option<SessionField>) -> Result<SessionView, SessionContextError> {
        current_session(Some(self), field)
    }
}

/// The whole session or one selected part of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SessionView {
    Full(UserSession),
    User(User),
    Session(Session),
}

impl SessionView {
    pub fn into_user(self) -> Option<User> {
        match self {
            Self::Full(full) => Some(full.user),
            Self::User(user) => Some(user),
            Self::Session(_) => None,
        }
    }
}

/// Resolve the session attached to a request, optionally narrowed to one field.
pub fn current_session(
    slot: Option<&SessionSlot>,
    field: Option<SessionField>,
) -> Result<SessionView, SessionContextError> {
    let session = require_session(slot)?;
    Ok(match field {
        None => SessionView::Full(session.clone()),
        Some(SessionField::User) => SessionView::User(session.user.clone()),
        Some(SessionField::Session) => SessionView::Session(session.session.clone()),
    })
}

/// The attached session, or the misuse error (logged at error level).
pub(crate) fn require_session(
    slot: Option<&SessionSlot>,
) -> Result<&UserSession, SessionContextError> {
    let result = match slot {
        None => Err(SessionContextError::GuardNotRun),
        Some(slot) => slot.session().ok_or(SessionContextError::SessionMissing),
    };

    if let Err(err) = &result {
        let message = format!("Session accessor failed: {}", err);
        match slot {
            Some(slot) => slot.logger.error(&message),
            None => default_logger().error(&message),
        }
    }

    result
}

/// Extracts the full session attached by the guard.
#[derive(Debug, Clone)]
pub struct CurrentUserSession(pub UserSession);

/// The attached session if there is one. Never rejects; meant for routes
/// the guard lets through without a session.
#[derive(Debug, Clone, Default)]
pub struct OptionalUserSession(pub Option<UserSession>);

/// Extracts only the authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Extracts only the session record.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl CurrentUserSession {
    pub(crate) fn from_slot(slot: Option<&SessionSlot>) -> Result<Self, SessionContextError> {
        require_session(slot).map(|session| Self(session.clone()))
    }
}

impl OptionalUserSession {
    pub(crate) fn from_slot(slot: Option<&SessionSlot>) -> Self {
        Self(slot.and_then(SessionSlot::session).cloned())
    }
}

impl CurrentUser {
    pub(crate) fn from_slot(slot: Option<&SessionSlot>) -> Result<Self, SessionContextError> {
        require_session(slot).map(|session| Self(session.user.clone()))
    }
}

impl CurrentSession {
    pub(crate) fn from_slot(slot: Option<&SessionSlot>) -> Result<Self, SessionContextError> {
        require_session(slot).map(|session| Self(session.session.clone()))
    }
}
