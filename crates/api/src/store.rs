//! In-memory user and session tables.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use better_auth_bridge_core::{AuthError, AuthResult, Session, User};

/// A user row plus its credential.
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub user: User,
    pub password_hash: String,
}

pub struct CreateSession {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// `std::sync::Mutex` tables. No lock is held across an `.await`.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, StoredUser>>,
    email_index: Mutex<HashMap<String, String>>,
    sessions: Mutex<HashMap<String, Session>>,
}

fn lock<T>(mutex: &Mutex<T>) -> AuthResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| AuthError::internal("memory store lock poisoned"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_user(
        &self,
        name: Option<String>,
        email: &str,
        password_hash: String,
    ) -> AuthResult<User> {
        let mut users = lock(&self.users)?;
        let mut email_index = lock(&self.email_index)?;

        let email = email.to_lowercase();
        if email_index.contains_key(&email) {
            return Err(AuthError::conflict("A user with this email already exists"));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name,
            email: Some(email.clone()),
            email_verified: false,
            image: None,
            created_at: now,
            updated_at: now,
        };

        users.insert(
            user.id.clone(),
            StoredUser {
                user: user.clone(),
                password_hash,
            },
        );
        email_index.insert(email, user.id.clone());

        Ok(user)
    }

    pub fn user_by_email(&self, email: &str) -> AuthResult<Option<StoredUser>> {
        let email_index = lock(&self.email_index)?;
        let users = lock(&self.users)?;

        Ok(email_index
            .get(&email.to_lowercase())
            .and_then(|id| users.get(id))
            .cloned())
    }

    pub fn user_by_id(&self, id: &str) -> AuthResult<Option<User>> {
        let users = lock(&self.users)?;
        Ok(users.get(id).map(|stored| stored.user.clone()))
    }

    pub fn create_session(&self, create: CreateSession) -> AuthResult<Session> {
        let mut sessions = lock(&self.sessions)?;

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            expires_at: create.expires_at,
            token: format!("session_{}", Uuid::new_v4()),
            created_at: now,
            updated_at: now,
            ip_address: create.ip_address,
            user_agent: create.user_agent,
            user_id: create.user_id,
        };

        sessions.insert(session.token.clone(), session.clone());
        Ok(session)
    }

    pub fn session(&self, token: &str) -> AuthResult<Option<Session>> {
        let sessions = lock(&self.sessions)?;
        Ok(sessions.get(token).cloned())
    }

    pub fn update_session_expiry(&self, token: &str, expires_at: DateTime<Utc>) -> AuthResult<()> {
        let mut sessions = lock(&self.sessions)?;
        if let Some(session) = sessions.get_mut(token) {
            session.expires_at = expires_at;
            session.updated_at = Utc::now();
        }
        Ok(())
    }

    pub fn delete_session(&self, token: &str) -> AuthResult<bool> {
        let mut sessions = lock(&self.sessions)?;
        Ok(sessions.remove(token).is_some())
    }

    pub fn delete_expired_sessions(&self) -> AuthResult<usize> {
        let mut sessions = lock(&self.sessions)?;
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn emails_are_unique_case_insensitively() {
        let store = MemoryStore::new();
        store
            .create_user(Some("t".into()), "Test@X.com", "hash".into())
            .unwrap();
        let err = store
            .create_user(None, "test@x.com", "hash".into())
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
        assert!(store.user_by_email("TEST@x.com").unwrap().is_some());
    }

    #[test]
    fn expired_sessions_are_swept() {
        let store = MemoryStore::new();
        let live = store
            .create_session(CreateSession {
                user_id: "u1".into(),
                expires_at: Utc::now() + Duration::hours(1),
                ip_address: None,
                user_agent: None,
            })
            .unwrap();
        store
            .create_session(CreateSession {
                user_id: "u1".into(),
                expires_at: Utc::now() - Duration::hours(1),
                ip_address: None,
                user_agent: None,
            })
            .unwrap();

        assert_eq!(store.delete_expired_sessions().unwrap(), 1);
        assert!(store.session(&live.token).unwrap().is_some());
        assert!(live.token.starts_with("session_"));
    }
}
