//! Static route metadata.
//!
//! A [`Reflector`] holds tags attached to individual handlers and to route
//! scopes (path prefixes grouping several handlers). The guard reads the
//! skip flag from it; applications may store any JSON value under their own
//! keys.
//!
//! ```rust
//! use better_auth_bridge::HttpMethod;
//! use better_auth_bridge::metadata::{Reflector, RouteTarget};
//!
//! let reflector = Reflector::new()
//!     .set_scope_metadata("/public", "PUBLIC", true)
//!     .set_metadata(RouteTarget::new(HttpMethod::Get, "/public/admin"), "PUBLIC", false);
//!
//! let target = RouteTarget::new(HttpMethod::Get, "/public/admin");
//! assert_eq!(reflector.get_all_and_override::<bool>("PUBLIC", &target), Some(false));
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use better_auth_bridge_core::HttpMethod;

/// Identity of a routed handler: the method (or any) and the route
/// pattern as registered with the router, e.g. `/users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteTarget {
    pub method: Option<HttpMethod>,
    pub pattern: String,
}

impl RouteTarget {
    pub fn new(method: HttpMethod, pattern: impl Into<String>) -> Self {
        Self {
            method: Some(method),
            pattern: pattern.into(),
        }
    }

    /// Matches the pattern under every method.
    pub fn any(pattern: impl Into<String>) -> Self {
        Self {
            method: None,
            pattern: pattern.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reflector {
    handlers: HashMap<RouteTarget, HashMap<String, Value>>,
    scopes: Vec<(String, HashMap<String, Value>)>,
}

impl Reflector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag a single handler.
    pub fn set_metadata(
        mut self,
        target: RouteTarget,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.handlers
            .entry(target)
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Tag every route whose pattern lies under `prefix`.
    pub fn set_scope_metadata(
        mut self,
        prefix: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let prefix = normalize_prefix(&prefix.into());
        let key = key.into();
        let value = value.into();

        match self.scopes.iter_mut().find(|(existing, _)| *existing == prefix) {
            Some((_, tags)) => {
                tags.insert(key, value);
            }
            None => self.scopes.push((prefix, HashMap::from([(key, value)]))),
        }
        self
    }

    /// Handler-level value only: exact method first (HEAD also tries GET),
    /// then any-method.
    pub fn get<T: DeserializeOwned>(&self, key: &str, target: &RouteTarget) -> Option<T> {
        self.handler_value(key, target).and_then(decode)
    }

    /// The handler-level value when one is defined (whatever it is),
    /// otherwise the value of the closest enclosing scope.
    pub fn get_all_and_override<T: DeserializeOwned>(
        &self,
        key: &str,
        target: &RouteTarget,
    ) -> Option<T> {
        self.handler_value(key, target)
            .or_else(|| self.scope_value(key, &target.pattern))
            .and_then(decode)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.scopes.is_empty()
    }

    fn handler_value(&self, key: &str, target: &RouteTarget) -> Option<&Value> {
        let exact = self.handlers.get(target).and_then(|tags| tags.get(key));
        if exact.is_some() || target.method.is_none() {
            return exact;
        }

        // HEAD requests are served by the GET handler.
        if target.method == Some(HttpMethod::Head) {
            let get = RouteTarget::new(HttpMethod::Get, target.pattern.clone());
            if let Some(value) = self.handlers.get(&get).and_then(|tags| tags.get(key)) {
                return Some(value);
            }
        }

        self.handlers
            .get(&RouteTarget::any(target.pattern.clone()))
            .and_then(|tags| tags.get(key))
    }

    fn scope_value(&self, key: &str, pattern: &str) -> Option<&Value> {
        self.scopes
            .iter()
            .filter(|(prefix, tags)| in_scope(prefix, pattern) && tags.contains_key(key))
            .max_by_key(|(prefix, _)| prefix.len())
            .and_then(|(_, tags)| tags.get(key))
    }
}

fn decode<T: DeserializeOwned>(value: &Value) -> Option<T> {
    T::deserialize(value).ok()
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.starts_with('/') || trimmed.is_empty() {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Segment-aware prefix test: `/api` covers `/api` and `/api/x`, not `/apix`.
fn in_scope(prefix: &str, pattern: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match pattern.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
