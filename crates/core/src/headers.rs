//! Canonical header collection shared by the bridge, the guard, and engines.

use serde::{Deserialize, Serialize};

/// Ordered header multi-map.
///
/// Names are lowercased on insertion so lookups are case-insensitive.
/// [`Headers::append`] keeps earlier values for the same name, which
/// matters for headers such as `set-cookie` that may legitimately repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, keeping any values already stored under `name`.
    pub fn append(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .push((name.as_ref().to_ascii_lowercase(), value.into()));
    }

    /// Replace every value stored under `name` with a single value.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let name = name.as_ref().to_ascii_lowercase();
        self.entries.retain(|(existing, _)| *existing != name);
        self.entries.push((name, value.into()));
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let name = name.to_ascii_lowercase();
        self.entries
            .iter()
            .filter(move |(existing, _)| *existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        self.entries.retain(|(existing, _)| *existing != name);
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bearer token from the `authorization` header, if present.
    pub fn bearer_token(&self) -> Option<&str> {
        self.get("authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Value of the named cookie from the `cookie` header(s).
    pub fn cookie(&self, cookie_name: &str) -> Option<&str> {
        let prefix = format!("{}=", cookie_name);
        self.get_all("cookie")
            .flat_map(|header| header.split(';'))
            .map(str::trim)
            .find_map(|part| part.strip_prefix(prefix.as_str()))
            .filter(|value| !value.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_insensitive() {
        let mut headers = Headers::new();
        headers.append("Content-Type", "application/json");
        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn append_keeps_repeated_values_in_order() {
        let mut headers = Headers::new();
        headers.append("set-cookie", "a=1");
        headers.append("Set-Cookie", "b=2");
        let values: Vec<&str> = headers.get_all("set-cookie").collect();
        assert_eq!(values, vec!["a=1", "b=2"]);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn set_replaces_all_values() {
        let mut headers: Headers = [("x-test", "1"), ("x-test", "2")].into_iter().collect();
        headers.set("X-Test", "3");
        assert_eq!(headers.get_all("x-test").collect::<Vec<_>>(), vec!["3"]);
    }

    #[test]
    fn bearer_and_cookie_lookup() {
        let headers: Headers = [
            ("authorization", "Bearer abc123"),
            ("cookie", "theme=dark; better-auth.session_token=tok.sig"),
        ]
        .into_iter()
        .collect();
        assert_eq!(headers.bearer_token(), Some("abc123"));
        assert_eq!(
            headers.cookie("better-auth.session_token"),
            Some("tok.sig")
        );
        assert_eq!(headers.cookie("missing"), None);
    }
}
