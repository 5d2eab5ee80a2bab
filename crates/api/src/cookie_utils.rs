//! `Set-Cookie` values for the session cookie.

use cookie::{Cookie, SameSite as CookieSameSite};

use crate::config::{SameSite, SessionConfig};

/// Build the `Set-Cookie` value carrying a signed session token.
pub fn create_session_cookie(signed_token: &str, session: &SessionConfig) -> String {
    let expires = cookie::time::OffsetDateTime::now_utc()
        + cookie::time::Duration::seconds(session.expires_in.num_seconds());

    Cookie::build((session.cookie_name.as_str(), signed_token))
        .path("/")
        .expires(expires)
        .secure(session.cookie_secure || session.cookie_same_site == SameSite::None)
        .http_only(session.cookie_http_only)
        .same_site(map_same_site(session.cookie_same_site))
        .build()
        .to_string()
}

/// Build the `Set-Cookie` value that clears the session cookie.
pub fn create_clear_session_cookie(session: &SessionConfig) -> String {
    Cookie::build((session.cookie_name.as_str(), ""))
        .path("/")
        .expires(cookie::time::OffsetDateTime::UNIX_EPOCH)
        .secure(session.cookie_secure || session.cookie_same_site == SameSite::None)
        .http_only(session.cookie_http_only)
        .same_site(map_same_site(session.cookie_same_site))
        .build()
        .to_string()
}

fn map_same_site(same_site: SameSite) -> CookieSameSite {
    match same_site {
        SameSite::Strict => CookieSameSite::Strict,
        SameSite::Lax => CookieSameSite::Lax,
        SameSite::None => CookieSameSite::None,
    }
}
