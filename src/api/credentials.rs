//! Cookie-jar access for the CSRF double-submit token.
//!
//! The jar is any `reqwest::cookie::CookieStore`: reqwest fills it from
//! `Set-Cookie` responses, and the client reads the XSRF cookie back out of it.
//! Tests inject a pre-seeded or empty jar.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;

/// Cookie name the backend uses for the double-submit token.
pub const CSRF_COOKIE: &str = "XSRF-TOKEN";

/// Header the token is echoed back under on mutating requests.
pub const CSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Fresh, empty cookie jar.
pub fn new_jar() -> Arc<Jar> {
    Arc::new(Jar::default())
}

/// Read the decoded CSRF token the jar would send to `url`.
///
/// Pure lookup: never touches the network.
pub fn read_csrf_token(store: &dyn CookieStore, url: &Url) -> Option<String> {
    let header = store.cookies(url)?;
    let header = header.to_str().ok()?;
    csrf_from_cookie_header(header)
}

/// Extract and percent-decode `XSRF-TOKEN` from a `Cookie` header value.
pub fn csrf_from_cookie_header(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
        .map(|value| match urlencoding::decode(value) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header_parsing() {
        assert_eq!(
            csrf_from_cookie_header("laravel_session=s1; XSRF-TOKEN=abc%3D%3D"),
            Some("abc==".to_string())
        );
        assert_eq!(
            csrf_from_cookie_header("XSRF-TOKEN=plain"),
            Some("plain".to_string())
        );
        assert_eq!(csrf_from_cookie_header("laravel_session=s1"), None);
        assert_eq!(csrf_from_cookie_header("XSRF-TOKEN="), None);
        assert_eq!(csrf_from_cookie_header(""), None);
    }

    #[test]
    fn test_similar_cookie_names_ignored() {
        assert_eq!(csrf_from_cookie_header("MY-XSRF-TOKEN=nope"), None);
    }

    #[test]
    fn test_read_from_jar() {
        let url: Url = "http://api.test/".parse().unwrap();
        let jar = new_jar();
        assert_eq!(read_csrf_token(jar.as_ref(), &url), None);

        jar.add_cookie_str("XSRF-TOKEN=eyJpdiI6%2Bx%3D; Path=/", &url);
        assert_eq!(
            read_csrf_token(jar.as_ref(), &url),
            Some("eyJpdiI6+x=".to_string())
        );
    }
}
