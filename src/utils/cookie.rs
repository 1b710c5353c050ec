use actix_web::cookie::{time::Duration, Cookie, SameSite};

/// Name of the cookie carrying the opaque visitor identifier
pub const SESSION_COOKIE_NAME: &str = "sid";

// One year, matching the identifier's intended lifetime
const SESSION_COOKIE_MAX_AGE_DAYS: i64 = 365;

/// Extracts a named cookie value from a raw `Cookie` header.
///
/// Tolerates any malformed input: a missing header, a segment without `=`,
/// or an undecodable value all yield `None`, never an error.
pub fn safe_get_cookie(header: Option<&str>, name: &str) -> Option<String> {
    let header = header?;

    for segment in header.split(';') {
        let (key, value) = match segment.split_once('=') {
            Some(pair) => pair,
            None => continue,
        };

        if key.trim() != name {
            continue;
        }

        return match urlencoding::decode(value.trim()) {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(_) => None,
        };
    }

    None
}

/// Builds the long-lived visitor identifier cookie attached to every response
pub fn session_cookie(sid: &str) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE_NAME, urlencoding::encode(sid).into_owned())
        .path("/")
        .max_age(Duration::days(SESSION_COOKIE_MAX_AGE_DAYS))
        .same_site(SameSite::Lax)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_named_cookie() {
        assert_eq!(
            safe_get_cookie(Some("sid=abc; theme=dark"), "sid"),
            Some("abc".to_string())
        );
        assert_eq!(
            safe_get_cookie(Some("theme=dark; sid=abc"), "sid"),
            Some("abc".to_string())
        );
    }

    #[test]
    fn decodes_encoded_values() {
        assert_eq!(
            safe_get_cookie(Some("sid=a%20b"), "sid"),
            Some("a b".to_string())
        );
    }

    #[test]
    fn missing_header_yields_none() {
        assert_eq!(safe_get_cookie(None, "sid"), None);
        assert_eq!(safe_get_cookie(Some(""), "sid"), None);
    }

    #[test]
    fn malformed_segments_are_skipped() {
        assert_eq!(safe_get_cookie(Some("garbage-without-equals"), "sid"), None);
        assert_eq!(safe_get_cookie(Some("; ; ="), "sid"), None);
        assert_eq!(
            safe_get_cookie(Some("broken; sid=ok"), "sid"),
            Some("ok".to_string())
        );
    }

    #[test]
    fn name_must_match_exactly() {
        assert_eq!(safe_get_cookie(Some("xsid=abc"), "sid"), None);
        assert_eq!(safe_get_cookie(Some("sidx=abc"), "sid"), None);
    }

    #[test]
    fn session_cookie_is_long_lived_and_lax() {
        let cookie = session_cookie("abc-123");
        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), "abc-123");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::days(365)));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn session_cookie_value_is_url_encoded() {
        let cookie = session_cookie("a b");
        assert_eq!(cookie.value(), "a%20b");
    }
}
