//! Who is calling: the session user or the identity header.

use axum::http::{HeaderMap, HeaderName};

/// Session user, inserted as a request extension by an outer authentication layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub email: String,
}

/// Caller email: the session user wins over the identity header. Blank values count as absent.
#[must_use]
pub fn resolve_email(
    user: Option<&AuthenticatedUser>,
    headers: &HeaderMap,
    identity_header: &HeaderName,
) -> Option<String> {
    let from_session = user.map(|u| u.email.trim()).filter(|e| !e.is_empty());
    let from_header = || {
        headers
            .get(identity_header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|e| !e.is_empty())
    };
    from_session.or_else(from_header).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn header() -> HeaderName {
        HeaderName::from_static("x-user-email")
    }

    #[test]
    fn session_user_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(header(), HeaderValue::from_static("header@b.com"));
        let user = AuthenticatedUser {
            email: " session@b.com ".to_owned(),
        };
        assert_eq!(
            resolve_email(Some(&user), &headers, &header()).as_deref(),
            Some("session@b.com")
        );
    }

    #[test]
    fn header_is_trimmed_and_blank_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header(), HeaderValue::from_static("  a@b.com "));
        let blank = AuthenticatedUser {
            email: "  ".to_owned(),
        };
        assert_eq!(
            resolve_email(Some(&blank), &headers, &header()).as_deref(),
            Some("a@b.com")
        );

        headers.insert(header(), HeaderValue::from_static("   "));
        assert_eq!(resolve_email(None, &headers, &header()), None);
        assert_eq!(resolve_email(None, &HeaderMap::new(), &header()), None);
    }
}
