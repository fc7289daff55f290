//! Request spans for the HTTP trace layer

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, Request};
use tracing::Span;

const TRUE_CLIENT_IP: HeaderName = HeaderName::from_static("true-client-ip");
const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");
const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Client address reported by a fronting proxy, if any.
///
/// `True-Client-IP` wins over `X-Real-IP`, which wins over the first hop of
/// `X-Forwarded-For`.
pub fn client_ip(headers: &HeaderMap) -> Option<&str> {
    let header = |name: &HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    header(&TRUE_CLIENT_IP)
        .or_else(|| header(&X_REAL_IP))
        .or_else(|| {
            header(&X_FORWARDED_FOR)
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        })
}

/// Span for one request, carrying the forwarded client address
pub fn make_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        client_ip = client_ip(request.headers()).unwrap_or("-"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_no_forwarding_headers() {
        assert_eq!(client_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn test_first_forwarded_hop() {
        let map = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1, 10.0.0.2")]);
        assert_eq!(client_ip(&map), Some("203.0.113.7"));
    }

    #[test]
    fn test_header_precedence() {
        let map = headers(&[
            ("x-forwarded-for", "203.0.113.7"),
            ("x-real-ip", "198.51.100.4"),
        ]);
        assert_eq!(client_ip(&map), Some("198.51.100.4"));

        let map = headers(&[
            ("x-real-ip", "198.51.100.4"),
            ("true-client-ip", "192.0.2.1"),
        ]);
        assert_eq!(client_ip(&map), Some("192.0.2.1"));
    }

    #[test]
    fn test_blank_values_are_skipped() {
        let map = headers(&[("x-real-ip", "  "), ("x-forwarded-for", " 203.0.113.7 ")]);
        assert_eq!(client_ip(&map), Some("203.0.113.7"));
    }
}
