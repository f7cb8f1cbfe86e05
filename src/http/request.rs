//! Outbound request preparation.
//!
//! # Responsibilities
//! - Derive the upstream target from the inbound URI when the caller gives none
//! - Seed outbound headers from the inbound request
//! - Apply the encoder's content type over the inbound one
//!
//! # Design Decisions
//! - Every inbound header value is copied, in order, except the
//!   connection-owned `Host`, `Content-Length` and `Transfer-Encoding`;
//!   the transport recomputes those for the new body
//! - Interceptors run later, on top of the seeded headers

use axum::http::{header, HeaderMap, HeaderValue, Uri};

const CONNECTION_OWNED: [header::HeaderName; 3] =
    [header::HOST, header::CONTENT_LENGTH, header::TRANSFER_ENCODING];

/// Join path, query and fragment into a relative URL string. Empty parts are omitted.
pub fn relative_target(path: &str, query: Option<&str>, fragment: Option<&str>) -> String {
    let mut target = path.to_string();
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
        target.push('#');
        target.push_str(fragment);
    }
    target
}

/// Relative target of an inbound request. Fragments never reach a server,
/// so `Uri` carries none.
pub fn inbound_target(uri: &Uri) -> String {
    relative_target(uri.path(), uri.query(), None)
}

/// Copy inbound headers and override `Content-Type` with the encoder's value.
pub fn seed_headers(inbound: &HeaderMap, content_type: Option<HeaderValue>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if CONNECTION_OWNED.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if let Some(content_type) = content_type {
        headers.insert(header::CONTENT_TYPE, content_type);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_target_parts() {
        assert_eq!(relative_target("/v1/orders", Some("status=open"), None), "/v1/orders?status=open");
        assert_eq!(relative_target("/a", Some("q=1"), Some("top")), "/a?q=1#top");
        assert_eq!(relative_target("/a", None, Some("top")), "/a#top");
        assert_eq!(relative_target("/a", Some(""), Some("")), "/a");
    }

    #[test]
    fn test_inbound_target() {
        let uri: Uri = "http://example.com/v1/orders?status=open".parse().unwrap();
        assert_eq!(inbound_target(&uri), "/v1/orders?status=open");

        let uri: Uri = "/plain".parse().unwrap();
        assert_eq!(inbound_target(&uri), "/plain");
    }

    #[test]
    fn test_seed_headers_copies_all_values() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("proxy.local"));
        inbound.insert(header::CONTENT_LENGTH, HeaderValue::from_static("42"));
        inbound.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        inbound.append("x-tag", HeaderValue::from_static("a"));
        inbound.append("x-tag", HeaderValue::from_static("b"));

        let seeded = seed_headers(&inbound, None);
        assert!(seeded.get(header::HOST).is_none());
        assert!(seeded.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(seeded.get(header::CONTENT_TYPE).unwrap(), "text/plain");
        let tags: Vec<_> = seeded.get_all("x-tag").iter().collect();
        assert_eq!(tags, ["a", "b"]);

        let seeded = seed_headers(&inbound, Some(HeaderValue::from_static("application/json")));
        assert_eq!(seeded.get_all(header::CONTENT_TYPE).iter().count(), 1);
        assert_eq!(seeded.get(header::CONTENT_TYPE).unwrap(), "application/json");
    }
}
