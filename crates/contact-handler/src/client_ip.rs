//! Client identification for rate limiting

use axum::http::HeaderMap;
use std::net::SocketAddr;

/// Key used when no client identity is available
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Pick the rate-limit key for a request.
///
/// Proxy headers win over the socket peer. The `x-forwarded-for` value is
/// used as sent, so a chain of proxies yields one combined key.
pub fn client_identifier(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    ["x-forwarded-for", "x-real-ip"]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.7:51234".parse().unwrap())
    }

    #[test]
    fn test_forwarded_for_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 203.0.113.9, 10.0.0.1 "));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_identifier(&headers, peer()), "203.0.113.9, 10.0.0.1");
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.4"));
        assert_eq!(client_identifier(&headers, peer()), "198.51.100.4");
    }

    #[test]
    fn test_peer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  "));
        assert_eq!(client_identifier(&headers, peer()), "10.0.0.7");
    }

    #[test]
    fn test_unknown_without_identity() {
        assert_eq!(client_identifier(&HeaderMap::new(), None), UNKNOWN_CLIENT);
    }
}
