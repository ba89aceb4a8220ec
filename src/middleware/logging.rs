use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::{self, Next},
    response::Response,
    Router,
};
use tracing::debug;

use crate::logger::Logger;

pub const FORWARDED_FOR: &str = "x-forwarded-for";

const IPV6_LOOPBACK: &str = "::1";
const IPV4_LOOPBACK: &str = "127.0.0.1";

/// Wrap every route of `router` with [`request_logging`].
pub fn wrap<S>(logger: Arc<Logger>, router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(logger, request_logging))
}

/// Emits one `HTTP` line per request, then hands the request on untouched.
///
/// The remote address comes from axum's `ConnectInfo<SocketAddr>`, so the
/// service must be built with `into_make_service_with_connect_info` (or
/// `MockConnectInfo` in tests) for the transport fallback to apply.
pub async fn request_logging(
    State(logger): State<Arc<Logger>>,
    request: Request,
    next: Next,
) -> Response {
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string());
    let client_ip = resolve_client_ip(request.headers(), remote.as_deref());

    logger.http(&format!(
        "HTTP request: {} {}",
        request.method(),
        request.uri().path()
    ));
    debug!(
        method = %request.method(),
        path = request.uri().path(),
        client_ip = %client_ip,
        "Logged inbound request"
    );

    next.run(request).await
}

/// Best guess at the originating client address.
///
/// A non-empty `X-Forwarded-For` header wins: its first entry, trimmed, is
/// returned as-is, even when empty or not an address. The header is
/// client-controlled and can be spoofed. Otherwise the transport address is
/// used without its port. IPv6 loopback is reported as `127.0.0.1`.
pub fn resolve_client_ip(headers: &HeaderMap, remote_addr: Option<&str>) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .filter(|value| !value.is_empty())
        .map(|value| String::from_utf8_lossy(value.as_bytes()));

    let ip = match (forwarded, remote_addr) {
        (Some(value), _) => value
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string(),
        (None, Some(addr)) => strip_port(addr),
        (None, None) => return "unknown".to_string(),
    };

    if ip == IPV6_LOOPBACK {
        IPV4_LOOPBACK.to_string()
    } else {
        ip
    }
}

/// Drop a trailing `:port` from a transport address.
///
/// Bracketed IPv6 (`[::1]:8080`) loses its brackets; a bare IPv6 literal
/// with no port is returned unchanged.
pub fn strip_port(addr: &str) -> String {
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return socket.ip().to_string();
    }

    if let Some(rest) = addr.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            return rest[..end].to_string();
        }
    }

    match addr.rsplit_once(':') {
        Some((host, _)) if !host.contains(':') => host.to_string(),
        _ => addr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn forwarded(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_forwarded_for_first_hop() {
        let headers = forwarded("203.0.113.5, 10.0.0.1");
        assert_eq!(
            resolve_client_ip(&headers, Some("192.168.1.10:54321")),
            "203.0.113.5"
        );
    }

    #[test]
    fn test_forwarded_for_is_not_validated() {
        let headers = forwarded(" not-an-ip ,10.0.0.1");
        assert_eq!(resolve_client_ip(&headers, None), "not-an-ip");
    }

    #[test]
    fn test_empty_forwarded_for_falls_back() {
        let headers = forwarded("");
        assert_eq!(
            resolve_client_ip(&headers, Some("192.168.1.10:54321")),
            "192.168.1.10"
        );
    }

    #[test]
    fn test_empty_first_hop_is_passed_through() {
        let remote = Some("192.168.1.10:54321");

        assert_eq!(resolve_client_ip(&forwarded(", 10.0.0.1"), remote), "");
        assert_eq!(resolve_client_ip(&forwarded("   "), remote), "");
    }

    #[test]
    fn test_non_utf8_forwarded_for_is_passed_through() {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR,
            HeaderValue::from_bytes(b"10.0.0.\xff, 10.0.0.1").unwrap(),
        );

        assert_eq!(
            resolve_client_ip(&headers, Some("192.168.1.10:54321")),
            "10.0.0.\u{fffd}"
        );
    }

    #[test]
    fn test_remote_addr_without_header() {
        let headers = HeaderMap::new();
        assert_eq!(
            resolve_client_ip(&headers, Some("192.168.1.10:54321")),
            "192.168.1.10"
        );
        assert_eq!(resolve_client_ip(&headers, Some("[::1]:8080")), "127.0.0.1");
        assert_eq!(resolve_client_ip(&headers, Some("::1")), "127.0.0.1");
        assert_eq!(resolve_client_ip(&headers, None), "unknown");
    }

    #[test]
    fn test_forwarded_loopback_is_normalized() {
        let headers = forwarded("::1, 10.0.0.1");
        assert_eq!(resolve_client_ip(&headers, None), "127.0.0.1");
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("10.0.0.2:1234"), "10.0.0.2");
        assert_eq!(strip_port("[2001:db8::1]:443"), "2001:db8::1");
        assert_eq!(strip_port("[fe80::1%eth0]:80"), "fe80::1%eth0");
        assert_eq!(strip_port("localhost:80"), "localhost");
        assert_eq!(strip_port("2001:db8::1"), "2001:db8::1");
        assert_eq!(strip_port("10.0.0.2"), "10.0.0.2");
    }
}
