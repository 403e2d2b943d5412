use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use std::net::SocketAddr;

// every client we can't identify shares this bucket
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Default)]
pub struct TransportMetadata {
    pub forwarded_for: Option<String>,
    pub peer: Option<SocketAddr>,
}

impl TransportMetadata {
    pub fn new(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let forwarded_for = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            forwarded_for,
            peer,
        }
    }

    pub fn from_request<B>(req: &Request<B>) -> Self {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0);
        Self::new(req.headers(), peer)
    }
}

// First X-Forwarded-For hop, then peer IP, then UNKNOWN_CLIENT.
// XFF is client-controlled unless the edge proxy overwrites it; fairness only, not security.
pub fn resolve_identity(metadata: &TransportMetadata) -> String {
    if let Some(xff) = metadata.forwarded_for.as_deref() {
        if let Some(first) = xff.split(',').next().map(str::trim) {
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    match metadata.peer {
        Some(addr) => addr.ip().to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some("192.168.1.20:51234".parse().unwrap())
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("  203.0.113.7 , 10.0.0.1, 10.0.0.2"),
        );

        let metadata = TransportMetadata::new(&headers, peer());
        assert_eq!(resolve_identity(&metadata), "203.0.113.7");
    }

    #[test]
    fn test_forwarded_for_is_not_parsed_as_ip() {
        let metadata = TransportMetadata {
            forwarded_for: Some("client-abc".to_string()),
            peer: None,
        };
        assert_eq!(resolve_identity(&metadata), "client-abc");
    }

    #[test]
    fn test_falls_back_to_peer_ip_without_port() {
        let metadata = TransportMetadata::new(&HeaderMap::new(), peer());
        assert_eq!(resolve_identity(&metadata), "192.168.1.20");
    }

    #[test]
    fn test_empty_first_hop_falls_back_to_peer() {
        let metadata = TransportMetadata {
            forwarded_for: Some(" , 10.0.0.1".to_string()),
            peer: peer(),
        };
        assert_eq!(resolve_identity(&metadata), "192.168.1.20");
    }

    #[test]
    fn test_unknown_clients_share_a_bucket() {
        let metadata = TransportMetadata::default();
        assert_eq!(resolve_identity(&metadata), UNKNOWN_CLIENT);
    }
}
