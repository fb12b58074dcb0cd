//! Axum-Middleware und Hilfsfunktionen fuer Header-Auswertung

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use rendezvous_core::PeerName;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::rate_limit::RateLimiter;

/// Header, in dem der Browser-Client den Peer-Namen mitschickt
pub const PEER_NAME_HEADER: &str = "peername";

/// Query-Parameter als Alternative zum Header
#[derive(Debug, Default, Deserialize)]
pub struct PeerQuery {
    #[serde(rename = "peerName")]
    pub peer_name: Option<String>,
}

/// Extrahiert die Client-IP
///
/// `X-Forwarded-For` zaehlt nur mit `forwarded_for_vertrauen`, sonst kann
/// jeder Client seinen Bucket frei waehlen. Standard ist die Socket-Adresse.
pub fn client_ip(
    headers: &HeaderMap,
    verbindung: Option<SocketAddr>,
    forwarded_for_vertrauen: bool,
) -> String {
    let weitergeleitet = forwarded_for_vertrauen
        .then(|| headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    weitergeleitet
        .or_else(|| verbindung.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Extrahiert Bearer-Token aus Authorization-Header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

/// Liest den Peer-Namen aus Header oder Query-Parameter; der Header gewinnt
pub fn peer_name_aus_anfrage(headers: &HeaderMap, query: &PeerQuery) -> ApiResult<PeerName> {
    let roh = match headers.get(PEER_NAME_HEADER) {
        Some(wert) => wert
            .to_str()
            .map_err(|_| ApiError::UngueltigeAnfrage("Header 'peerName' ist kein gueltiger Text".into()))?
            .to_string(),
        None => query
            .peer_name
            .clone()
            .ok_or_else(|| ApiError::UngueltigeAnfrage("peerName fehlt".into()))?,
    };
    PeerName::neu(roh).map_err(|e| ApiError::UngueltigeAnfrage(e.to_string()))
}

/// Axum-State der den RateLimiter enthaelt (fuer die Middleware)
#[derive(Clone)]
pub struct RateLimitState {
    pub limiter: Arc<RateLimiter>,
}

/// Axum-Middleware: Rate Limiting per IP
pub async fn rate_limit_middleware(
    State(rls): State<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let verbindung = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(
        req.headers(),
        verbindung,
        rls.limiter.forwarded_for_vertrauen(),
    );

    match rls.limiter.pruefe_ip(&ip) {
        Ok(()) => next.run(req).await,
        Err(retry_after_secs) => {
            tracing::warn!(ip = %ip, retry_after_secs, "Rate-Limit ueberschritten");
            ApiError::RateLimitUeberschritten { retry_after_secs }.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_ip_aus_x_forwarded_for_hinter_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );
        let addr: SocketAddr = "10.0.0.1:443".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(addr), true), "192.168.1.1");
    }

    #[test]
    fn x_forwarded_for_ohne_vertrauen_ignoriert() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4"));
        let addr: SocketAddr = "10.1.2.3:5555".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(addr), false), "10.1.2.3");
        assert_eq!(client_ip(&headers, None, false), "unknown");
    }

    #[test]
    fn client_ip_aus_socket() {
        let headers = HeaderMap::new();
        let addr: SocketAddr = "10.1.2.3:5555".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(addr), true), "10.1.2.3");
        assert_eq!(client_ip(&headers, None, false), "unknown");
    }

    #[test]
    fn bearer_token_extrahieren() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            HeaderValue::from_static("Bearer mein_token_123"),
        );
        assert_eq!(bearer_token(&headers), Some("mein_token_123"));
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn peer_name_header_gewinnt() {
        let mut headers = HeaderMap::new();
        headers.insert(PEER_NAME_HEADER, HeaderValue::from_static("aus-header"));
        let query = PeerQuery {
            peer_name: Some("aus-query".into()),
        };
        assert_eq!(
            peer_name_aus_anfrage(&headers, &query).unwrap().as_str(),
            "aus-header"
        );
    }

    #[test]
    fn peer_name_aus_query() {
        let query = PeerQuery {
            peer_name: Some("alice".into()),
        };
        assert_eq!(
            peer_name_aus_anfrage(&HeaderMap::new(), &query)
                .unwrap()
                .as_str(),
            "alice"
        );
    }

    #[test]
    fn peer_name_fehlt_oder_leer() {
        let fehler = peer_name_aus_anfrage(&HeaderMap::new(), &PeerQuery::default()).unwrap_err();
        assert!(matches!(fehler, ApiError::UngueltigeAnfrage(_)));

        let query = PeerQuery {
            peer_name: Some("   ".into()),
        };
        assert!(peer_name_aus_anfrage(&HeaderMap::new(), &query).is_err());
    }
}
