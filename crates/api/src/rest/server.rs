//! Axum HTTP-Server fuer die Signaling-API

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::Router;
use rendezvous_observability::{request_timing_layer, timing_middleware};
use tower_http::cors::{Any, CorsLayer};

use crate::rate_limit::RateLimiter;
use crate::rest::middleware::{rate_limit_middleware, RateLimitState};
use crate::rest::{routes, ApiState};

/// REST-Server-Konfiguration
#[derive(Debug, Clone)]
pub struct RestServerKonfig {
    pub bind_addr: SocketAddr,
    /// Erlaubte CORS-Origins. Leer = alle Origins erlaubt.
    pub cors_origins: Vec<String>,
}

impl Default for RestServerKonfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            cors_origins: vec![],
        }
    }
}

/// CORS entweder fuer die konfigurierten Origins oder fuer alle
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(wert) => Some(wert),
            Err(_) => {
                tracing::warn!(origin = %o, "Ungueltiger CORS-Origin ignoriert");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Baut den vollstaendigen Router inklusive aller Layer
///
/// Reihenfolge von aussen nach innen: CORS, Trace, Timing, Rate Limit.
pub fn app(state: ApiState, rate_limiter: Arc<RateLimiter>, cors_origins: &[String]) -> Router {
    let rls = RateLimitState {
        limiter: rate_limiter,
    };

    routes::router()
        .layer(middleware::from_fn_with_state(rls, rate_limit_middleware))
        .layer(middleware::from_fn_with_state(
            state.metriken.clone(),
            timing_middleware,
        ))
        .layer(request_timing_layer())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Axum HTTP-Server fuer die Signaling-API
pub struct RestServer {
    konfig: RestServerKonfig,
}

impl RestServer {
    pub fn neu(konfig: RestServerKonfig) -> Self {
        Self { konfig }
    }

    /// Startet den REST-Server und laeuft bis `shutdown` abgeschlossen ist
    pub async fn starten(
        self,
        state: ApiState,
        rate_limiter: Arc<RateLimiter>,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let app = app(state, rate_limiter, &self.konfig.cors_origins);

        let listener = tokio::net::TcpListener::bind(self.konfig.bind_addr).await?;
        tracing::info!(addr = %self.konfig.bind_addr, "REST-Server gestartet");

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        tracing::info!("REST-Server beendet");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimitKonfig;
    use crate::rest::handlers::test_hilfen::{json_body, state};
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    fn limiter(pro_minute: u32) -> Arc<RateLimiter> {
        RateLimiter::neu(RateLimitKonfig {
            anfragen_pro_minute_ip: pro_minute,
            ..Default::default()
        })
    }

    fn anfrage_von(ip: &str, weitergeleitet: &str) -> Request<Body> {
        let mut req = Request::get("/")
            .header("x-forwarded-for", weitergeleitet)
            .body(Body::empty())
            .unwrap();
        let addr: SocketAddr = format!("{ip}:40000").parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        req
    }

    #[tokio::test]
    async fn ablauf_ueber_router() {
        let state = state();
        let app = app(state.clone(), limiter(0), &[]);

        let response = app
            .clone()
            .oneshot(
                Request::post("/webrtc")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"messageType": "offer", "peerName": "alice", "payload": {"sdp": "o"}})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::get("/webrtc/offer")
                    .header("peerName", "alice")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let wert = json_body(response).await;
        assert_eq!(wert["clientName"], "alice_client");

        let response = app
            .oneshot(
                Request::get("/webrtc/answer?peerName=alice_client")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        assert_eq!(
            state
                .metriken
                .http_requests_total
                .with_label_values(&["GET", "/webrtc/answer", "202"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn rate_limit_liefert_429() {
        let app = app(state(), limiter(2), &[]);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(Request::get("/").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let wert = json_body(response).await;
        assert_eq!(wert["code"], "RATE_LIMITED");
        assert!(wert["retry_after_secs"].as_u64().unwrap() >= 1);
    }

    #[tokio::test]
    async fn wechselnder_forwarded_for_umgeht_limit_nicht() {
        let limiter = limiter(2);
        let app = app(state(), Arc::clone(&limiter), &[]);

        let mut erlaubt = 0;
        for i in 0..20 {
            let response = app
                .clone()
                .oneshot(anfrage_von("10.0.0.7", &format!("203.0.113.{i}")))
                .await
                .unwrap();
            if response.status() == StatusCode::OK {
                erlaubt += 1;
            } else {
                assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
            }
        }
        assert_eq!(erlaubt, 2);
        assert_eq!(limiter.anzahl_buckets(), 1);
    }

    #[tokio::test]
    async fn forwarded_for_zaehlt_hinter_proxy() {
        let limiter = RateLimiter::neu(RateLimitKonfig {
            anfragen_pro_minute_ip: 2,
            forwarded_for_vertrauen: true,
            ..Default::default()
        });
        let app = app(state(), Arc::clone(&limiter), &[]);

        for i in 0..5 {
            let response = app
                .clone()
                .oneshot(anfrage_von("10.0.0.1", &format!("203.0.113.{i}")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert_eq!(limiter.anzahl_buckets(), 5);
    }

    #[tokio::test]
    async fn cors_preflight_erlaubt() {
        let app = app(state(), limiter(0), &["http://localhost:3000".to_string()]);
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/webrtc")
                    .header("origin", "http://localhost:3000")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "http://localhost:3000"
        );
    }
}
