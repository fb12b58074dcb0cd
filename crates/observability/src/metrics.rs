//! Prometheus-kompatible Metriken fuer Rendezvous
//!
//! Registrierte Metriken:
//! - `rendezvous_sessions_active` – Gauge: Aktive Sitzungen
//! - `rendezvous_sessions_created_total` – Counter: Angelegte Sitzungen
//! - `rendezvous_sessions_expired_total` – Counter: Wegen Inaktivitaet entfernte Sitzungen
//! - `rendezvous_answers_total` – Counter: Gesetzte Answers
//! - `rendezvous_candidates_submitted_total` – Counter: Gemeldete Kandidaten
//! - `rendezvous_candidates_delivered_total` – Counter: Ausgelieferte Kandidaten
//! - `rendezvous_lookup_failures_total` – Counter: Fehlgeschlagene Suchen (operation)
//! - `rendezvous_http_requests_total` – Counter: HTTP-Anfragen (method, path, status)
//! - `rendezvous_http_request_duration_seconds` – Histogram: HTTP-Antwortzeit

use anyhow::Result;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Alle Rendezvous-Prometheus-Metriken
///
/// Wird einmal beim Start erstellt und per Clone an REST-Server und
/// Observability-Server verteilt. Alle Clones zaehlen in dieselbe Registry.
#[derive(Clone)]
pub struct RendezvousMetrics {
    pub registry: Arc<Registry>,

    // Sitzungs-Metriken
    pub sessions_active: IntGauge,
    pub sessions_created_total: IntCounter,
    pub sessions_expired_total: IntCounter,
    pub answers_total: IntCounter,
    pub candidates_submitted_total: IntCounter,
    pub candidates_delivered_total: IntCounter,
    pub lookup_failures_total: IntCounterVec,

    // HTTP-Metriken
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
}

impl RendezvousMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        // --- Sitzungs-Metriken ---
        let sessions_active = IntGauge::with_opts(Opts::new(
            "rendezvous_sessions_active",
            "Anzahl aktiver Sitzungen",
        ))?;
        registry.register(Box::new(sessions_active.clone()))?;

        let sessions_created_total = IntCounter::with_opts(Opts::new(
            "rendezvous_sessions_created_total",
            "Gesamtanzahl angelegter Sitzungen",
        ))?;
        registry.register(Box::new(sessions_created_total.clone()))?;

        let sessions_expired_total = IntCounter::with_opts(Opts::new(
            "rendezvous_sessions_expired_total",
            "Wegen Inaktivitaet entfernte Sitzungen",
        ))?;
        registry.register(Box::new(sessions_expired_total.clone()))?;

        let answers_total = IntCounter::with_opts(Opts::new(
            "rendezvous_answers_total",
            "Gesamtanzahl gesetzter Answers",
        ))?;
        registry.register(Box::new(answers_total.clone()))?;

        let candidates_submitted_total = IntCounter::with_opts(Opts::new(
            "rendezvous_candidates_submitted_total",
            "Gesamtanzahl gemeldeter Verbindungskandidaten",
        ))?;
        registry.register(Box::new(candidates_submitted_total.clone()))?;

        let candidates_delivered_total = IntCounter::with_opts(Opts::new(
            "rendezvous_candidates_delivered_total",
            "Gesamtanzahl ausgelieferter Verbindungskandidaten",
        ))?;
        registry.register(Box::new(candidates_delivered_total.clone()))?;

        let lookup_failures_total = IntCounterVec::new(
            Opts::new(
                "rendezvous_lookup_failures_total",
                "Suchen nach unbekannten Peer-Namen",
            ),
            &["operation"],
        )?;
        registry.register(Box::new(lookup_failures_total.clone()))?;

        // --- HTTP-Metriken ---
        let http_requests_total = IntCounterVec::new(
            Opts::new(
                "rendezvous_http_requests_total",
                "Gesamtanzahl HTTP-Anfragen",
            ),
            &["method", "path", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "rendezvous_http_request_duration_seconds",
                "HTTP-Antwortzeit in Sekunden",
            )
            .buckets(vec![
                0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
            ]),
            &["method", "path"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            sessions_active,
            sessions_created_total,
            sessions_expired_total,
            answers_total,
            candidates_submitted_total,
            candidates_delivered_total,
            lookup_failures_total,
            http_requests_total,
            http_request_duration_seconds,
        })
    }

    /// Zaehlt eine fehlgeschlagene Suche fuer die angegebene Operation
    pub fn suche_fehlgeschlagen(&self, operation: &str) {
        self.lookup_failures_total
            .with_label_values(&[operation])
            .inc();
    }

    /// Zaehlt eine abgeschlossene HTTP-Anfrage
    pub fn http_anfrage(&self, methode: &str, pfad: &str, status: u16, dauer_sek: f64) {
        self.http_requests_total
            .with_label_values(&[methode, pfad, &status.to_string()])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[methode, pfad])
            .observe(dauer_sek);
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: RendezvousMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<RendezvousMetrics>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
