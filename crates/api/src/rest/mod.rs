//! REST-Interface fuer den Signaling-Austausch

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

use std::sync::Arc;

use rendezvous_observability::{HealthState, RendezvousMetrics};
use rendezvous_signaling::{SignalingError, SignalingRegistry};

use crate::error::ApiError;

/// Axum-State fuer den REST-Server
///
/// Die Registry wird von aussen uebergeben; der State haelt nur Handles.
#[derive(Clone)]
pub struct ApiState {
    pub registry: SignalingRegistry,
    pub metriken: RendezvousMetrics,
    pub health: HealthState,
    /// Wenn gesetzt, verlangen die Admin-Endpunkte diesen Bearer-Token
    pub admin_token: Option<Arc<str>>,
}

impl ApiState {
    pub fn neu(
        registry: SignalingRegistry,
        metriken: RendezvousMetrics,
        health: HealthState,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            registry,
            metriken,
            health,
            admin_token: admin_token.map(Arc::from),
        }
    }

    /// Gleicht den Gauge der aktiven Sitzungen mit der Registry ab
    pub fn sitzungen_zaehlen(&self) {
        self.metriken
            .sessions_active
            .set(self.registry.anzahl() as i64);
    }

    /// Uebersetzt einen Registry-Fehler und zaehlt fehlgeschlagene Suchen
    pub(crate) fn fehlschlag(
        &self,
        operation: &str,
        fehler: SignalingError,
        nicht_gefunden: &'static str,
    ) -> ApiError {
        if matches!(fehler, SignalingError::NichtGefunden { .. }) {
            self.metriken.suche_fehlgeschlagen(operation);
        }
        ApiError::aus_signaling(fehler, nicht_gefunden)
    }
}

pub use server::{RestServer, RestServerKonfig};
