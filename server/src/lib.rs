//! rendezvous-server – Bibliotheks-Root
//!
//! Verdrahtet Registry, Metriken, REST-Server, Observability-Server und den
//! Aufraeum-Task. Die Registry wird hier einmal erstellt und an alle
//! Subsysteme uebergeben.

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use config::ServerConfig;
use rendezvous_api::{ApiState, RateLimitKonfig, RateLimiter, RestServer, RestServerKonfig};
use rendezvous_observability::{observability_server_starten, HealthState, RendezvousMetrics};
use rendezvous_signaling::{RegistryKonfig, SignalingRegistry};
use tokio::sync::watch;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Registry und Metriken erstellen
    /// 2. Observability-Server starten (falls aktiviert)
    /// 3. Aufraeum-Task starten
    /// 4. REST-API starten
    /// 5. Auf Ctrl-C warten, dann alle Subsysteme beenden
    pub async fn starten(self) -> Result<()> {
        let api_addr = self.config.api_bind_adresse()?;

        let registry = SignalingRegistry::mit_konfig(RegistryKonfig {
            max_sitzungen: self.config.sitzungen.max_sitzungen,
        });
        let metriken = RendezvousMetrics::neu()?;
        let zaehler = registry.clone();
        let health = HealthState::neu(Arc::new(move || zaehler.anzahl()));
        let rate_limiter = RateLimiter::neu(RateLimitKonfig {
            anfragen_pro_minute_ip: self.config.api.anfragen_pro_minute_ip,
            forwarded_for_vertrauen: self.config.api.forwarded_for_vertrauen,
            ..Default::default()
        });

        tracing::info!(
            api = %api_addr,
            max_sitzungen = self.config.sitzungen.max_sitzungen,
            max_inaktiv_sek = self.config.sitzungen.max_inaktiv_sek,
            rate_limit = self.config.api.anfragen_pro_minute_ip,
            admin_geschuetzt = self.config.api.admin_token.is_some(),
            forwarded_for = self.config.api.forwarded_for_vertrauen,
            "Server startet"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let observability = if self.config.observability.aktiviert {
            let addr = self.config.observability_bind_adresse()?;
            let server = observability_server_starten(
                addr,
                metriken.clone(),
                health.clone(),
                shutdown_abwarten(shutdown_rx.clone()),
            );
            Some(tokio::spawn(async move {
                if let Err(e) = server.await {
                    tracing::error!("Observability-Server fehlgeschlagen: {e:#}");
                }
            }))
        } else {
            tracing::info!("Observability-Server deaktiviert");
            None
        };

        let aufraeumer = tokio::spawn(aufraeum_task(
            registry.clone(),
            Arc::clone(&rate_limiter),
            metriken.clone(),
            self.config.sitzungen.max_inaktiv(),
            self.config.sitzungen.aufraeum_intervall(),
            shutdown_rx.clone(),
        ));

        let state = ApiState::neu(
            registry.clone(),
            metriken,
            health,
            self.config.api.admin_token.clone(),
        );
        let rest = RestServer::neu(RestServerKonfig {
            bind_addr: api_addr,
            cors_origins: self.config.api.cors_origins.clone(),
        });

        let ergebnis = rest
            .starten(state, rate_limiter, async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => tracing::info!("Shutdown-Signal empfangen, Server wird beendet"),
                    Err(e) => tracing::error!("Ctrl-C-Handler fehlgeschlagen: {e}"),
                }
                let _ = shutdown_tx.send(true);
            })
            .await;

        // Der Sender ist jetzt entweder gesetzt oder verworfen; beides beendet die Tasks
        if !*shutdown_rx.borrow() {
            tracing::warn!("REST-Server unerwartet beendet, stoppe restliche Subsysteme");
        }
        if let Some(task) = observability {
            let _ = task.await;
        }
        let _ = aufraeumer.await;

        let verworfen = registry.zuruecksetzen();
        tracing::info!(verworfen, "Server beendet");

        ergebnis
    }
}

/// Wartet bis das Shutdown-Signal gesetzt ist
async fn shutdown_abwarten(mut rx: watch::Receiver<bool>) {
    // Fehler heisst: Sender weg, also ebenfalls beenden
    let _ = rx.wait_for(|&stop| stop).await;
}

/// Ein Aufraeum-Durchlauf: inaktive Sitzungen und Rate-Limit-Buckets entfernen
///
/// Gibt die Anzahl der entfernten Sitzungen zurueck.
pub fn aufraeum_durchlauf(
    registry: &SignalingRegistry,
    rate_limiter: &RateLimiter,
    metriken: &RendezvousMetrics,
    max_inaktiv: Option<Duration>,
) -> usize {
    let entfernt = match max_inaktiv {
        Some(max) => registry.abgelaufene_entfernen(max),
        None => 0,
    };
    if entfernt > 0 {
        metriken.sessions_expired_total.inc_by(entfernt as u64);
    }
    metriken.sessions_active.set(registry.anzahl() as i64);

    let buckets = rate_limiter.cleanup();
    if buckets > 0 {
        tracing::debug!(anzahl = buckets, "Inaktive Rate-Limit-Buckets entfernt");
    }
    entfernt
}

async fn aufraeum_task(
    registry: SignalingRegistry,
    rate_limiter: Arc<RateLimiter>,
    metriken: RendezvousMetrics,
    max_inaktiv: Option<Duration>,
    intervall: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(intervall);
    // Erster Tick kommt sofort
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                aufraeum_durchlauf(&registry, &rate_limiter, &metriken, max_inaktiv);
            }
            _ = shutdown.wait_for(|&stop| stop) => break,
        }
    }
    tracing::debug!("Aufraeum-Task beendet");
}
