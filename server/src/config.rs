//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{bail, Context};
use rendezvous_observability::logging::{log_format_gueltig, log_level_gueltig};
use serde::{Deserialize, Serialize};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Sitzungs-Einstellungen (Kapazitaet, Ablauf)
    pub sitzungen: SitzungsEinstellungen,
    /// REST-API-Einstellungen
    pub api: ApiEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Observability-Einstellungen (Metriken, Health)
    pub observability: ObservabilityEinstellungen,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer alle Listener
    pub bind_adresse: String,
    /// Port fuer die REST-API
    pub api_port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            api_port: 8000,
        }
    }
}

/// Sitzungs-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitzungsEinstellungen {
    /// Maximale Anzahl gleichzeitiger Sitzungen (0 = unbegrenzt)
    pub max_sitzungen: usize,
    /// Sitzungen ohne Aktivitaet werden nach dieser Zeit entfernt (0 = nie)
    pub max_inaktiv_sek: u64,
    /// Intervall des Aufraeum-Tasks
    pub aufraeum_intervall_sek: u64,
}

impl Default for SitzungsEinstellungen {
    fn default() -> Self {
        Self {
            max_sitzungen: 0,
            max_inaktiv_sek: 0,
            aufraeum_intervall_sek: 60,
        }
    }
}

impl SitzungsEinstellungen {
    /// Maximale Inaktivitaet, `None` wenn Ablauf deaktiviert ist
    pub fn max_inaktiv(&self) -> Option<Duration> {
        (self.max_inaktiv_sek > 0).then(|| Duration::from_secs(self.max_inaktiv_sek))
    }

    pub fn aufraeum_intervall(&self) -> Duration {
        Duration::from_secs(self.aufraeum_intervall_sek)
    }
}

/// REST-API-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEinstellungen {
    /// CORS-Origins fuer REST (leer = alle erlaubt)
    pub cors_origins: Vec<String>,
    /// Rate Limit pro Client-IP (0 = kein Limit)
    pub anfragen_pro_minute_ip: u32,
    /// Bearer-Token fuer /admin/* (nicht gesetzt = offen)
    pub admin_token: Option<String>,
    /// Client-IP fuer das Rate Limit aus `X-Forwarded-For` lesen.
    /// Nur hinter einem vertrauenswuerdigen Reverse-Proxy einschalten.
    pub forwarded_for_vertrauen: bool,
}

impl Default for ApiEinstellungen {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            anfragen_pro_minute_ip: 600,
            admin_token: None,
            forwarded_for_vertrauen: false,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Observability-Einstellungen (Metriken + Health-Check)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Aktiviert den Observability-Server
    pub aktiviert: bool,
    /// Port fuer Metriken und Health (Standard: 9300)
    pub port: u16,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self {
            aktiviert: true,
            port: 9300,
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => Self::aus_toml(&inhalt)
                .with_context(|| format!("Konfigurationsfehler in '{pfad}'"))?,
            // Warnung gibt main.rs aus, sobald das Logging steht
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => bail!("Konfigurationsdatei '{pfad}' nicht lesbar: {e}"),
        };
        config.validieren()?;
        Ok(config)
    }

    /// Parst eine Konfiguration aus einem TOML-String
    pub fn aus_toml(inhalt: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(inhalt)?)
    }

    /// Prueft Werte, die serde allein nicht abfangen kann
    pub fn validieren(&self) -> anyhow::Result<()> {
        if !log_level_gueltig(&self.logging.level) {
            bail!("Unbekanntes Log-Level '{}'", self.logging.level);
        }
        if !log_format_gueltig(&self.logging.format) {
            bail!("Unbekanntes Log-Format '{}'", self.logging.format);
        }
        self.bind_ip()?;
        if self.netzwerk.api_port == 0 {
            bail!("netzwerk.api_port darf nicht 0 sein");
        }
        if self.observability.aktiviert {
            if self.observability.port == 0 {
                bail!("observability.port darf nicht 0 sein");
            }
            if self.observability.port == self.netzwerk.api_port {
                bail!(
                    "observability.port und netzwerk.api_port sind beide {}",
                    self.netzwerk.api_port
                );
            }
        }
        if self.sitzungen.aufraeum_intervall_sek == 0 {
            bail!("sitzungen.aufraeum_intervall_sek darf nicht 0 sein");
        }
        Ok(())
    }

    fn bind_ip(&self) -> anyhow::Result<IpAddr> {
        self.netzwerk
            .bind_adresse
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse '{}'", self.netzwerk.bind_adresse))
    }

    /// Gibt die Bind-Adresse fuer den REST-Server zurueck
    pub fn api_bind_adresse(&self) -> anyhow::Result<SocketAddr> {
        Ok(SocketAddr::new(self.bind_ip()?, self.netzwerk.api_port))
    }

    /// Gibt die Bind-Adresse fuer den Observability-Server zurueck
    pub fn observability_bind_adresse(&self) -> anyhow::Result<SocketAddr> {
        Ok(SocketAddr::new(self.bind_ip()?, self.observability.port))
    }
}
