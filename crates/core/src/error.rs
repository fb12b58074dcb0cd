//! Fehlertypen fuer Rendezvous
//!
//! Zentraler Fehler-Enum fuer Pruefungen, die Protokoll, Registry und
//! HTTP-Schicht gemeinsam nutzen.

use thiserror::Error;

/// Globaler Result-Alias fuer Rendezvous
pub type Result<T> = std::result::Result<T, RendezvousError>;

/// Allgemeine Fehler im Rendezvous-System
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RendezvousError {
    /// Eingabe verletzt eine Formatregel (z.B. leerer Peer-Name)
    #[error("Ungueltige Eingabe: {0}")]
    Validierung(String),
}

impl RendezvousError {
    /// Erstellt einen Validierungsfehler
    pub fn validierung(msg: impl Into<String>) -> Self {
        Self::Validierung(msg.into())
    }
}
