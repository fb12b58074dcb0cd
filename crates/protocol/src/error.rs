//! Fehlertypen fuer das Dekodieren von Signaling-Anfragen

use thiserror::Error;

/// Fehler beim Dekodieren oder Validieren einer Anfrage
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Body ist kein gueltiges JSON
    #[error("Ungueltiges JSON: {0}")]
    UngueltigesJson(#[source] serde_json::Error),

    /// Pflichtfeld fehlt
    #[error("Feld '{0}' fehlt")]
    FehlendesFeld(&'static str),

    /// `messageType` ist keiner der bekannten Typen
    #[error("Unknown WebRTC message type: {0}")]
    UnbekannterTyp(String),

    /// Feld vorhanden, aber null oder leer
    #[error("Feld '{0}' ist leer")]
    LeererWert(&'static str),

    /// Struktur passt nicht (falscher Typ, ungueltiger Peer-Name, ...)
    #[error("Ungueltige Anfrage: {0}")]
    Ungueltig(String),
}

/// Result-Typ fuer das Protokoll-Crate
pub type ProtocolResult<T> = Result<T, ProtocolError>;
