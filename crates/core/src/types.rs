//! Gemeinsame Identifikationstypen fuer Rendezvous
//!
//! Peer-Namen und Sitzungs-IDs verwenden das Newtype-Pattern, damit ein
//! roher String nie versehentlich als validierter Name durchgereicht wird.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RendezvousError;

/// Opaker Nutzdaten-Blob (Offer, Answer, Kandidat)
///
/// Der Dienst interpretiert den Inhalt nie, er speichert und liefert ihn nur aus.
pub type Payload = serde_json::Value;

/// Maximale Laenge eines Peer-Namens in Bytes
pub const PEER_NAME_MAX_LAENGE: usize = 256;

// ---------------------------------------------------------------------------
// PeerName
// ---------------------------------------------------------------------------

/// Validierter Name eines Peers (Host oder Client)
///
/// Nicht leer (nach Trimmen), hoechstens [`PEER_NAME_MAX_LAENGE`] Bytes,
/// keine Steuerzeichen. Deserialisierung laeuft durch dieselbe Pruefung.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeerName(String);

impl PeerName {
    /// Erstellt einen Peer-Namen nach Validierung
    pub fn neu(name: impl Into<String>) -> Result<Self, RendezvousError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RendezvousError::validierung("Peer-Name ist leer"));
        }
        if name.len() > PEER_NAME_MAX_LAENGE {
            return Err(RendezvousError::validierung(format!(
                "Peer-Name zu lang: {} Bytes (max {PEER_NAME_MAX_LAENGE})",
                name.len()
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(RendezvousError::validierung(
                "Peer-Name enthaelt Steuerzeichen",
            ));
        }
        Ok(Self(name))
    }

    /// Haengt ein Suffix an und validiert das Ergebnis erneut
    pub fn mit_suffix(&self, suffix: &str) -> Result<Self, RendezvousError> {
        Self::neu(format!("{}{}", self.0, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PeerName {
    type Error = RendezvousError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::neu(value)
    }
}

impl From<PeerName> for String {
    fn from(name: PeerName) -> Self {
        name.0
    }
}

impl std::str::FromStr for PeerName {
    type Err = RendezvousError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::neu(s)
    }
}

impl AsRef<str> for PeerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PeerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Eindeutige Sitzungs-ID
///
/// Unterscheidet Sitzungen, die denselben Host-Namen nach einem Reset
/// wiederverwenden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Erstellt eine neue zufaellige SessionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peer_name_gueltig() {
        let name = PeerName::neu("alice").unwrap();
        assert_eq!(name.as_str(), "alice");
        assert_eq!(name.to_string(), "alice");
    }

    #[test]
    fn peer_name_leer_abgelehnt() {
        assert!(PeerName::neu("").is_err());
        assert!(PeerName::neu("   ").is_err());
    }

    #[test]
    fn peer_name_zu_lang_abgelehnt() {
        let lang = "x".repeat(PEER_NAME_MAX_LAENGE + 1);
        assert!(PeerName::neu(lang).is_err());
        assert!(PeerName::neu("x".repeat(PEER_NAME_MAX_LAENGE)).is_ok());
    }

    #[test]
    fn peer_name_steuerzeichen_abgelehnt() {
        assert!(PeerName::neu("ali\nce").is_err());
        assert!(PeerName::neu("bob\u{0}").is_err());
    }

    #[test]
    fn peer_name_mit_suffix() {
        let host = PeerName::neu("alice").unwrap();
        assert_eq!(host.mit_suffix("_client").unwrap().as_str(), "alice_client");
    }

    #[test]
    fn peer_name_serde_validiert() {
        let name: PeerName = serde_json::from_str("\"bob\"").unwrap();
        assert_eq!(name.as_str(), "bob");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"bob\"");

        assert!(serde_json::from_str::<PeerName>("\"\"").is_err());
    }

    #[test]
    fn session_id_eindeutig() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b, "Zwei neue SessionIds muessen verschieden sein");
    }

    #[test]
    fn session_id_display() {
        let id = SessionId(Uuid::nil());
        assert!(id.to_string().starts_with("session:"));
    }
}
