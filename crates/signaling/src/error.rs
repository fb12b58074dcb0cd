//! Fehlertypen fuer die Signaling-Registry

use rendezvous_core::{PeerName, RendezvousError};
use thiserror::Error;

/// In welcher Rolle nach einem Namen gesucht wurde
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suche {
    /// Nur Host-Namen
    Host,
    /// Nur Client-Namen
    Client,
    /// Host-Namen, danach Client-Namen
    Peer,
}

impl std::fmt::Display for Suche {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host => f.write_str("Host"),
            Self::Client => f.write_str("Client"),
            Self::Peer => f.write_str("Peer"),
        }
    }
}

/// Fehlertyp fuer Registry-Operationen
///
/// Alle Varianten sind erwartbare Ergebnisse einer Anfrage und werden dem
/// Aufrufer typisiert zurueckgegeben.
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Kein Eintrag fuer den Namen in der gesuchten Rolle
    #[error("Keine Sitzung fuer {suche} '{name}'")]
    NichtGefunden { suche: Suche, name: PeerName },

    /// Sitzung existiert, aber die Answer ist noch nicht eingetroffen
    #[error("Answer fuer Client '{client}' liegt noch nicht vor")]
    NochNichtBereit { client: PeerName },

    /// Name ist bereits von einer aktiven Sitzung belegt (als Host oder Client)
    #[error("Name '{name}' ist bereits vergeben")]
    Konflikt { name: PeerName },

    /// Maximale Sitzungsanzahl erreicht
    #[error("Registry ist voll: maximal {max} Sitzungen")]
    Kapazitaet { max: usize },

    /// Name ungueltig (z.B. durch das Client-Suffix zu lang geworden)
    #[error(transparent)]
    Validierung(#[from] RendezvousError),
}

impl SignalingError {
    pub(crate) fn nicht_gefunden(suche: Suche, name: &PeerName) -> Self {
        Self::NichtGefunden {
            suche,
            name: name.clone(),
        }
    }
}

/// Result-Typ fuer die Signaling-Registry
pub type SignalingResult<T> = Result<T, SignalingError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PeerName {
        PeerName::neu(s).unwrap()
    }

    #[test]
    fn fehler_anzeige() {
        let e = SignalingError::nicht_gefunden(Suche::Host, &name("alice"));
        assert_eq!(e.to_string(), "Keine Sitzung fuer Host 'alice'");

        let e = SignalingError::Konflikt { name: name("bob") };
        assert!(e.to_string().contains("bob"));
    }
}
