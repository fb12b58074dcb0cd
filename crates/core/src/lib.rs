//! rendezvous-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die Bausteine bereit, die Protokoll, Registry und
//! HTTP-Schicht gemeinsam nutzen: validierte Peer-Namen, Sitzungs-IDs und
//! den opaken Payload-Typ.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{RendezvousError, Result};
pub use types::{Payload, PeerName, SessionId};
