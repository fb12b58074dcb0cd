//! rendezvous-signaling – Sitzungs-Registry fuer den WebRTC-Austausch
//!
//! Dieser Crate haelt alle aktiven Sitzungen im Speicher. Eine Sitzung
//! verbindet einen Host mit genau einem Client und speichert Offer, Answer
//! und die gegenseitig gemeldeten Verbindungskandidaten, bis sie abgeholt
//! werden.
//!
//! ## Architektur
//!
//! ```text
//! SignalingRegistry (Clone = geteilter Zustand)
//!     |
//!     +-- RwLock<Tabelle>
//!     |       nach_host:   PeerName -> Arc<Sitzung>
//!     |       nach_client: PeerName -> Arc<Sitzung>
//!     |
//!     v
//! Sitzung
//!     |  unveraenderlich: ID, Host, Client, Offer
//!     +-- Mutex<SitzungsZustand>
//!             Answer, Host-Kandidaten, Client-Kandidaten, letzte Aktivitaet
//! ```
//!
//! Die Registry kennt kein HTTP. Transport und Fehler-Mapping liegen in
//! `rendezvous-api`.

pub mod error;
pub mod registry;
pub mod session;

pub use error::{SignalingError, SignalingResult, Suche};
pub use registry::{Angebot, RegistryKonfig, SignalingRegistry};
pub use session::{
    client_name_ableiten, Rolle, SitzungsStatus, SitzungsUebersicht, CLIENT_SUFFIX,
};
