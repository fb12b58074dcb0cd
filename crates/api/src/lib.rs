//! rendezvous-api – HTTP-Schnittstelle des Signaling-Dienstes
//!
//! Nimmt Offer, Answer und Verbindungskandidaten per REST entgegen und
//! reicht sie an die [`rendezvous_signaling::SignalingRegistry`] weiter.
//!
//! ## Endpunkte
//!
//! ```text
//! GET  /                       Lebenszeichen
//! GET  /health                 Health-Check
//! POST /webrtc                 Offer | Answer | Candidate
//! GET  /webrtc/offer           Offer + Client-Name zum Host-Namen
//! GET  /webrtc/answer          Answer zum Client-Namen (202 solange offen)
//! GET  /webrtc/ice_candidates  Kandidaten des genannten Peers abholen
//! POST /admin/reset            Alle Sitzungen verwerfen
//! GET  /admin/sessions         Sitzungsuebersicht
//! ```

pub mod error;
pub mod rate_limit;
pub mod rest;

pub use error::{ApiError, ApiResult};
pub use rate_limit::{RateLimitKonfig, RateLimiter};
pub use rest::{ApiState, RestServer, RestServerKonfig};
