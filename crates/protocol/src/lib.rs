//! rendezvous-protocol – Wire-Vertrag des Signaling-Dienstes
//!
//! Definiert die Anfragen, die Peers an den Dienst senden, und die
//! JSON-Antworten, die sie zurueckbekommen. Anfragen werden genau einmal an
//! der Grenze dekodiert und validiert; dahinter arbeitet die Registry nur
//! noch mit typisierten Werten.
//!
//! ## Nachrichten
//!
//! ```text
//! POST /webrtc   {"messageType": "offer",     "peerName": "...", "offer": ...}
//!                {"messageType": "answer",    "peerName": "...", "answer": ...}
//!                {"messageType": "candidate", "peerName": "...", "candidate": ...}
//! ```
//!
//! Das Payload-Feld akzeptiert zusaetzlich den Namen `payload`.

pub mod error;
pub mod response;
pub mod signal;

pub use error::ProtocolError;
pub use response::{
    Ack, AnswerResponse, CandidatesResponse, ErrorCode, ErrorResponse, OfferAccepted,
    OfferResponse, ResetResponse, SessionSummary, SessionsResponse,
};
pub use signal::SignalRequest;
