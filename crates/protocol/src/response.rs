//! JSON-Antworten des Signaling-Dienstes
//!
//! Jede Antwort traegt `success`, damit Clients ohne Statuscode-Auswertung
//! auskommen. Feldnamen sind camelCase wie im Browser-Client.

use chrono::{DateTime, Utc};
use rendezvous_core::{Payload, PeerName};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Fehler-Codes
// ---------------------------------------------------------------------------

/// Standardisierte Fehler-Codes fuer Error-Responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequest,
    NotFound,
    NotReady,
    Conflict,
    CapacityExhausted,
    RateLimited,
    Unauthorized,
    InternalError,
}

/// Standardisierte Fehler-Antwort
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: ErrorCode,
}

impl ErrorResponse {
    pub fn neu(code: ErrorCode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            code,
        }
    }
}

// ---------------------------------------------------------------------------
// Erfolgs-Antworten
// ---------------------------------------------------------------------------

/// Antwort auf ein Offer: der abgeleitete Client-Name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferAccepted {
    pub success: bool,
    pub client_name: PeerName,
}

/// Antwort auf GET /webrtc/offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferResponse {
    pub success: bool,
    pub offer: Payload,
    pub client_name: PeerName,
}

/// Antwort auf GET /webrtc/answer
///
/// `answer` ist `null`, solange der Client noch nicht geantwortet hat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub success: bool,
    pub answer: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Antwort auf GET /webrtc/ice_candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatesResponse {
    pub success: bool,
    pub candidates: Vec<Payload>,
}

/// Bestaetigung ohne weitere Daten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Antwort auf POST /admin/reset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
    /// Anzahl der verworfenen Sitzungen
    pub removed: usize,
}

/// Kurzuebersicht einer Sitzung (ohne Offer/Answer-Inhalte)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub host_name: PeerName,
    pub client_name: PeerName,
    pub answered: bool,
    pub pending_host_candidates: usize,
    pub pending_client_candidates: usize,
    pub created_at: DateTime<Utc>,
}

/// Antwort auf GET /admin/sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionsResponse {
    pub success: bool,
    pub sessions: Vec<SessionSummary>,
}
