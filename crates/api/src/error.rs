//! Fehlertypen fuer die Rendezvous-API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use rendezvous_protocol::{ErrorCode, ErrorResponse, ProtocolError};
use rendezvous_signaling::SignalingError;
use thiserror::Error;

/// Alle moeglichen Fehler der HTTP-Schicht
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    UngueltigeAnfrage(String),

    /// Meldung ist der fuer den Client sichtbare Text (z.B. "Host not found")
    #[error("{0}")]
    NichtGefunden(&'static str),

    #[error("{0}")]
    Konflikt(String),

    #[error("{0}")]
    Kapazitaet(String),

    #[error("Nicht autorisiert: {0}")]
    NichtAutorisiert(&'static str),

    #[error("Rate Limit ueberschritten: bitte warte {retry_after_secs} Sekunden")]
    RateLimitUeberschritten { retry_after_secs: u64 },

    #[error("Interner Fehler: {0}")]
    Intern(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Uebersetzt einen Registry-Fehler
    ///
    /// `nicht_gefunden` ist die Meldung der jeweiligen Operation fuer
    /// unbekannte Namen. `NochNichtBereit` wird von den Handlern selbst
    /// beantwortet und landet hier nur als Fallback.
    pub fn aus_signaling(fehler: SignalingError, nicht_gefunden: &'static str) -> Self {
        match fehler {
            SignalingError::NichtGefunden { .. } => Self::NichtGefunden(nicht_gefunden),
            SignalingError::NochNichtBereit { .. } => Self::Intern(fehler.to_string()),
            SignalingError::Konflikt { .. } => Self::Konflikt(fehler.to_string()),
            SignalingError::Kapazitaet { .. } => Self::Kapazitaet(fehler.to_string()),
            SignalingError::Validierung(e) => Self::UngueltigeAnfrage(e.to_string()),
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::UngueltigeAnfrage(_) => StatusCode::BAD_REQUEST,
            Self::NichtGefunden(_) => StatusCode::NOT_FOUND,
            Self::Konflikt(_) => StatusCode::CONFLICT,
            Self::Kapazitaet(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::NichtAutorisiert(_) => StatusCode::UNAUTHORIZED,
            Self::RateLimitUeberschritten { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Intern(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::UngueltigeAnfrage(_) => ErrorCode::InvalidRequest,
            Self::NichtGefunden(_) => ErrorCode::NotFound,
            Self::Konflikt(_) => ErrorCode::Conflict,
            Self::Kapazitaet(_) => ErrorCode::CapacityExhausted,
            Self::NichtAutorisiert(_) => ErrorCode::Unauthorized,
            Self::RateLimitUeberschritten { .. } => ErrorCode::RateLimited,
            Self::Intern(_) => ErrorCode::InternalError,
        }
    }
}

impl From<ProtocolError> for ApiError {
    fn from(fehler: ProtocolError) -> Self {
        Self::UngueltigeAnfrage(fehler.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(fehler = %self, "Anfrage fehlgeschlagen");
        } else {
            tracing::debug!(fehler = %self, status = status.as_u16(), "Anfrage abgelehnt");
        }

        let body = ErrorResponse::neu(self.error_code(), self.to_string());
        match self {
            Self::RateLimitUeberschritten { retry_after_secs } => {
                let mut wert = serde_json::to_value(&body).unwrap_or_default();
                wert["retry_after_secs"] = retry_after_secs.into();
                (status, Json(wert)).into_response()
            }
            _ => (status, Json(body)).into_response(),
        }
    }
}
