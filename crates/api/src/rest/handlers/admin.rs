//! REST-Handler fuer Verwaltungs-Endpunkte

use axum::{extract::State, http::HeaderMap, response::Json};
use rendezvous_protocol::{ResetResponse, SessionSummary, SessionsResponse};
use rendezvous_signaling::{SitzungsStatus, SitzungsUebersicht};

use crate::error::{ApiError, ApiResult};
use crate::rest::middleware::bearer_token;
use crate::rest::ApiState;

/// Prueft den Admin-Token, sofern einer konfiguriert ist
fn admin_pruefen(state: &ApiState, headers: &HeaderMap) -> ApiResult<()> {
    let Some(erwartet) = state.admin_token.as_deref() else {
        return Ok(());
    };
    match bearer_token(headers) {
        Some(token) if token == erwartet => Ok(()),
        Some(_) => Err(ApiError::NichtAutorisiert("Ungueltiger Token")),
        None => Err(ApiError::NichtAutorisiert("Authorization-Header fehlt")),
    }
}

fn zusammenfassung(u: SitzungsUebersicht) -> SessionSummary {
    SessionSummary {
        session_id: u.id.inner(),
        host_name: u.host_name,
        client_name: u.client_name,
        answered: u.status == SitzungsStatus::Beantwortet,
        pending_host_candidates: u.offene_host_kandidaten,
        pending_client_candidates: u.offene_client_kandidaten,
        created_at: u.erstellt_am,
    }
}

/// POST /admin/reset – verwirft alle Sitzungen
pub async fn post_reset(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Json<ResetResponse>> {
    admin_pruefen(&state, &headers)?;
    let removed = state.registry.zuruecksetzen();
    state.sitzungen_zaehlen();
    tracing::info!(anzahl = removed, "Registry per Admin-Endpunkt zurueckgesetzt");
    Ok(Json(ResetResponse {
        success: true,
        removed,
    }))
}

/// GET /admin/sessions – Uebersicht aller Sitzungen ohne Offer/Answer-Inhalte
pub async fn get_sessions(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionsResponse>> {
    admin_pruefen(&state, &headers)?;
    let sessions = state
        .registry
        .uebersicht()
        .into_iter()
        .map(zusammenfassung)
        .collect();
    Ok(Json(SessionsResponse {
        success: true,
        sessions,
    }))
}
