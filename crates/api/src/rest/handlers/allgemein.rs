//! REST-Handler fuer allgemeine Endpunkte

use axum::{extract::State, response::Json};
use rendezvous_observability::HealthResponse;
use serde_json::{json, Value};

use crate::rest::ApiState;

/// GET / – Lebenszeichen
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Hello, World!" }))
}

/// GET /health – Health-Check mit Anzahl aktiver Sitzungen
pub async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(state.health.antwort())
}
