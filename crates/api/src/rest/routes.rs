//! Route-Definitionen fuer die REST-API

use axum::{
    routing::{get, post},
    Router,
};

use crate::rest::{handlers, ApiState};

/// Erstellt den vollstaendigen Router
pub fn router() -> Router<ApiState> {
    Router::new()
        // Allgemein
        .route("/", get(handlers::allgemein::root))
        .route("/health", get(handlers::allgemein::health))
        // Signaling
        .route("/webrtc", post(handlers::webrtc::post_webrtc))
        .route("/webrtc/offer", get(handlers::webrtc::get_offer))
        .route("/webrtc/answer", get(handlers::webrtc::get_answer))
        .route(
            "/webrtc/ice_candidates",
            get(handlers::webrtc::get_ice_candidates),
        )
        // Verwaltung
        .route("/admin/reset", post(handlers::admin::post_reset))
        .route("/admin/sessions", get(handlers::admin::get_sessions))
}
