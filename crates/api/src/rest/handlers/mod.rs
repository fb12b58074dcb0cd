//! REST-Handler Module

pub mod admin;
pub mod allgemein;
pub mod webrtc;

#[cfg(test)]
pub(crate) mod test_hilfen {
    use std::sync::Arc;

    use axum::{body::to_bytes, response::Response};
    use rendezvous_observability::{HealthState, RendezvousMetrics};
    use rendezvous_signaling::{RegistryKonfig, SignalingRegistry};
    use serde_json::Value;

    use crate::rest::ApiState;

    pub fn state_mit(max_sitzungen: usize, admin_token: Option<&str>) -> ApiState {
        let registry = SignalingRegistry::mit_konfig(RegistryKonfig { max_sitzungen });
        let zaehler = registry.clone();
        ApiState::neu(
            registry,
            RendezvousMetrics::neu().unwrap(),
            HealthState::neu(Arc::new(move || zaehler.anzahl())),
            admin_token.map(str::to_string),
        )
    }

    pub fn state() -> ApiState {
        state_mit(0, None)
    }

    pub async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}
