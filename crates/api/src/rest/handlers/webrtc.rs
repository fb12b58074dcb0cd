//! REST-Handler fuer den WebRTC-Signaling-Austausch
//!
//! `POST /webrtc` nimmt Offer, Answer und Kandidaten entgegen. Die
//! GET-Endpunkte werden vom Browser-Client gepollt.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use rendezvous_protocol::{
    Ack, AnswerResponse, CandidatesResponse, OfferAccepted, OfferResponse, SignalRequest,
};
use rendezvous_signaling::SignalingError;

use crate::error::ApiResult;
use crate::rest::middleware::{peer_name_aus_anfrage, PeerQuery};
use crate::rest::ApiState;

const HOST_NICHT_GEFUNDEN: &str = "Host not found";
const CLIENT_NICHT_GEFUNDEN: &str = "Client not found";
const PEER_NICHT_GEFUNDEN: &str = "Peer not found";
const PEER_UNBEKANNT: &str = "Unknown peer";
const NOCH_NICHT_BEREIT: &str = "Not ready yet";

/// POST /webrtc – Offer, Answer oder Kandidat einreichen
pub async fn post_webrtc(State(state): State<ApiState>, body: Bytes) -> ApiResult<Response> {
    let anfrage = SignalRequest::dekodieren(&body)?;
    tracing::debug!(
        typ = anfrage.typ(),
        peer = %anfrage.peer_name(),
        "Signaling-Nachricht empfangen"
    );

    match anfrage {
        SignalRequest::Offer { peer_name, offer } => {
            let client_name = state
                .registry
                .sitzung_erstellen(peer_name, offer)
                .map_err(|e| state.fehlschlag("create_session", e, HOST_NICHT_GEFUNDEN))?;
            state.metriken.sessions_created_total.inc();
            state.sitzungen_zaehlen();
            Ok(Json(OfferAccepted {
                success: true,
                client_name,
            })
            .into_response())
        }
        SignalRequest::Answer { peer_name, answer } => {
            state
                .registry
                .antwort_setzen(&peer_name, answer)
                .map_err(|e| state.fehlschlag("submit_answer", e, HOST_NICHT_GEFUNDEN))?;
            state.metriken.answers_total.inc();
            Ok(Json(Ack::ok()).into_response())
        }
        SignalRequest::Candidate {
            peer_name,
            candidate,
        } => {
            state
                .registry
                .kandidat_hinzufuegen(&peer_name, candidate)
                .map_err(|e| state.fehlschlag("submit_candidate", e, PEER_UNBEKANNT))?;
            state.metriken.candidates_submitted_total.inc();
            Ok(Json(Ack::ok()).into_response())
        }
    }
}

/// GET /webrtc/offer – Offer und Client-Namen zu einem Host-Namen abrufen
pub async fn get_offer(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<PeerQuery>,
) -> ApiResult<Json<OfferResponse>> {
    let host = peer_name_aus_anfrage(&headers, &query)?;
    let angebot = state
        .registry
        .angebot_abrufen(&host)
        .map_err(|e| state.fehlschlag("get_offer", e, HOST_NICHT_GEFUNDEN))?;

    Ok(Json(OfferResponse {
        success: true,
        offer: angebot.offer,
        client_name: angebot.client_name,
    }))
}

/// GET /webrtc/answer – Answer zu einem Client-Namen abrufen
///
/// Solange keine Answer vorliegt: 202 mit `answer: null`.
pub async fn get_answer(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<PeerQuery>,
) -> ApiResult<Response> {
    let client = peer_name_aus_anfrage(&headers, &query)?;

    match state.registry.antwort_abrufen(&client) {
        Ok(answer) => Ok(Json(AnswerResponse {
            success: true,
            answer: Some(answer),
            error: None,
        })
        .into_response()),
        Err(SignalingError::NochNichtBereit { .. }) => Ok((
            StatusCode::ACCEPTED,
            Json(AnswerResponse {
                success: false,
                answer: None,
                error: Some(NOCH_NICHT_BEREIT.to_string()),
            }),
        )
            .into_response()),
        Err(e) => Err(state.fehlschlag("get_answer", e, CLIENT_NICHT_GEFUNDEN)),
    }
}

/// GET /webrtc/ice_candidates – Kandidaten des genannten Peers abholen
///
/// Der Name ist der des meldenden Peers: der Client fragt mit dem
/// Host-Namen, der Host mit dem Client-Namen.
pub async fn get_ice_candidates(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<PeerQuery>,
) -> ApiResult<Json<CandidatesResponse>> {
    let peer = peer_name_aus_anfrage(&headers, &query)?;
    let candidates = state
        .registry
        .kandidaten_abholen(&peer)
        .map_err(|e| state.fehlschlag("drain_candidates", e, PEER_NICHT_GEFUNDEN))?;

    state
        .metriken
        .candidates_delivered_total
        .inc_by(candidates.len() as u64);
    Ok(Json(CandidatesResponse {
        success: true,
        candidates,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::handlers::test_hilfen::{json_body, state, state_mit};
    use crate::rest::middleware::PEER_NAME_HEADER;
    use axum::http::HeaderValue;
    use serde_json::{json, Value};

    async fn post(state: &ApiState, wert: Value) -> Response {
        match post_webrtc(State(state.clone()), Bytes::from(wert.to_string())).await {
            Ok(r) => r,
            Err(e) => e.into_response(),
        }
    }

    fn header(peer: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(PEER_NAME_HEADER, HeaderValue::from_str(peer).unwrap());
        headers
    }

    fn ohne_query() -> Query<PeerQuery> {
        Query(PeerQuery::default())
    }

    async fn offer(state: &ApiState, host: &str) -> Response {
        post(
            state,
            json!({"messageType": "offer", "peerName": host, "payload": {"sdp": "o"}}),
        )
        .await
    }

    #[tokio::test]
    async fn offer_liefert_client_namen() {
        let state = state();
        let response = offer(&state, "alice").await;
        assert_eq!(response.status(), StatusCode::OK);
        let wert = json_body(response).await;
        assert_eq!(wert, json!({"success": true, "clientName": "alice_client"}));
        assert_eq!(state.metriken.sessions_active.get(), 1);
    }

    #[tokio::test]
    async fn doppeltes_offer_ist_konflikt() {
        let state = state();
        offer(&state, "alice").await;
        let response = offer(&state, "alice").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn offer_mit_fremdem_client_namen_ist_konflikt() {
        let state = state();
        offer(&state, "alice").await;
        let response = offer(&state, "alice_client").await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(state.registry.anzahl(), 1);
    }

    #[tokio::test]
    async fn kapazitaet_ist_503() {
        let state = state_mit(1, None);
        offer(&state, "a").await;
        let response = offer(&state, "b").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["code"], "CAPACITY_EXHAUSTED");
    }

    #[tokio::test]
    async fn ungueltige_nachrichten_sind_400() {
        let state = state();
        for wert in [
            json!({"messageType": "bye", "peerName": "alice"}),
            json!({"peerName": "alice", "offer": "x"}),
            json!({"messageType": "offer", "offer": "x"}),
            json!({"messageType": "offer", "peerName": "alice", "offer": null}),
            json!({"messageType": "offer", "peerName": "", "offer": "x"}),
        ] {
            let response = post(&state, wert.clone()).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "fuer {wert}");
            let body = json_body(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["code"], "INVALID_REQUEST");
        }
        assert!(state.registry.ist_leer());
    }

    #[tokio::test]
    async fn kaputter_body_ist_400() {
        let state = state();
        let response = post_webrtc(State(state), Bytes::from_static(b"{kein json"))
            .await
            .unwrap_err()
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn answer_fuer_unbekannten_host() {
        let state = state();
        let response = post(
            &state,
            json!({"messageType": "answer", "peerName": "niemand", "answer": {"sdp": "a"}}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Host not found");
        assert_eq!(
            state
                .metriken
                .lookup_failures_total
                .with_label_values(&["submit_answer"])
                .get(),
            1
        );
    }

    #[tokio::test]
    async fn kandidat_fuer_unbekannten_peer() {
        let state = state();
        let response = post(
            &state,
            json!({"messageType": "candidate", "peerName": "niemand", "candidate": "c"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Unknown peer");
    }

    #[tokio::test]
    async fn get_offer_ueber_header_und_query() {
        let state = state();
        offer(&state, "alice").await;

        let Json(antwort) = get_offer(State(state.clone()), header("alice"), ohne_query())
            .await
            .unwrap();
        assert_eq!(antwort.offer, json!({"sdp": "o"}));
        assert_eq!(antwort.client_name.as_str(), "alice_client");

        let query = Query(PeerQuery {
            peer_name: Some("alice".into()),
        });
        assert!(get_offer(State(state.clone()), HeaderMap::new(), query)
            .await
            .is_ok());

        let fehler = get_offer(State(state), header("bob"), ohne_query())
            .await
            .unwrap_err();
        assert_eq!(fehler.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(fehler.to_string(), "Host not found");
    }

    #[tokio::test]
    async fn get_offer_ohne_peer_name() {
        let fehler = get_offer(State(state()), HeaderMap::new(), ohne_query())
            .await
            .unwrap_err();
        assert_eq!(fehler.http_status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn answer_pollen_bis_bereit() {
        let state = state();
        offer(&state, "alice").await;

        let response = get_answer(State(state.clone()), header("alice_client"), ohne_query())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let wert = json_body(response).await;
        assert_eq!(wert["success"], false);
        assert!(wert["answer"].is_null());
        assert_eq!(wert["error"], "Not ready yet");

        post(
            &state,
            json!({"messageType": "answer", "peerName": "alice", "payload": {"sdp": "ans"}}),
        )
        .await;

        let response = get_answer(State(state.clone()), header("alice_client"), ohne_query())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let wert = json_body(response).await;
        assert_eq!(wert, json!({"success": true, "answer": {"sdp": "ans"}}));
        assert_eq!(state.metriken.answers_total.get(), 1);
    }

    #[tokio::test]
    async fn answer_fuer_unbekannten_client() {
        let fehler = get_answer(State(state()), header("alice_client"), ohne_query())
            .await
            .unwrap_err();
        assert_eq!(fehler.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(fehler.to_string(), "Client not found");
    }

    #[tokio::test]
    async fn kandidaten_austausch_beide_richtungen() {
        let state = state();
        offer(&state, "alice").await;

        for (peer, kandidat) in [
            ("alice", json!({"c": "1"})),
            ("alice", json!({"c": "2"})),
            ("alice_client", json!({"c": "x"})),
        ] {
            let response = post(
                &state,
                json!({"messageType": "candidate", "peerName": peer, "payload": kandidat}),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(json_body(response).await, json!({"success": true}));
        }

        // Client holt die Kandidaten des Hosts mit dem Host-Namen ab
        let Json(antwort) = get_ice_candidates(State(state.clone()), header("alice"), ohne_query())
            .await
            .unwrap();
        assert_eq!(antwort.candidates, vec![json!({"c": "1"}), json!({"c": "2"})]);

        let Json(antwort) = get_ice_candidates(State(state.clone()), header("alice"), ohne_query())
            .await
            .unwrap();
        assert!(antwort.candidates.is_empty());

        let Json(antwort) =
            get_ice_candidates(State(state.clone()), header("alice_client"), ohne_query())
                .await
                .unwrap();
        assert_eq!(antwort.candidates, vec![json!({"c": "x"})]);

        assert_eq!(state.metriken.candidates_submitted_total.get(), 3);
        assert_eq!(state.metriken.candidates_delivered_total.get(), 3);
    }

    #[tokio::test]
    async fn kandidaten_fuer_unbekannten_peer() {
        let fehler = get_ice_candidates(State(state()), header("niemand"), ohne_query())
            .await
            .unwrap_err();
        assert_eq!(fehler.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(fehler.to_string(), "Peer not found");
    }
}
