//! Signaling-Anfragen (POST /webrtc)
//!
//! Ein Tagged Enum mit genau drei Faellen. Jeder Fall traegt seine eigenen
//! Pflichtfelder; `messageType` waehlt den Fall.

use rendezvous_core::{Payload, PeerName};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};

/// Name des Tag-Feldes
const MESSAGE_TYPE_FELD: &str = "messageType";
/// Name des Peer-Feldes
const PEER_NAME_FELD: &str = "peerName";
/// Alternativer Name des Payload-Feldes
const PAYLOAD_ALIAS: &str = "payload";

/// Eine dekodierte Signaling-Anfrage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "messageType", rename_all = "lowercase")]
pub enum SignalRequest {
    /// Host eroeffnet eine Sitzung
    Offer {
        #[serde(rename = "peerName")]
        peer_name: PeerName,
        #[serde(alias = "payload")]
        offer: Payload,
    },
    /// Client beantwortet das Angebot; `peer_name` ist der Host-Name
    Answer {
        #[serde(rename = "peerName")]
        peer_name: PeerName,
        #[serde(alias = "payload")]
        answer: Payload,
    },
    /// Ein Peer meldet einen Verbindungskandidaten unter seinem eigenen Namen
    Candidate {
        #[serde(rename = "peerName")]
        peer_name: PeerName,
        #[serde(alias = "payload")]
        candidate: Payload,
    },
}

impl SignalRequest {
    /// Dekodiert einen rohen Request-Body
    pub fn dekodieren(body: &[u8]) -> ProtocolResult<Self> {
        let wert: Value = serde_json::from_slice(body).map_err(ProtocolError::UngueltigesJson)?;
        Self::aus_wert(wert)
    }

    /// Dekodiert und validiert einen bereits geparsten JSON-Wert
    ///
    /// Reihenfolge der Pruefungen: Tag, Peer-Name, Payload-Feld, Struktur,
    /// leere Werte. Dadurch bekommt der Aufrufer die genaueste Meldung.
    pub fn aus_wert(wert: Value) -> ProtocolResult<Self> {
        let typ = match wert.get(MESSAGE_TYPE_FELD) {
            Some(Value::String(t)) => t.as_str(),
            Some(_) => {
                return Err(ProtocolError::Ungueltig(format!(
                    "'{MESSAGE_TYPE_FELD}' muss ein String sein"
                )))
            }
            None => return Err(ProtocolError::FehlendesFeld(MESSAGE_TYPE_FELD)),
        };

        let payload_feld =
            payload_feld_fuer(typ).ok_or_else(|| ProtocolError::UnbekannterTyp(typ.to_string()))?;

        if wert.get(PEER_NAME_FELD).is_none() {
            return Err(ProtocolError::FehlendesFeld(PEER_NAME_FELD));
        }
        if wert.get(payload_feld).is_none() && wert.get(PAYLOAD_ALIAS).is_none() {
            return Err(ProtocolError::FehlendesFeld(payload_feld));
        }

        let anfrage: Self =
            serde_json::from_value(wert).map_err(|e| ProtocolError::Ungueltig(e.to_string()))?;
        anfrage.validieren()?;
        Ok(anfrage)
    }

    /// Lehnt null und leere Payloads ab
    pub fn validieren(&self) -> ProtocolResult<()> {
        if ist_leer(self.payload()) {
            return Err(ProtocolError::LeererWert(self.payload_feld()));
        }
        Ok(())
    }

    /// Wert des Tags (`offer`, `answer`, `candidate`)
    pub fn typ(&self) -> &'static str {
        match self {
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::Candidate { .. } => "candidate",
        }
    }

    pub fn peer_name(&self) -> &PeerName {
        match self {
            Self::Offer { peer_name, .. }
            | Self::Answer { peer_name, .. }
            | Self::Candidate { peer_name, .. } => peer_name,
        }
    }

    pub fn payload(&self) -> &Payload {
        match self {
            Self::Offer { offer, .. } => offer,
            Self::Answer { answer, .. } => answer,
            Self::Candidate { candidate, .. } => candidate,
        }
    }

    fn payload_feld(&self) -> &'static str {
        payload_feld_fuer(self.typ()).unwrap_or(PAYLOAD_ALIAS)
    }
}

fn payload_feld_fuer(typ: &str) -> Option<&'static str> {
    match typ {
        "offer" => Some("offer"),
        "answer" => Some("answer"),
        "candidate" => Some("candidate"),
        _ => None,
    }
}

/// null, "", {} und [] gelten als fehlender Inhalt
fn ist_leer(wert: &Value) -> bool {
    match wert {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}
