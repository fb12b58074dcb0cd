//! Sitzung – Eintrag eines Signaling-Austauschs zwischen Host und Client
//!
//! Unveraenderliche Felder (Namen, Offer, ID) liegen direkt in der
//! [`Sitzung`]. Alles was sich aendert (Answer, Kandidaten-Puffer,
//! letzte Aktivitaet) liegt hinter einem eigenen Mutex pro Sitzung.
//!
//! ## Zustaende
//! ```text
//! Erstellt (Offer gesetzt) --Answer--> Beantwortet
//! ```
//! Die beiden Kandidaten-Puffer sind davon unabhaengig und werden beliebig
//! oft befuellt und geleert.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rendezvous_core::{Payload, PeerName, RendezvousError, SessionId};
use std::time::{Duration, Instant};

/// Suffix, aus dem der Client-Name abgeleitet wird
pub const CLIENT_SUFFIX: &str = "_client";

/// Leitet den Client-Namen deterministisch aus dem Host-Namen ab
pub fn client_name_ableiten(host: &PeerName) -> Result<PeerName, RendezvousError> {
    host.mit_suffix(CLIENT_SUFFIX)
}

// ---------------------------------------------------------------------------
// Rolle / Status
// ---------------------------------------------------------------------------

/// Rolle eines Peers innerhalb einer Sitzung
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rolle {
    Host,
    Client,
}

impl std::fmt::Display for Rolle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host => f.write_str("host"),
            Self::Client => f.write_str("client"),
        }
    }
}

/// Fortschritt des Offer/Answer-Austauschs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitzungsStatus {
    /// Offer liegt vor, Answer fehlt noch
    Erstellt,
    /// Answer wurde gesetzt
    Beantwortet,
}

/// Momentaufnahme einer Sitzung fuer Admin-Ansichten
#[derive(Debug, Clone, PartialEq)]
pub struct SitzungsUebersicht {
    pub id: SessionId,
    pub host_name: PeerName,
    pub client_name: PeerName,
    pub status: SitzungsStatus,
    pub offene_host_kandidaten: usize,
    pub offene_client_kandidaten: usize,
    pub erstellt_am: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Sitzung
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SitzungsZustand {
    antwort: Option<Payload>,
    /// Vom Host gemeldete Kandidaten, abgeholt vom Client
    host_kandidaten: Vec<Payload>,
    /// Vom Client gemeldete Kandidaten, abgeholt vom Host
    client_kandidaten: Vec<Payload>,
    zuletzt_aktiv: Instant,
}

impl SitzungsZustand {
    fn puffer(&mut self, rolle: Rolle) -> &mut Vec<Payload> {
        match rolle {
            Rolle::Host => &mut self.host_kandidaten,
            Rolle::Client => &mut self.client_kandidaten,
        }
    }
}

/// Eine aktive Sitzung. Gehoert ausschliesslich der Registry.
#[derive(Debug)]
pub(crate) struct Sitzung {
    pub(crate) id: SessionId,
    pub(crate) host_name: PeerName,
    pub(crate) client_name: PeerName,
    angebot: Payload,
    erstellt_am: DateTime<Utc>,
    zustand: Mutex<SitzungsZustand>,
}

impl Sitzung {
    pub(crate) fn neu(host_name: PeerName, client_name: PeerName, angebot: Payload) -> Self {
        Self {
            id: SessionId::new(),
            host_name,
            client_name,
            angebot,
            erstellt_am: Utc::now(),
            zustand: Mutex::new(SitzungsZustand {
                antwort: None,
                host_kandidaten: Vec::new(),
                client_kandidaten: Vec::new(),
                zuletzt_aktiv: Instant::now(),
            }),
        }
    }

    /// Das Offer ist unveraenderlich; Lesen braucht keinen Lock auf den Zustand
    pub(crate) fn angebot(&self) -> &Payload {
        &self.angebot
    }

    /// Setzt die Answer. Gibt true zurueck wenn eine vorhandene ueberschrieben wurde.
    pub(crate) fn antwort_setzen(&self, antwort: Payload) -> bool {
        let mut zustand = self.zustand.lock();
        zustand.zuletzt_aktiv = Instant::now();
        zustand.antwort.replace(antwort).is_some()
    }

    pub(crate) fn antwort(&self) -> Option<Payload> {
        let mut zustand = self.zustand.lock();
        zustand.zuletzt_aktiv = Instant::now();
        zustand.antwort.clone()
    }

    /// Haengt einen Kandidaten an den Puffer der meldenden Rolle an.
    /// Gibt die Anzahl der danach offenen Kandidaten zurueck.
    pub(crate) fn kandidat_anhaengen(&self, rolle: Rolle, kandidat: Payload) -> usize {
        let mut zustand = self.zustand.lock();
        zustand.zuletzt_aktiv = Instant::now();
        let puffer = zustand.puffer(rolle);
        puffer.push(kandidat);
        puffer.len()
    }

    /// Tauscht den Puffer der Rolle atomar gegen einen leeren aus
    pub(crate) fn kandidaten_abholen(&self, rolle: Rolle) -> Vec<Payload> {
        let mut zustand = self.zustand.lock();
        zustand.zuletzt_aktiv = Instant::now();
        std::mem::take(zustand.puffer(rolle))
    }

    pub(crate) fn beruehren(&self) {
        self.zustand.lock().zuletzt_aktiv = Instant::now();
    }

    pub(crate) fn inaktiv_seit(&self) -> Duration {
        self.zustand.lock().zuletzt_aktiv.elapsed()
    }

    pub(crate) fn uebersicht(&self) -> SitzungsUebersicht {
        let zustand = self.zustand.lock();
        SitzungsUebersicht {
            id: self.id,
            host_name: self.host_name.clone(),
            client_name: self.client_name.clone(),
            status: if zustand.antwort.is_some() {
                SitzungsStatus::Beantwortet
            } else {
                SitzungsStatus::Erstellt
            },
            offene_host_kandidaten: zustand.host_kandidaten.len(),
            offene_client_kandidaten: zustand.client_kandidaten.len(),
            erstellt_am: self.erstellt_am,
        }
    }

    #[cfg(test)]
    pub(crate) fn aktivitaet_zurueckdatieren(&self, um: Duration) {
        let mut zustand = self.zustand.lock();
        if let Some(frueher) = zustand.zuletzt_aktiv.checked_sub(um) {
            zustand.zuletzt_aktiv = frueher;
        }
    }
}
