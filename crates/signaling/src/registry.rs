//! Signaling-Registry – Verwaltet alle aktiven Sitzungen
//!
//! Zwei Hash-Indizes (nach Host-Name, nach Client-Name) zeigen auf dieselbe
//! `Arc<Sitzung>`. Die Tabelle liegt hinter einem `RwLock`: Anlegen,
//! Zuruecksetzen und Aufraeumen nehmen den Schreib-Lock, alle anderen
//! Operationen den Lese-Lock plus hoechstens den Mutex einer Sitzung.
//! Kein Pfad nimmt einen Sitzungs-Mutex und danach den Tabellen-Lock.
//!
//! ## Kandidaten-Konvention
//!
//! Jeder Peer meldet Kandidaten unter seinem eigenen Namen. Abgeholt wird
//! mit dem Namen des meldenden Peers: der Client fragt mit dem Host-Namen,
//! der Host mit dem Client-Namen.
//!
//! ## Namensaufloesung
//!
//! Ein Name gehoert hoechstens einer Rolle einer Sitzung: Host- und
//! Client-Namen teilen sich einen Namensraum. Operationen, die beide Rollen
//! akzeptieren, pruefen trotzdem zuerst die Host-Namen.

use parking_lot::RwLock;
use rendezvous_core::{Payload, PeerName};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{SignalingError, SignalingResult, Suche};
use crate::session::{client_name_ableiten, Rolle, Sitzung, SitzungsUebersicht};

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Konfiguration der Registry
#[derive(Debug, Clone, Default)]
pub struct RegistryKonfig {
    /// Maximale Anzahl gleichzeitiger Sitzungen (0 = unbegrenzt)
    pub max_sitzungen: usize,
}

/// Ergebnis von [`SignalingRegistry::angebot_abrufen`]
#[derive(Debug, Clone, PartialEq)]
pub struct Angebot {
    pub offer: Payload,
    pub client_name: PeerName,
}

// ---------------------------------------------------------------------------
// Tabelle
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Tabelle {
    nach_host: HashMap<PeerName, Arc<Sitzung>>,
    nach_client: HashMap<PeerName, Arc<Sitzung>>,
}

impl Tabelle {
    /// Sucht einen Namen in beiden Rollen, Host zuerst
    fn finden(&self, name: &PeerName) -> Option<(&Arc<Sitzung>, Rolle)> {
        if let Some(sitzung) = self.nach_host.get(name) {
            return Some((sitzung, Rolle::Host));
        }
        self.nach_client
            .get(name)
            .map(|sitzung| (sitzung, Rolle::Client))
    }

    /// Ob der Name als Host- oder Client-Name vergeben ist
    fn belegt(&self, name: &PeerName) -> bool {
        self.nach_host.contains_key(name) || self.nach_client.contains_key(name)
    }

    fn entfernen(&mut self, host: &PeerName) -> Option<Arc<Sitzung>> {
        let sitzung = self.nach_host.remove(host)?;
        self.nach_client.remove(&sitzung.client_name);
        Some(sitzung)
    }
}

// ---------------------------------------------------------------------------
// SignalingRegistry
// ---------------------------------------------------------------------------

/// Registry aller aktiven Sitzungen
///
/// Wird beim Start einmal erstellt und an die HTTP-Schicht uebergeben.
/// Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct SignalingRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    konfig: RegistryKonfig,
    tabelle: RwLock<Tabelle>,
}

impl SignalingRegistry {
    /// Erstellt eine leere Registry ohne Kapazitaetsgrenze
    pub fn neu() -> Self {
        Self::mit_konfig(RegistryKonfig::default())
    }

    pub fn mit_konfig(konfig: RegistryKonfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                konfig,
                tabelle: RwLock::new(Tabelle::default()),
            }),
        }
    }

    /// Legt eine neue Sitzung an und gibt den abgeleiteten Client-Namen zurueck
    ///
    /// Ist der Host-Name oder der abgeleitete Client-Name schon in irgendeiner
    /// Rolle belegt, wird mit [`SignalingError::Konflikt`] abgelehnt; die
    /// bestehende Sitzung bleibt unberuehrt.
    pub fn sitzung_erstellen(&self, host: PeerName, angebot: Payload) -> SignalingResult<PeerName> {
        let client = client_name_ableiten(&host)?;
        let mut tabelle = self.inner.tabelle.write();

        if let Some(belegt) = [&host, &client].into_iter().find(|n| tabelle.belegt(n)) {
            tracing::warn!(
                host = %host,
                client = %client,
                belegt = %belegt,
                "Name bereits vergeben, Sitzung abgelehnt"
            );
            return Err(SignalingError::Konflikt {
                name: belegt.clone(),
            });
        }

        let max = self.inner.konfig.max_sitzungen;
        if max > 0 && tabelle.nach_host.len() >= max {
            tracing::warn!(host = %host, max, "Registry voll, Sitzung abgelehnt");
            return Err(SignalingError::Kapazitaet { max });
        }

        let sitzung = Arc::new(Sitzung::neu(host.clone(), client.clone(), angebot));
        tracing::info!(
            session_id = %sitzung.id,
            host = %host,
            client = %client,
            "Sitzung erstellt"
        );
        tabelle.nach_client.insert(client.clone(), Arc::clone(&sitzung));
        tabelle.nach_host.insert(host, sitzung);

        Ok(client)
    }

    /// Setzt die Answer der Sitzung mit diesem Host-Namen
    ///
    /// Eine zweite Answer ueberschreibt die erste.
    pub fn antwort_setzen(&self, host: &PeerName, antwort: Payload) -> SignalingResult<()> {
        let tabelle = self.inner.tabelle.read();
        let sitzung = tabelle
            .nach_host
            .get(host)
            .ok_or_else(|| SignalingError::nicht_gefunden(Suche::Host, host))?;

        if sitzung.antwort_setzen(antwort) {
            tracing::info!(session_id = %sitzung.id, host = %host, "Answer ueberschrieben");
        } else {
            tracing::debug!(session_id = %sitzung.id, host = %host, "Answer gesetzt");
        }
        Ok(())
    }

    /// Meldet einen Kandidaten im Namen von `peer`
    ///
    /// Gibt die Rolle zurueck, unter der der Name aufgeloest wurde.
    pub fn kandidat_hinzufuegen(&self, peer: &PeerName, kandidat: Payload) -> SignalingResult<Rolle> {
        let tabelle = self.inner.tabelle.read();
        let (sitzung, rolle) = tabelle
            .finden(peer)
            .ok_or_else(|| SignalingError::nicht_gefunden(Suche::Peer, peer))?;

        let offen = sitzung.kandidat_anhaengen(rolle, kandidat);
        tracing::debug!(
            session_id = %sitzung.id,
            peer = %peer,
            rolle = %rolle,
            offen,
            "Kandidat gespeichert"
        );
        Ok(rolle)
    }

    /// Holt alle von `peer` gemeldeten Kandidaten ab und leert den Puffer
    ///
    /// Jeder Kandidat wird hoechstens einmal ausgeliefert.
    pub fn kandidaten_abholen(&self, peer: &PeerName) -> SignalingResult<Vec<Payload>> {
        let tabelle = self.inner.tabelle.read();
        let (sitzung, rolle) = tabelle
            .finden(peer)
            .ok_or_else(|| SignalingError::nicht_gefunden(Suche::Peer, peer))?;

        let kandidaten = sitzung.kandidaten_abholen(rolle);
        tracing::debug!(
            session_id = %sitzung.id,
            peer = %peer,
            rolle = %rolle,
            anzahl = kandidaten.len(),
            "Kandidaten abgeholt"
        );
        Ok(kandidaten)
    }

    /// Liefert das Offer und den Client-Namen zu einem Host-Namen
    pub fn angebot_abrufen(&self, host: &PeerName) -> SignalingResult<Angebot> {
        let tabelle = self.inner.tabelle.read();
        let sitzung = tabelle
            .nach_host
            .get(host)
            .ok_or_else(|| SignalingError::nicht_gefunden(Suche::Host, host))?;

        sitzung.beruehren();
        Ok(Angebot {
            offer: sitzung.angebot().clone(),
            client_name: sitzung.client_name.clone(),
        })
    }

    /// Liefert die Answer zu einem Client-Namen
    ///
    /// Solange keine Answer vorliegt: [`SignalingError::NochNichtBereit`].
    pub fn antwort_abrufen(&self, client: &PeerName) -> SignalingResult<Payload> {
        let tabelle = self.inner.tabelle.read();
        let sitzung = tabelle
            .nach_client
            .get(client)
            .ok_or_else(|| SignalingError::nicht_gefunden(Suche::Client, client))?;

        sitzung
            .antwort()
            .ok_or_else(|| SignalingError::NochNichtBereit {
                client: client.clone(),
            })
    }

    /// Verwirft alle Sitzungen. Gibt die Anzahl der entfernten Sitzungen zurueck.
    pub fn zuruecksetzen(&self) -> usize {
        let mut tabelle = self.inner.tabelle.write();
        let anzahl = tabelle.nach_host.len();
        tabelle.nach_host.clear();
        tabelle.nach_client.clear();
        tracing::info!(anzahl, "Registry zurueckgesetzt");
        anzahl
    }

    /// Entfernt Sitzungen, die laenger als `max_inaktiv` unbenutzt sind
    pub fn abgelaufene_entfernen(&self, max_inaktiv: Duration) -> usize {
        let mut tabelle = self.inner.tabelle.write();
        let abgelaufen: Vec<PeerName> = tabelle
            .nach_host
            .iter()
            .filter(|(_, sitzung)| sitzung.inaktiv_seit() > max_inaktiv)
            .map(|(host, _)| host.clone())
            .collect();

        for host in &abgelaufen {
            if let Some(sitzung) = tabelle.entfernen(host) {
                tracing::debug!(session_id = %sitzung.id, host = %host, "Sitzung abgelaufen");
            }
        }

        if !abgelaufen.is_empty() {
            tracing::info!(
                anzahl = abgelaufen.len(),
                verbleibend = tabelle.nach_host.len(),
                "Inaktive Sitzungen entfernt"
            );
        }
        abgelaufen.len()
    }

    /// Anzahl der aktiven Sitzungen
    pub fn anzahl(&self) -> usize {
        self.inner.tabelle.read().nach_host.len()
    }

    pub fn ist_leer(&self) -> bool {
        self.anzahl() == 0
    }

    /// Momentaufnahme aller Sitzungen, aelteste zuerst
    pub fn uebersicht(&self) -> Vec<SitzungsUebersicht> {
        let tabelle = self.inner.tabelle.read();
        let mut liste: Vec<SitzungsUebersicht> =
            tabelle.nach_host.values().map(|s| s.uebersicht()).collect();
        liste.sort_by(|a, b| {
            a.erstellt_am
                .cmp(&b.erstellt_am)
                .then_with(|| a.host_name.cmp(&b.host_name))
        });
        liste
    }

}

impl Default for SignalingRegistry {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
