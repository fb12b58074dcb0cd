//! Rate Limiter fuer die Rendezvous-API
//!
//! Token-Bucket pro Client-IP. Polling-Clients fragen in festen Abstaenden
//! nach Answer und Kandidaten, daher ist das Standardlimit grosszuegig.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

/// Konfiguration fuer den Rate Limiter
#[derive(Debug, Clone)]
pub struct RateLimitKonfig {
    /// Maximale Anfragen pro Minute pro IP (0 = kein Limit)
    pub anfragen_pro_minute_ip: u32,
    /// Buckets, die laenger unbenutzt sind, werden beim Aufraeumen verworfen
    pub bucket_inaktiv_nach: Duration,
    /// Client-IP aus `X-Forwarded-For` lesen (nur hinter einem Reverse-Proxy)
    pub forwarded_for_vertrauen: bool,
}

impl Default for RateLimitKonfig {
    fn default() -> Self {
        Self {
            anfragen_pro_minute_ip: 600,
            bucket_inaktiv_nach: Duration::from_secs(5 * 60),
            forwarded_for_vertrauen: false,
        }
    }
}

/// Ein Token-Bucket fuer eine einzelne IP
#[derive(Debug)]
struct TokenBucket {
    /// Aktuelle Token-Anzahl (als f64 fuer Bruchteil-Auffuellung)
    token: f64,
    /// Maximale Token-Anzahl (= Burst-Limit)
    max_token: f64,
    /// Auffuellrate in Token pro Sekunde
    fuellrate: f64,
    letzte_auffuellung: Instant,
}

impl TokenBucket {
    fn neu(max_anfragen_pro_minute: u32) -> Self {
        let max = max_anfragen_pro_minute as f64;
        Self {
            token: max,
            max_token: max,
            fuellrate: max / 60.0,
            letzte_auffuellung: Instant::now(),
        }
    }

    /// Versucht ein Token zu verbrauchen. Gibt `true` zurueck wenn erlaubt.
    fn verbrauchen(&mut self) -> bool {
        self.auffuellen();
        if self.token >= 1.0 {
            self.token -= 1.0;
            true
        } else {
            false
        }
    }

    /// Sekunden bis zum naechsten verfuegbaren Token (mindestens 1)
    fn retry_after_secs(&mut self) -> u64 {
        self.auffuellen();
        let fehlend = 1.0 - self.token;
        if fehlend <= 0.0 {
            return 0;
        }
        ((fehlend / self.fuellrate).ceil() as u64).max(1)
    }

    fn auffuellen(&mut self) {
        let jetzt = Instant::now();
        let vergangen = jetzt.duration_since(self.letzte_auffuellung).as_secs_f64();
        self.token = (self.token + vergangen * self.fuellrate).min(self.max_token);
        self.letzte_auffuellung = jetzt;
    }
}

/// Rate Limiter mit Token-Bucket-Algorithmus pro IP-Adresse
pub struct RateLimiter {
    konfig: RateLimitKonfig,
    ip_buckets: Mutex<HashMap<String, TokenBucket>>,
}

impl RateLimiter {
    pub fn neu(konfig: RateLimitKonfig) -> Arc<Self> {
        Arc::new(Self {
            konfig,
            ip_buckets: Mutex::new(HashMap::new()),
        })
    }

    pub fn ist_aktiv(&self) -> bool {
        self.konfig.anfragen_pro_minute_ip > 0
    }

    pub fn forwarded_for_vertrauen(&self) -> bool {
        self.konfig.forwarded_for_vertrauen
    }

    /// Prueft und verbraucht ein Token fuer eine IP-Adresse.
    ///
    /// Gibt `Ok(())` zurueck wenn erlaubt, `Err(retry_after_secs)` sonst.
    pub fn pruefe_ip(&self, ip: &str) -> Result<(), u64> {
        if !self.ist_aktiv() {
            return Ok(());
        }
        let mut buckets = self.ip_buckets.lock();
        let bucket = buckets
            .entry(ip.to_string())
            .or_insert_with(|| TokenBucket::neu(self.konfig.anfragen_pro_minute_ip));
        if bucket.verbrauchen() {
            Ok(())
        } else {
            Err(bucket.retry_after_secs())
        }
    }

    /// Bereinigt inaktive Buckets. Gibt die Anzahl entfernter Buckets zurueck.
    pub fn cleanup(&self) -> usize {
        let schwellwert = self.konfig.bucket_inaktiv_nach;
        let jetzt = Instant::now();

        let mut ip = self.ip_buckets.lock();
        let vorher = ip.len();
        ip.retain(|_, b| jetzt.duration_since(b.letzte_auffuellung) < schwellwert);
        vorher - ip.len()
    }

    pub fn anzahl_buckets(&self) -> usize {
        self.ip_buckets.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(pro_minute: u32) -> Arc<RateLimiter> {
        RateLimiter::neu(RateLimitKonfig {
            anfragen_pro_minute_ip: pro_minute,
            ..Default::default()
        })
    }

    #[test]
    fn token_bucket_erlaubt_anfragen_bis_limit() {
        let mut bucket = TokenBucket::neu(5);
        for _ in 0..5 {
            assert!(bucket.verbrauchen(), "Anfrage sollte erlaubt sein");
        }
        assert!(!bucket.verbrauchen(), "6. Anfrage sollte abgelehnt werden");
    }

    #[test]
    fn rate_limiter_ip_pruefung() {
        let limiter = limiter(3);
        assert!(limiter.pruefe_ip("127.0.0.1").is_ok());
        assert!(limiter.pruefe_ip("127.0.0.1").is_ok());
        assert!(limiter.pruefe_ip("127.0.0.1").is_ok());
        let ergebnis = limiter.pruefe_ip("127.0.0.1");
        assert!(ergebnis.unwrap_err() >= 1);
    }

    #[test]
    fn rate_limiter_verschiedene_ips_unabhaengig() {
        let limiter = limiter(1);
        assert!(limiter.pruefe_ip("192.168.1.1").is_ok());
        assert!(limiter.pruefe_ip("192.168.1.2").is_ok()); // andere IP
        assert!(limiter.pruefe_ip("192.168.1.1").is_err()); // erste IP erschoepft
    }

    #[test]
    fn limit_null_deaktiviert() {
        let limiter = limiter(0);
        for _ in 0..1000 {
            assert!(limiter.pruefe_ip("10.0.0.1").is_ok());
        }
        assert_eq!(limiter.anzahl_buckets(), 0);
    }

    #[test]
    fn token_bucket_auffuellung_nach_zeit() {
        // 60 Anfragen/Minute = 1/Sekunde
        let mut bucket = TokenBucket::neu(60);
        for _ in 0..60 {
            bucket.verbrauchen();
        }
        bucket.letzte_auffuellung = Instant::now() - Duration::from_secs(2);
        assert!(
            bucket.verbrauchen(),
            "Nach 2 Sekunden sollte 1 Token verfuegbar sein"
        );
    }

    #[test]
    fn cleanup_entfernt_alte_buckets() {
        let limiter = RateLimiter::neu(RateLimitKonfig {
            anfragen_pro_minute_ip: 10,
            bucket_inaktiv_nach: Duration::from_secs(60),
            ..Default::default()
        });
        limiter.pruefe_ip("10.0.0.1").unwrap();
        limiter.pruefe_ip("10.0.0.2").unwrap();

        limiter
            .ip_buckets
            .lock()
            .get_mut("10.0.0.1")
            .unwrap()
            .letzte_auffuellung = Instant::now() - Duration::from_secs(120);

        assert_eq!(limiter.cleanup(), 1);
        assert_eq!(limiter.anzahl_buckets(), 1);
    }
}
