//! Client-local persisted flags behind an injected key-value seam.
//!
//! Age-gate acceptance, the global ad switch, and the ad-cooldown
//! timestamp are process-wide, best-effort state: read at mount, written
//! on user action, never required for playback correctness. The store is
//! a trait so hosts can back it with the browser's key-value storage and
//! tests with memory.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const AGE_VERIFIED_KEY: &str = "age-verified";
const ADS_ENABLED_KEY: &str = "ads-enabled";
const AD_COOLDOWN_KEY: &str = "lastAdTime";

/// Minimal string key-value store.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory [`KvStore`] for tests and the headless client.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.map.lock().remove(key);
    }
}

/// Typed access to the client flags.
pub struct ClientFlags {
    store: Arc<dyn KvStore>,
    ad_cooldown: Duration,
}

impl ClientFlags {
    pub fn new(store: Arc<dyn KvStore>, ad_cooldown: Duration) -> Self {
        Self { store, ad_cooldown }
    }

    /// Whether the one-time age gate has been accepted.
    pub fn age_verified(&self) -> bool {
        self.store.get(AGE_VERIFIED_KEY).as_deref() == Some("true")
    }

    /// Accept the age gate. Set-if-absent: repeated calls in quick
    /// succession leave a single stable value.
    pub fn accept_age_gate(&self) {
        if self.store.get(AGE_VERIFIED_KEY).is_none() {
            self.store.set(AGE_VERIFIED_KEY, "true");
        }
    }

    /// Global ad switch. Defaults to enabled when unset.
    pub fn ads_enabled(&self) -> bool {
        self.store.get(ADS_ENABLED_KEY).as_deref() != Some("false")
    }

    pub fn set_ads_enabled(&self, enabled: bool) {
        self.store
            .set(ADS_ENABLED_KEY, if enabled { "true" } else { "false" });
    }

    /// Claim an ad open at `now`. Returns true and records the timestamp
    /// when no open happened within the cooldown window; otherwise false.
    pub fn try_open_ad(&self, now: DateTime<Utc>) -> bool {
        if !self.ads_enabled() {
            return false;
        }

        let last_ms: Option<i64> = self
            .store
            .get(AD_COOLDOWN_KEY)
            .and_then(|v| v.parse().ok());

        if let Some(last_ms) = last_ms {
            let elapsed_ms = now.timestamp_millis().saturating_sub(last_ms);
            if elapsed_ms <= self.ad_cooldown.as_millis() as i64 {
                return false;
            }
        }

        self.store
            .set(AD_COOLDOWN_KEY, &now.timestamp_millis().to_string());
        true
    }
}
