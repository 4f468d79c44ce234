//! Expiring cache with an injectable clock.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    pub fn set(&self, to: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = to;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }
}

struct Entry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// Key-value cache whose entries expire `ttl` after insertion.
///
/// Expired entries are dropped lazily on read.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: &K, clock: &dyn Clock) -> Option<V> {
        let mut entries = self.entries.lock().ok()?;
        let now = clock.now();
        match entries.get(key) {
            Some(entry) if now - entry.stored_at < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V, clock: &dyn Clock) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key,
                Entry {
                    value,
                    stored_at: clock.now(),
                },
            );
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let clock = clock();
        let cache = TtlCache::new(Duration::seconds(60));
        cache.insert("sol", 150u32, &clock);

        clock.advance(Duration::seconds(59));
        assert_eq!(cache.get(&"sol", &clock), Some(150));

        clock.advance(Duration::seconds(1));
        assert_eq!(cache.get(&"sol", &clock), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_insert_refreshes_timestamp() {
        let clock = clock();
        let cache = TtlCache::new(Duration::seconds(10));
        cache.insert(1, "a", &clock);
        clock.advance(Duration::seconds(8));
        cache.insert(1, "b", &clock);
        clock.advance(Duration::seconds(8));
        assert_eq!(cache.get(&1, &clock), Some("b"));
    }
}
