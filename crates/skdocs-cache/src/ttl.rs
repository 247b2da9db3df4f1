//! Keyed table with insertion-time expiry.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex as AsyncMutex;

use crate::clock::Clock;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

/// In-memory table whose entries expire a fixed TTL after insertion.
///
/// Reading an entry never extends its lifetime. Expired entries stay in the
/// table until they are replaced, cleared or purged with
/// [`TtlCache::purge_expired`]; [`TtlCache::get`] simply ignores them.
///
/// A TTL of zero disables caching: every lookup misses.
pub struct TtlCache<K, V> {
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    last_insertion: RwLock<Option<DateTime<Utc>>>,
    in_flight: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty table.
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
            entries: RwLock::new(HashMap::new()),
            last_insertion: RwLock::new(None),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.inserted_at) < self.ttl
    }

    /// Return the value for `key` if present and younger than the TTL.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.read().unwrap();
        entries
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`, replacing any previous entry.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn insert(&self, key: K, value: V) {
        let now = self.clock.now();
        self.entries.write().unwrap().insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
            },
        );
        *self.last_insertion.write().unwrap() = Some(now);
    }

    /// Drop every entry. The last insertion time is kept.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    /// Drop entries older than the TTL and return how many were removed.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        before - entries.len()
    }

    /// Number of stored entries, including expired ones not yet replaced.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// True if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time of the most recent insertion, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn last_insertion(&self) -> Option<DateTime<Utc>> {
        *self.last_insertion.read().unwrap()
    }

    /// Return the fresh value for `key`, or run `fetch` and store its result.
    ///
    /// Concurrent callers missing on the same key wait for a single `fetch`;
    /// callers on other keys are never blocked. Errors are returned to the
    /// caller that ran `fetch` and are not stored, so the next caller retries.
    ///
    /// # Panics
    ///
    /// Panics if an internal lock is poisoned.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let flight = self.join_flight(key);
        let _turn = flight.gate().lock_owned().await;

        // Another caller may have filled the entry while we waited
        if let Some(value) = self.get(&flight.key) {
            return Ok(value);
        }

        let value = fetch().await?;
        self.insert(flight.key.clone(), value.clone());
        Ok(value)
    }

    fn join_flight(&self, key: K) -> Flight<'_, K, V> {
        let gate = {
            let mut in_flight = self.in_flight.lock().unwrap();
            Arc::clone(in_flight.entry(key.clone()).or_default())
        };
        Flight {
            cache: self,
            key,
            gate: Some(gate),
        }
    }
}

/// Membership in the set of callers resolving one key.
///
/// Removes the key's gate once the last member leaves.
struct Flight<'a, K, V>
where
    K: Eq + Hash,
{
    cache: &'a TtlCache<K, V>,
    key: K,
    gate: Option<Arc<AsyncMutex<()>>>,
}

impl<K, V> Flight<'_, K, V>
where
    K: Eq + Hash,
{
    fn gate(&self) -> Arc<AsyncMutex<()>> {
        self.gate.as_ref().map(Arc::clone).unwrap_or_default()
    }
}

impl<K, V> Drop for Flight<'_, K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        let Ok(mut in_flight) = self.cache.in_flight.lock() else {
            return;
        };
        drop(self.gate.take());
        // Only the map's reference is left once every member has gone
        let idle = in_flight
            .get(&self.key)
            .is_some_and(|gate| Arc::strong_count(gate) == 1);
        if idle {
            in_flight.remove(&self.key);
        }
    }
}
