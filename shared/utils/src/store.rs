//! Size- and age-bounded in-memory maps for per-user service state.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::config::SessionStoreConfig;

/// A bounded map shared between handlers.
pub type SharedMap<K, V> = Arc<RwLock<BoundedMap<K, V>>>;

struct Entry<V> {
    value: V,
    touched: Instant,
}

/// Map holding at most `max_entries` values. Inserting into a full map
/// evicts the least recently touched entry. Entries untouched for longer
/// than `ttl` are dropped by [`BoundedMap::purge_expired`].
pub struct BoundedMap<K, V> {
    entries: HashMap<K, Entry<V>>,
    max_entries: usize,
    ttl: Duration,
}

impl<K: Eq + Hash + Clone, V> BoundedMap<K, V> {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    pub fn from_config(config: &SessionStoreConfig) -> Self {
        Self::new(config.max_entries, Duration::from_secs(config.ttl_seconds))
    }

    pub fn shared(config: &SessionStoreConfig) -> SharedMap<K, V> {
        Arc::new(RwLock::new(Self::from_config(config)))
    }

    /// Returns the evicted key when the map was full.
    pub fn insert(&mut self, key: K, value: V) -> Option<K> {
        let full = self.entries.len() >= self.max_entries;
        let evicted = if full && !self.entries.contains_key(&key) {
            self.evict_oldest()
        } else {
            None
        };

        self.entries.insert(
            key,
            Entry {
                value,
                touched: Instant::now(),
            },
        );
        evicted
    }

    fn evict_oldest(&mut self) -> Option<K> {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.touched)
            .map(|(key, _)| key.clone())?;
        self.entries.remove(&oldest);
        Some(oldest)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Mutable access also counts as activity for expiry and eviction.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key).map(|entry| {
            entry.touched = Instant::now();
            &mut entry.value
        })
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop entries idle for longer than the TTL. Returns how many went.
    pub fn purge_expired(&mut self) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.touched.elapsed() <= ttl);
        before - self.entries.len()
    }
}

/// Purge `map` every `period` for the life of the process.
pub fn spawn_expiry_sweep<K, V>(
    name: &'static str,
    map: SharedMap<K, V>,
    period: Duration,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let purged = map.write().await.purge_expired();
            if purged > 0 {
                debug!(map = name, purged, "Expired idle entries");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_insert_past_limit_evicts_oldest() {
        let mut map = BoundedMap::new(2, Duration::from_secs(60));
        assert_eq!(map.insert("a", 1), None);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(map.insert("b", 2), None);
        tokio::time::advance(Duration::from_secs(1)).await;

        assert_eq!(map.insert("c", 3), Some("a"));
        assert_eq!(map.len(), 2);
        assert!(map.get(&"a").is_none());
        assert_eq!(map.get(&"b"), Some(&2));
        assert_eq!(map.get(&"c"), Some(&3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_touched_entry_survives_eviction() {
        let mut map = BoundedMap::new(2, Duration::from_secs(60));
        map.insert("a", 1);
        tokio::time::advance(Duration::from_secs(1)).await;
        map.insert("b", 2);
        tokio::time::advance(Duration::from_secs(1)).await;

        *map.get_mut(&"a").unwrap() += 10;
        assert_eq!(map.insert("c", 3), Some("b"));
        assert_eq!(map.get(&"a"), Some(&11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replacing_key_does_not_evict() {
        let mut map = BoundedMap::new(1, Duration::from_secs(60));
        map.insert("a", 1);
        assert_eq!(map.insert("a", 2), None);
        assert_eq!(map.get(&"a"), Some(&2));
        assert_eq!(map.remove(&"a"), Some(2));
        assert!(map.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_drops_idle_entries() {
        let mut map = BoundedMap::new(10, Duration::from_secs(30));
        map.insert("old", 1);
        tokio::time::advance(Duration::from_secs(20)).await;
        map.insert("new", 2);
        tokio::time::advance(Duration::from_secs(15)).await;

        assert_eq!(map.purge_expired(), 1);
        assert!(!map.contains_key(&"old"));
        assert!(map.contains_key(&"new"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_task_purges_on_interval() {
        let map: SharedMap<&'static str, u32> =
            Arc::new(RwLock::new(BoundedMap::new(10, Duration::from_secs(30))));
        map.write().await.insert("a", 1);
        let sweep = spawn_expiry_sweep("test", map.clone(), Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(map.read().await.len(), 1);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(map.read().await.is_empty());
        sweep.abort();
    }
}
