use std::{borrow::Borrow, hash::Hash};

use ::lru::LruCache as RecencyList;
use tracing::debug;

use super::Value;

/// Called with every entry pushed out of the cache.
pub type OnEvicted<V> = Box<dyn FnMut(String, V) + Send>;

/// Byte-bounded least-recently-used cache.
///
/// The size of an entry is the length of its key plus the length of its value.
/// Not thread safe: callers wrap it in a lock (see [`super::local::LocalCache`]).
pub struct LruCache<V>
where
    V: Value,
{
    /// 0 means unbounded
    max_bytes: usize,
    used_bytes: usize,
    entries: RecencyList<String, V>,
    on_evicted: Option<OnEvicted<V>>,
}

impl<V> LruCache<V>
where
    V: Value,
{
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            entries: RecencyList::unbounded(),
            on_evicted: None,
        }
    }

    pub fn with_eviction<F>(max_bytes: usize, on_evicted: F) -> Self
    where
        F: FnMut(String, V) + Send + 'static,
    {
        Self {
            on_evicted: Some(Box::new(on_evicted)),
            ..Self::new(max_bytes)
        }
    }

    /// Look up `key` and mark it as the most recently used entry.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        String: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    /// Presence check that leaves the recency order untouched.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        String: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains(key)
    }

    pub fn add(&mut self, key: String, value: V) {
        let key_len = key.len();
        let value_len = value.len();
        match self.entries.put(key, value) {
            Some(old) => self.used_bytes = self.used_bytes + value_len - old.len(),
            None => self.used_bytes += key_len + value_len,
        }
        while self.max_bytes != 0 && self.used_bytes > self.max_bytes {
            self.remove_oldest();
        }
    }

    pub fn remove_oldest(&mut self) {
        if let Some((key, value)) = self.entries.pop_lru() {
            self.used_bytes -= key.len() + value.len();
            debug!("Evicted {} ({} bytes still cached)", key, self.used_bytes);
            if let Some(on_evicted) = self.on_evicted.as_mut() {
                on_evicted(key, value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes currently accounted to live entries
    pub fn bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use proptest::prelude::*;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Text(String);

    impl Value for Text {
        fn len(&self) -> usize {
            self.0.len()
        }
    }

    fn text(s: &str) -> Text {
        Text(s.to_string())
    }

    fn evictions() -> (Arc<Mutex<Vec<(String, Text)>>>, impl FnMut(String, Text) + Send) {
        let evicted = Arc::new(Mutex::new(Vec::new()));
        let sink = evicted.clone();
        (evicted, move |k, v| sink.lock().unwrap().push((k, v)))
    }

    #[test]
    fn get_hit_and_miss() {
        let mut cache = LruCache::new(0);
        cache.add("key1".to_string(), text("1234"));
        assert_eq!(cache.get("key1"), Some(&text("1234")));
        assert_eq!(cache.get("key2"), None);
    }

    #[test]
    fn evicts_least_recently_added_first() {
        let (evicted, on_evicted) = evictions();
        let mut cache = LruCache::with_eviction(20, on_evicted);
        cache.add("a".to_string(), text("1"));
        cache.add("b".to_string(), text("2"));
        cache.add("c".to_string(), text("34567890123456789"));

        assert_eq!(
            *evicted.lock().unwrap(),
            vec![("a".to_string(), text("1"))]
        );
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.bytes(), 2 + 18);
    }

    #[test]
    fn get_protects_entry_from_eviction() {
        let (evicted, on_evicted) = evictions();
        let mut cache = LruCache::with_eviction(20, on_evicted);
        cache.add("a".to_string(), text("1"));
        cache.add("b".to_string(), text("2"));
        assert!(cache.get("a").is_some());
        cache.add("c".to_string(), text("34567890123456789"));

        assert_eq!(
            *evicted.lock().unwrap(),
            vec![("b".to_string(), text("2"))]
        );
        assert!(cache.contains("a"));
    }

    #[test]
    fn update_adjusts_size_by_delta() {
        let mut cache = LruCache::new(0);
        cache.add("k".to_string(), text("12345"));
        assert_eq!(cache.bytes(), 6);
        cache.add("k".to_string(), text("12"));
        assert_eq!(cache.bytes(), 3);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), Some(&text("12")));
    }

    #[test]
    fn remove_oldest_on_empty_cache_is_noop() {
        let (evicted, on_evicted) = evictions();
        let mut cache = LruCache::with_eviction(10, on_evicted);
        cache.remove_oldest();
        assert!(cache.is_empty());
        assert_eq!(cache.bytes(), 0);
        assert!(evicted.lock().unwrap().is_empty());
    }

    #[test]
    fn oversized_entry_is_dropped_immediately() {
        let mut cache = LruCache::new(4);
        cache.add("key".to_string(), text("value"));
        assert!(cache.is_empty());
        assert_eq!(cache.bytes(), 0);
    }

    proptest! {
        #[test]
        fn used_bytes_stay_bounded_and_exact(
            max_bytes in 0usize..64,
            ops in prop::collection::vec(("[a-e]{1,3}", "[0-9]{0,12}"), 1..64),
        ) {
            let mut cache = LruCache::new(max_bytes);
            let mut live: std::collections::HashMap<String, String> = Default::default();
            for (key, value) in ops {
                cache.add(key.clone(), Text(value.clone()));
                live.insert(key, value);

                if max_bytes > 0 {
                    prop_assert!(cache.bytes() <= max_bytes);
                }
                live.retain(|k, _| cache.contains(k.as_str()));
                let expected: usize = live.iter().map(|(k, v)| k.len() + v.len()).sum();
                prop_assert_eq!(cache.bytes(), expected);
                prop_assert_eq!(cache.len(), live.len());
            }
        }
    }
}
