use parking_lot::Mutex;

use super::{lru::LruCache, ByteView};

/// Thread-safe local cache owned by a group.
///
/// The lock is only held for the duration of a lookup or insert, never across I/O.
pub struct LocalCache {
    inner: Mutex<LruCache<ByteView>>,
}

impl LocalCache {
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::new(cache_bytes)),
        }
    }

    pub fn get(&self, key: &str) -> Option<ByteView> {
        self.inner.lock().get(key).cloned()
    }

    pub fn add(&self, key: &str, value: ByteView) {
        self.inner.lock().add(key.to_string(), value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn bytes(&self) -> usize {
        self.inner.lock().bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_values_across_threads() {
        let cache = std::sync::Arc::new(LocalCache::new(1024));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.add(&format!("key{i}"), ByteView::from("v")))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.bytes(), 4 * 5);
        assert_eq!(cache.get("key2"), Some(ByteView::from("v")));
    }
}
