use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, OnceLock},
};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    cache::{local::LocalCache, ByteView},
    coalesce::CallCoalescer,
    distribution::{PeerGetter, PeerPicker},
    error::{BoxError, Error, Result},
};

/// Source of truth consulted when neither the local cache nor a peer has the key.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> std::result::Result<Vec<u8>, BoxError>;
}

/// Adapts an async closure into a [`Getter`].
pub struct GetterFn<F>(pub F);

#[async_trait]
impl<F, Fut> Getter for GetterFn<F>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Vec<u8>, BoxError>> + Send + 'static,
{
    async fn get(&self, key: &str) -> std::result::Result<Vec<u8>, BoxError> {
        (self.0)(key.to_string()).await
    }
}

/// A named cache namespace.
///
/// Lookups go to the local cache first, then to the peer owning the key, and
/// finally to the group's [`Getter`]. Concurrent misses on the same key share a
/// single load.
pub struct Group {
    name: String,
    getter: Box<dyn Getter>,
    main_cache: LocalCache,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: CallCoalescer<ByteView>,
}

impl Group {
    pub fn new<G>(name: impl Into<String>, cache_bytes: usize, getter: G) -> Self
    where
        G: Getter + 'static,
    {
        Self {
            name: name.into(),
            getter: Box::new(getter),
            main_cache: LocalCache::new(cache_bytes),
            peers: OnceLock::new(),
            loader: CallCoalescer::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The group's local cache
    pub fn cache(&self) -> &LocalCache {
        &self.main_cache
    }

    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }

        if let Some(value) = self.main_cache.get(key) {
            debug!("[{}] Cache hit for {}", self.name, key);
            return Ok(value);
        }

        self.load(key).await
    }

    /// Installs the peer picker. Panics if peers were already registered.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("register_peers called more than once on group {}", self.name);
        }
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        self.loader
            .execute(key, || async {
                if let Some(peer) = self.peers.get().and_then(|peers| peers.pick_peer(key)) {
                    match self.get_from_peer(peer.as_ref(), key).await {
                        Ok(value) => return Ok(value),
                        Err(e) => warn!("[{}] Failed to get {} from peer: {}", self.name, key, e),
                    }
                }

                self.get_locally(key).await
            })
            .await
    }

    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        let bytes = self.getter.get(key).await.map_err(Error::from_source)?;
        let value = ByteView::from(bytes);
        self.populate_cache(key, value.clone());
        Ok(value)
    }

    /// Values owned by another peer are not cached here; only the owner keeps a copy.
    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.fetch(&self.name, key).await?;
        Ok(ByteView::new(bytes))
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value)
    }
}

/// Groups known to this process, by name.
#[derive(Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a group and registers it under its name, replacing any group
    /// previously registered with that name.
    pub fn new_group<G>(&self, name: impl Into<String>, cache_bytes: usize, getter: G) -> Arc<Group>
    where
        G: Getter + 'static,
    {
        let group = Arc::new(Group::new(name, cache_bytes, getter));
        let previous = self
            .groups
            .write()
            .insert(group.name().to_string(), group.clone());
        if previous.is_some() {
            warn!("Group {} replaced", group.name());
        } else {
            info!("Group {} created ({} bytes)", group.name(), cache_bytes);
        }
        group
    }

    pub fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }
}
