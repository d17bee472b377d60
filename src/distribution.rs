pub mod http;
pub mod wire;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer, or `None` when the key belongs to this process
    /// or no peers are known.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

/// Fetches a value from one specific peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn fetch(&self, group: &str, key: &str) -> Result<Bytes>;
}
