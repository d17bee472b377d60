//! Distributed in-process cache.
//!
//! Each process keeps a bounded LRU cache per named [`group::Group`]. On a miss
//! the key's owner is found on a consistent hash ring of peers and asked for the
//! value over HTTP; keys owned by this process are loaded from the group's
//! [`group::Getter`]. Concurrent misses for the same key are coalesced into a
//! single load.

pub mod api;
pub mod cache;
pub mod coalesce;
pub mod config;
pub mod distribution;
pub mod error;
pub mod group;
pub mod hash;
pub mod setup;

pub use cache::ByteView;
pub use error::{Error, Result};
pub use group::{Getter, GetterFn, Group, GroupRegistry};
