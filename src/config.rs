use clap::Parser;

use crate::distribution::http::{HttpPoolOptions, DEFAULT_BASE_PATH};
use crate::hash::DEFAULT_REPLICAS;

/// Distributed cache node
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Host name peers use to reach this node
    #[arg(long, env = "PEERCACHE_HOST", default_value = "localhost")]
    pub host: String,

    /// Port of the peer server
    #[arg(long, env = "PEERCACHE_PORT", default_value_t = 8001)]
    pub port: u16,

    /// Base URLs of every peer, this node included
    #[arg(
        long,
        env = "PEERCACHE_PEERS",
        value_delimiter = ',',
        default_values = [
            "http://localhost:8001",
            "http://localhost:8002",
            "http://localhost:8003",
        ]
    )]
    pub peers: Vec<String>,

    /// Also start the front-end API server
    #[arg(long, env = "PEERCACHE_API")]
    pub api: bool,

    /// Port of the front-end API server
    #[arg(long, env = "PEERCACHE_API_PORT", default_value_t = 9999)]
    pub api_port: u16,

    /// Name of the cache group served by this node
    #[arg(long, env = "PEERCACHE_GROUP", default_value = "scores")]
    pub group: String,

    /// Local cache budget in bytes, 0 for unbounded
    #[arg(long, env = "PEERCACHE_CACHE_BYTES", default_value_t = 2 << 10)]
    pub cache_bytes: usize,

    /// Path prefix of peer requests
    #[arg(long, env = "PEERCACHE_BASE_PATH", default_value = DEFAULT_BASE_PATH)]
    pub base_path: String,

    /// Virtual nodes per peer on the hash ring
    #[arg(long, env = "PEERCACHE_REPLICAS", default_value_t = DEFAULT_REPLICAS)]
    pub replicas: usize,
}

impl Config {
    /// URL other peers know this node by
    pub fn self_addr(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn pool_options(&self) -> HttpPoolOptions {
        HttpPoolOptions {
            base_path: self.base_path.clone(),
            replicas: self.replicas,
            hash: None,
        }
    }
}
