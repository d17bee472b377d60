use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use clap::Parser;
use tracing::info;

use peercache::{
    config::Config,
    distribution::http::HttpPool,
    error::BoxError,
    setup::{start_api_server, start_peer_server},
    Getter, GroupRegistry,
};

/// Stand-in for a slow backing database.
struct SlowDb {
    scores: HashMap<&'static str, &'static str>,
}

impl SlowDb {
    fn new() -> Self {
        Self {
            scores: HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]),
        }
    }
}

#[async_trait]
impl Getter for SlowDb {
    async fn get(&self, key: &str) -> Result<Vec<u8>, BoxError> {
        info!("[SlowDB] search key {}", key);
        match self.scores.get(key) {
            Some(score) => Ok(score.as_bytes().to_vec()),
            None => Err(format!("{} not exist", key).into()),
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let registry = Arc::new(GroupRegistry::new());
    let group = registry.new_group(&config.group, config.cache_bytes, SlowDb::new());

    let pool = Arc::new(HttpPool::with_options(
        config.self_addr(),
        registry.clone(),
        config.pool_options(),
    ));
    pool.set_peers(&config.peers);
    group.register_peers(pool.clone());

    let peer_server = start_peer_server(pool, (config.host.as_str(), config.port))?;
    info!("peercache is running at {}", config.self_addr());

    if config.api {
        let api_server = start_api_server(group, (config.host.as_str(), config.api_port))?;
        info!(
            "Frontend server is running at http://{}:{}",
            config.host, config.api_port
        );
        tokio::try_join!(peer_server, api_server)?;
    } else {
        peer_server.await?;
    }

    Ok(())
}
