use std::{borrow::Cow, collections::HashMap, sync::Arc};

use actix_web::{web, HttpRequest, HttpResponse};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use prost::Message;
use reqwest::StatusCode;
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    group::GroupRegistry,
    hash::{HashFn, HashRing, DEFAULT_REPLICAS},
};

use super::{
    wire::{Request, Response},
    PeerGetter, PeerPicker,
};

pub const DEFAULT_BASE_PATH: &str = "/_geecache/";

#[derive(Clone)]
pub struct HttpPoolOptions {
    /// Prefix of every peer request path, with leading and trailing slash
    pub base_path: String,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Ring hash, CRC-32 when unset
    pub hash: Option<HashFn>,
}

impl Default for HttpPoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            hash: None,
        }
    }
}

/// Ring and fetchers for one peer list. Replaced wholesale on membership change.
#[derive(Default)]
struct PeerSet {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

/// HTTP pool of peers.
///
/// Picks the peer owning a key and serves this process's groups to other peers.
pub struct HttpPool {
    /// This peer's base URL, e.g. "http://localhost:8001"
    self_addr: String,
    options: HttpPoolOptions,
    registry: Arc<GroupRegistry>,
    client: reqwest::Client,
    peers: RwLock<Arc<PeerSet>>,
}

impl HttpPool {
    pub fn new(self_addr: impl Into<String>, registry: Arc<GroupRegistry>) -> Self {
        Self::with_options(self_addr, registry, HttpPoolOptions::default())
    }

    pub fn with_options(
        self_addr: impl Into<String>,
        registry: Arc<GroupRegistry>,
        options: HttpPoolOptions,
    ) -> Self {
        Self {
            self_addr: self_addr.into(),
            options,
            registry,
            client: reqwest::Client::new(),
            peers: RwLock::new(Arc::default()),
        }
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.options.base_path
    }

    /// Replaces the peer list. The list should include this peer's own address.
    pub fn set_peers<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let peers: Vec<String> = peers.into_iter().map(Into::into).collect();

        let mut ring = HashRing::new(self.options.replicas, self.options.hash);
        ring.add(&peers);
        let getters = peers
            .iter()
            .map(|peer| {
                let base_url = format!("{}{}", peer, self.options.base_path);
                (peer.clone(), Arc::new(HttpGetter::new(base_url, self.client.clone())))
            })
            .collect();

        *self.peers.write() = Arc::new(PeerSet { ring, getters });
        info!("[Server {}] Peers set to {:?}", self.self_addr, peers);
    }

    /// Answers a peer request for `<base path><group>/<key>` with the encoded value.
    pub async fn serve(&self, method: &str, path: &str) -> Result<Bytes> {
        let Some(rest) = path.strip_prefix(self.base_path()) else {
            warn!("[Server {}] Serving unexpected path: {}", self.self_addr, path);
            return Err(Error::BadPath(path.to_string()));
        };
        info!("[Server {}] {} {}", self.self_addr, method, path);

        let (group_name, key) = rest.split_once('/').ok_or(Error::BadRequest)?;
        let group_name = unescape(group_name)?;
        let key = unescape(key)?;

        let group = self
            .registry
            .get_group(&group_name)
            .ok_or(Error::NoSuchGroup(group_name))?;
        let value = group.get(&key).await?;

        let response = Response {
            value: value.bytes(),
        };
        Ok(Bytes::from(response.encode_to_vec()))
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let peers = self.peers.read().clone();
        match peers.ring.get(key) {
            Some(peer) if peer != self.self_addr => {
                info!("[Server {}] Pick peer {}", self.self_addr, peer);
                peers
                    .getters
                    .get(peer)
                    .map(|getter| getter.clone() as Arc<dyn PeerGetter>)
            }
            _ => None,
        }
    }
}

fn unescape(segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(Cow::into_owned)
        .map_err(|_| Error::BadRequest)
}

/// actix-web handler serving every peer request.
pub async fn handle_peer_request(
    req: HttpRequest,
    pool: web::Data<HttpPool>,
) -> std::result::Result<HttpResponse, Error> {
    let body = pool.serve(req.method().as_str(), req.path()).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/octet-stream")
        .body(body))
}

/// Fetches values from one remote peer.
pub struct HttpGetter {
    /// Peer address followed by the base path
    base_url: String,
    client: reqwest::Client,
}

impl HttpGetter {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn url(&self, request: &Request) -> String {
        format!(
            "{}{}/{}",
            self.base_url,
            urlencoding::encode(&request.group),
            urlencoding::encode(&request.key)
        )
    }
}

#[async_trait]
impl PeerGetter for HttpGetter {
    async fn fetch(&self, group: &str, key: &str) -> Result<Bytes> {
        let request = Request {
            group: group.to_string(),
            key: key.to_string(),
        };
        let res = self.client.get(self.url(&request)).send().await?;
        if res.status() != StatusCode::OK {
            return Err(Error::PeerStatus(res.status()));
        }
        let body = res.bytes().await?;
        Ok(Response::decode(body)?.value)
    }
}
