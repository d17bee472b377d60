//! Messages exchanged between peers.
//!
//! Encoded with the Protocol Buffers wire format so that nodes written against
//! the same schema in other languages can talk to this one:
//!
//! ```text
//! message Request  { string group = 1; string key = 2; }
//! message Response { bytes value = 1; }
//! ```
//!
//! A request travels in the URL path (`<base path><group>/<key>`), so only
//! [`Response`] bodies are encoded on the wire. [`Request`] names the pair
//! addressed by that path.

use bytes::Bytes;

/// Group and key addressed by a peer request.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct Request {
    #[prost(string, tag = "1")]
    pub group: String,
    #[prost(string, tag = "2")]
    pub key: String,
}

/// Body of a successful peer response.
#[derive(Clone, PartialEq, Eq, prost::Message)]
pub struct Response {
    #[prost(bytes = "bytes", tag = "1")]
    pub value: Bytes,
}
