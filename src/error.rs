use std::sync::Arc;

use actix_web::{http::StatusCode, ResponseError};
use thiserror::Error;

/// Boxed error returned by a local data source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while loading a key, locally or from a peer.
///
/// Cloneable so that a single coalesced load can hand the same outcome to
/// every caller waiting on it.
#[derive(Clone, Debug, Error)]
pub enum Error {
    #[error("key is required")]
    EmptyKey,

    #[error("no such group: {0}")]
    NoSuchGroup(String),

    /// The local source failed. Displayed verbatim.
    #[error("{0}")]
    Source(Arc<BoxError>),

    #[error("peer request failed: {0}")]
    PeerRequest(Arc<reqwest::Error>),

    #[error("server returned: {0}")]
    PeerStatus(reqwest::StatusCode),

    #[error("failed to decode peer message: {0}")]
    Decode(String),

    #[error("unexpected path: {0}")]
    BadPath(String),

    #[error("bad request")]
    BadRequest,
}

impl Error {
    pub fn from_source<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Source(Arc::new(err.into()))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::PeerRequest(Arc::new(err))
    }
}

impl From<prost::DecodeError> for Error {
    fn from(err: prost::DecodeError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::EmptyKey | Error::BadPath(_) | Error::BadRequest => StatusCode::BAD_REQUEST,
            Error::NoSuchGroup(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
