pub mod local;
pub mod lru;

use std::fmt;

use bytes::Bytes;

/// Anything the eviction cache can hold. Its size counts toward the cache budget.
pub trait Value {
    /// Size of the value in bytes
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable view over a cached value.
///
/// The bytes are owned by the view, so neither the caller nor the source that
/// produced them can change what is stored in the cache.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns an owned copy of the data.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Cheap handle on the same bytes, used when writing the value on the wire.
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }
}

impl Value for ByteView {
    fn len(&self) -> usize {
        ByteView::len(self)
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::new(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_are_independent_of_the_view() {
        let view = ByteView::from("630");
        let mut copy = view.to_vec();
        copy[0] = b'9';
        assert_eq!(view.as_slice(), b"630");
        assert_eq!(view.to_string(), "630");
        assert_eq!(Value::len(&view), 3);
    }
}
