use std::collections::HashMap;

/// Maps bytes to a position on the ring.
pub type HashFn = fn(&[u8]) -> u32;

pub const DEFAULT_REPLICAS: usize = 50;

/// CRC-32 (IEEE) checksum, the default ring hash.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Consistent hash ring.
///
/// Every node is hashed onto the ring `replicas` times (as `"{i}{node}"`), and a
/// key belongs to the node owning the first virtual node whose hash is greater
/// than or equal to the key's hash, wrapping around past the end of the ring.
/// Nodes can only be added; a membership change means building a fresh ring.
#[derive(Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted virtual node hashes
    keys: Vec<u32>,
    owners: HashMap<u32, String>,
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_REPLICAS, None)
    }
}

impl HashRing {
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32),
            replicas,
            keys: Vec::new(),
            owners: HashMap::new(),
        }
    }

    pub fn add<I, S>(&mut self, nodes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for node in nodes {
            let node = node.as_ref();
            for i in 0..self.replicas {
                let hash = (self.hash)(format!("{}{}", i, node).as_bytes());
                self.keys.push(hash);
                self.owners.insert(hash, node.to_string());
            }
        }
        self.keys.sort_unstable();
        self.keys.dedup();
    }

    /// Node owning `key`, or `None` on an empty ring.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }
        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&vnode| vnode < hash);
        self.owners
            .get(&self.keys[idx % self.keys.len()])
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Treats the input as a decimal number so ring positions are predictable.
    fn decimal(data: &[u8]) -> u32 {
        std::str::from_utf8(data).unwrap().parse().unwrap()
    }

    #[test]
    fn empty_ring_has_no_owner() {
        assert_eq!(HashRing::default().get("anything"), None);
    }

    #[test]
    fn picks_first_virtual_node_at_or_after_key() {
        // Virtual nodes: 2, 4, 6, 12, 14, 16, 22, 24, 26
        let mut ring = HashRing::new(3, Some(decimal));
        ring.add(["6", "4", "2"]);

        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "2")];
        for (key, owner) in cases {
            assert_eq!(ring.get(key), Some(owner), "key {key}");
        }

        // Virtual nodes 8, 18, 28 join
        ring.add(["8"]);
        let cases = [("2", "2"), ("11", "2"), ("23", "4"), ("27", "8")];
        for (key, owner) in cases {
            assert_eq!(ring.get(key), Some(owner), "key {key}");
        }
    }

    #[test]
    fn adding_a_node_moves_only_some_keys() {
        let nodes = ["http://localhost:8001", "http://localhost:8002", "http://localhost:8003"];
        let mut ring = HashRing::default();
        ring.add(nodes);

        let keys: Vec<String> = (0..1000).map(|i| format!("key-{i}")).collect();
        let before: Vec<String> = keys
            .iter()
            .map(|k| ring.get(k).unwrap().to_string())
            .collect();

        ring.add(["http://localhost:8004"]);
        let mut moved = 0;
        for (key, old_owner) in keys.iter().zip(&before) {
            let new_owner = ring.get(key).unwrap();
            if new_owner != old_owner.as_str() {
                assert_eq!(new_owner, "http://localhost:8004");
                moved += 1;
            }
        }
        assert!(moved > 0);
        assert!(moved < keys.len() / 2, "{moved} keys moved");
    }

    proptest! {
        #[test]
        fn rings_built_alike_agree(
            nodes in prop::collection::vec("[a-z0-9:.]{1,12}", 1..6),
            keys in prop::collection::vec(".{0,16}", 1..32),
        ) {
            let mut a = HashRing::default();
            let mut b = HashRing::default();
            a.add(&nodes);
            b.add(&nodes);
            for key in &keys {
                let owner = a.get(key);
                prop_assert!(owner.is_some());
                prop_assert_eq!(owner, b.get(key));
                prop_assert_eq!(owner, a.get(key));
            }
        }
    }
}
