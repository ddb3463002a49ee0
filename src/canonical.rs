//! Canonical hashing of graph values and generated content.
//!
//! Values are hashed over their JSON encoding. Struct fields encode in
//! declaration order and every map in hashed data is a `BTreeMap`, so the
//! same value always yields the same digest, across runs and processes.

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Seed for all canonical digests. Changing it invalidates stored fingerprints.
const FINGERPRINT_SEED: u64 = 0;

/// Encode a value as canonical JSON bytes.
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    // Only crate-defined types with string keys reach this; encoding cannot fail.
    serde_json::to_vec(value).expect("canonical encoding of crate types is infallible")
}

/// xxh64 digest of the canonical encoding.
pub fn canonical_hash<T: Serialize + ?Sized>(value: &T) -> u64 {
    xxh64(&to_canonical_bytes(value), FINGERPRINT_SEED)
}

/// Digest as 16 lowercase hex characters.
pub fn canonical_hash_hex<T: Serialize + ?Sized>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_same_value_same_digest() {
        let themes = vec!["Strategy", "Risks"];
        assert_eq!(canonical_hash_hex(&themes), canonical_hash_hex(&themes));
        assert_eq!(canonical_hash_hex(&themes).len(), 16);
    }

    #[test]
    fn test_map_insertion_order_irrelevant() {
        let mut a = BTreeMap::new();
        a.insert("q-2", 1.0);
        a.insert("q-1", 2.0);
        let mut b = BTreeMap::new();
        b.insert("q-1", 2.0);
        b.insert("q-2", 1.0);
        assert_eq!(canonical_hash(&a), canonical_hash(&b));
    }

    #[test]
    fn test_order_of_sequences_matters() {
        assert_ne!(canonical_hash(&["a", "b"]), canonical_hash(&["b", "a"]));
    }
}
