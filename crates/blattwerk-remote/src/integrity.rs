// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SHA-256 fingerprints for shared files and salted share-link passwords.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// SHA-256 of `salt` followed by `data`, as lowercase hex.
pub fn salted_hash(salt: &[u8], data: &[u8]) -> String {
    hex::encode(Sha256::new().chain_update(salt).chain_update(data).finalize())
}

/// Whether `salt` + `data` hashes to `expected_hex`. The digests are compared
/// in constant time.
pub fn matches_salted_hash(salt: &[u8], data: &[u8], expected_hex: &str) -> bool {
    let Ok(expected) = hex::decode(expected_hex) else {
        return false;
    };
    let actual = Sha256::new().chain_update(salt).chain_update(data).finalize();
    constant_time_eq(&actual, &expected)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}
