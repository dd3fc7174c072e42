use sha3::{Digest, Keccak256};

/// 32-byte Keccak-256 output used for leaves and interior nodes alike.
pub type Hash = [u8; 32];

/// Keccak-256 (Ethereum flavour, not NIST SHA3-256) of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Computes the parent of two nodes.
///
/// The inputs are ordered by raw byte value before hashing, so
/// `combine(a, b) == combine(b, a)` and a verifier never needs to know which
/// side a sibling came from.
pub fn combine(left: &Hash, right: &Hash) -> Hash {
    let (lo, hi) = if left <= right {
        (left, right)
    } else {
        (right, left)
    };
    let hash = Keccak256::new().chain_update(lo).chain_update(hi).finalize();
    hash.into()
}
