//! Keccak-256 binary Merkle tree over `(address, amount)` airdrop claims.
//!
//! Leaves are `keccak256(address || amount_be32)`. Pairs are hashed with their
//! inputs sorted, leaves are sorted before pairing, and an unpaired node is
//! promoted unchanged by default (see [`OddNodePolicy`]).

pub mod artifact;
pub mod common;
pub mod config;
pub mod error;
pub mod hasher;
pub mod leaf;
pub mod proof;
pub mod tree;

pub use artifact::MerkleData;
pub use common::{hex_encode, parse_address, parse_hash, strip_hex_prefix, write_file_atomic};
pub use config::{OddNodePolicy, TreeOptions};
pub use error::{MerkleError, Result};
pub use hasher::{combine, keccak256, Hash};
pub use leaf::{encode_leaf, Amount, Claim};
pub use proof::{parse_proof, verify, verify_claim, verify_hex};
pub use tree::MerkleTree;
