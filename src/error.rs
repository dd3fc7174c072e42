use thiserror::Error;

/// Errors raised by the Merkle core.
///
/// Every variant reflects invalid caller input; nothing here is transient.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MerkleError {
    /// A claim could not be encoded (bad address hex, bad amount).
    #[error("invalid claim encoding: {0}")]
    Encoding(String),

    #[error("cannot build a Merkle tree from zero leaves")]
    EmptyTree,

    #[error("leaf index {index} is out of bounds for tree with {leaves} leaves")]
    IndexOutOfRange { index: usize, leaves: usize },

    /// A proof element is not a 32-byte hex hash.
    #[error("malformed proof element at position {position}: {reason}")]
    MalformedProof { position: usize, reason: String },

    #[error("malformed hash: {0}")]
    MalformedHash(String),

    #[error("artifact arrays are not aligned: {addresses} addresses, {amounts} amounts, {proofs} proofs")]
    LengthMismatch {
        addresses: usize,
        amounts: usize,
        proofs: usize,
    },

    #[error("claim {index} is not the leaf the tree was built from")]
    ClaimMismatch { index: usize },

    #[error("proof for claim {index} does not verify against the root")]
    SelfCheck { index: usize },
}

pub type Result<T> = std::result::Result<T, MerkleError>;
