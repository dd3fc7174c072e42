use crate::common::parse_hash;
use crate::error::{MerkleError, Result};
use crate::hasher::{combine, Hash};
use crate::leaf::{encode_leaf, Claim};

/// Recomputes the root from `leaf` and its leaf-to-root sibling path and
/// compares it with `root`.
pub fn verify(leaf: &Hash, proof: &[Hash], root: &Hash) -> bool {
    proof
        .iter()
        .fold(*leaf, |current, sibling| combine(&current, sibling))
        == *root
}

/// Same as [`verify`] with the leaf derived from `claim`.
pub fn verify_claim(claim: &Claim, proof: &[Hash], root: &Hash) -> bool {
    verify(&encode_leaf(claim), proof, root)
}

/// Parses a textual proof (hex strings, `0x` optional).
///
/// # Errors
/// Returns [`MerkleError::MalformedProof`] naming the first bad element.
pub fn parse_proof<S: AsRef<str>>(proof: &[S]) -> Result<Vec<Hash>> {
    proof
        .iter()
        .enumerate()
        .map(|(position, node)| {
            parse_hash(node.as_ref()).map_err(|e| MerkleError::MalformedProof {
                position,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// [`verify`] over a textual proof. Returns `Ok(false)` for a well-formed proof
/// that does not reach `root`.
pub fn verify_hex<S: AsRef<str>>(leaf: &Hash, proof: &[S], root: &Hash) -> Result<bool> {
    let proof = parse_proof(proof)?;
    Ok(verify(leaf, &proof, root))
}
