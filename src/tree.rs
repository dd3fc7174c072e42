use tracing::{debug, trace};

use crate::config::{OddNodePolicy, TreeOptions};
use crate::error::{MerkleError, Result};
use crate::hasher::{combine, Hash};
use crate::leaf::{encode_leaf, Claim};

/// Binary Merkle tree with every level retained for proof generation.
///
/// `levels()[0]` holds the leaves in tree order (sorted when
/// [`TreeOptions::sort_leaves`] is set); the last level holds only the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
    /// Input index -> position in `levels[0]`.
    positions: Vec<usize>,
    odd_node: OddNodePolicy,
}

impl MerkleTree {
    /// Builds the tree from leaf hashes given in caller order.
    ///
    /// # Errors
    /// Returns [`MerkleError::EmptyTree`] if `leaves` is empty.
    pub fn build(leaves: Vec<Hash>, options: &TreeOptions) -> Result<Self> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyTree);
        }

        let (level0, positions) = if options.sort_leaves {
            canonical_order(&leaves)
        } else {
            let positions = (0..leaves.len()).collect();
            (leaves, positions)
        };

        let mut tree: Vec<Vec<[u8; 32]>> = vec![level0];
        while tree[tree.len() - 1].len() > 1 {
            let next = next_level(&tree[tree.len() - 1], options.odd_node);
            trace!(depth = tree.len(), nodes = next.len(), "hashed level");
            tree.push(next);
        }

        debug!(
            leaves = positions.len(),
            height = tree.len() - 1,
            sorted = options.sort_leaves,
            odd_node = %options.odd_node,
            "built merkle tree"
        );

        Ok(Self {
            levels: tree,
            positions,
            odd_node: options.odd_node,
        })
    }

    /// Encodes each claim into a leaf and builds the tree.
    pub fn from_claims(claims: &[Claim], options: &TreeOptions) -> Result<Self> {
        let leaves = claims.iter().map(encode_leaf).collect();
        Self::build(leaves, options)
    }

    pub fn root(&self) -> Hash {
        // `build` never produces an empty level.
        self.levels[self.levels.len() - 1][0]
    }

    pub fn levels(&self) -> &[Vec<Hash>] {
        &self.levels
    }

    /// Leaves in tree order.
    pub fn leaves(&self) -> &[Hash] {
        &self.levels[0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of levels above the leaves.
    pub fn height(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn odd_node_policy(&self) -> OddNodePolicy {
        self.odd_node
    }

    /// Position in `levels()[0]` of the leaf supplied at `input_index`.
    pub fn position_of(&self, input_index: usize) -> Result<usize> {
        self.positions
            .get(input_index)
            .copied()
            .ok_or(MerkleError::IndexOutOfRange {
                index: input_index,
                leaves: self.positions.len(),
            })
    }

    /// Generates the sibling path for the leaf at `position` in tree order.
    ///
    /// The path is leaf-to-root. Under [`OddNodePolicy::Promote`] a level at
    /// which the node had no sibling contributes nothing; under
    /// [`OddNodePolicy::Duplicate`] it contributes the node itself.
    pub fn prove_index(&self, position: usize) -> Result<Vec<Hash>> {
        if position >= self.leaf_count() {
            return Err(MerkleError::IndexOutOfRange {
                index: position,
                leaves: self.leaf_count(),
            });
        }

        let mut proof = Vec::with_capacity(self.height());
        let mut current_index = position;

        for level in &self.levels[..self.height()] {
            let sibling_index = current_index ^ 1;
            if sibling_index < level.len() {
                proof.push(level[sibling_index]);
            } else if self.odd_node == OddNodePolicy::Duplicate {
                proof.push(level[current_index]);
            }
            current_index /= 2;
        }

        Ok(proof)
    }

    /// Proof for the claim supplied at `input_index`.
    pub fn proof_for(&self, input_index: usize) -> Result<Vec<Hash>> {
        self.prove_index(self.position_of(input_index)?)
    }

    /// One proof per input, in input order.
    pub fn proofs(&self) -> Result<Vec<Vec<Hash>>> {
        (0..self.positions.len())
            .map(|i| self.proof_for(i))
            .collect()
    }
}

/// Sorts leaves ascending by byte value. Ties keep their input order.
fn canonical_order(leaves: &[Hash]) -> (Vec<Hash>, Vec<usize>) {
    let mut order: Vec<usize> = (0..leaves.len()).collect();
    order.sort_by(|&a, &b| leaves[a].cmp(&leaves[b]));

    let mut positions = vec![0usize; leaves.len()];
    for (position, &input_index) in order.iter().enumerate() {
        positions[input_index] = position;
    }
    let sorted = order.iter().map(|&i| leaves[i]).collect();
    (sorted, positions)
}

fn hash_pair(chunk: &[Hash], odd_node: OddNodePolicy) -> Hash {
    match chunk {
        [left, right] => combine(left, right),
        _ => {
            let single = &chunk[0];
            match odd_node {
                OddNodePolicy::Promote => *single,
                OddNodePolicy::Duplicate => combine(single, single),
            }
        }
    }
}

#[cfg(feature = "parallel")]
fn next_level(level: &[Hash], odd_node: OddNodePolicy) -> Vec<Hash> {
    use rayon::prelude::*;
    level
        .par_chunks(2)
        .map(|chunk| hash_pair(chunk, odd_node))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn next_level(level: &[Hash], odd_node: OddNodePolicy) -> Vec<Hash> {
    level
        .chunks(2)
        .map(|chunk| hash_pair(chunk, odd_node))
        .collect()
}
