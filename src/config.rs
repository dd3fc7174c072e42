use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with the unpaired last node of an odd-sized level.
///
/// The choice changes the root, so it must match whatever contract verifies
/// the proofs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OddNodePolicy {
    /// Carry the node up to the next level unchanged. Its proof has no entry
    /// for that level.
    #[default]
    Promote,
    /// Hash the node with itself. Its proof repeats the node for that level.
    Duplicate,
}

impl fmt::Display for OddNodePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OddNodePolicy::Promote => f.write_str("promote"),
            OddNodePolicy::Duplicate => f.write_str("duplicate"),
        }
    }
}

/// Tree construction knobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeOptions {
    /// Sort leaves by byte value before pairing. With this on, the root only
    /// depends on the set of claims, not on the order they were supplied in.
    pub sort_leaves: bool,
    pub odd_node: OddNodePolicy,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            sort_leaves: true,
            odd_node: OddNodePolicy::Promote,
        }
    }
}
