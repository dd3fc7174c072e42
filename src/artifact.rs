//! The persisted claim artifact (`merkleData.json`).
//!
//! `addresses[i]`, `amounts[i]` and `proofs[i]` always describe the same
//! claim, in the order the claims were supplied.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::common::{hex_encode, parse_address, parse_hash, write_file_atomic};
use crate::config::TreeOptions;
use crate::error::{MerkleError, Result};
use crate::leaf::{encode_leaf, Amount, Claim};
use crate::proof::verify_hex;
use crate::tree::MerkleTree;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleData {
    pub root: String,
    pub addresses: Vec<String>,
    pub amounts: Vec<Amount>,
    pub proofs: Vec<Vec<String>>,
}

impl MerkleData {
    /// Builds the tree over `claims` and renders root and proofs.
    ///
    /// Every proof is verified against the root before returning.
    pub fn from_claims(claims: &[Claim], options: &TreeOptions) -> Result<Self> {
        let tree = MerkleTree::from_claims(claims, options)?;
        let data = Self::from_tree(claims, &tree)?;
        data.check()?;
        info!(
            claims = claims.len(),
            root = %data.root,
            "generated merkle data"
        );
        Ok(data)
    }

    /// Renders an already-built tree.
    ///
    /// # Errors
    /// [`MerkleError::LengthMismatch`] if `claims` and the tree differ in
    /// size, [`MerkleError::ClaimMismatch`] for the first claim whose leaf is
    /// not the tree's leaf for that input index.
    pub fn from_tree(claims: &[Claim], tree: &MerkleTree) -> Result<Self> {
        if claims.len() != tree.leaf_count() {
            return Err(MerkleError::LengthMismatch {
                addresses: claims.len(),
                amounts: claims.len(),
                proofs: tree.leaf_count(),
            });
        }
        for (index, claim) in claims.iter().enumerate() {
            if tree.leaves()[tree.position_of(index)?] != encode_leaf(claim) {
                return Err(MerkleError::ClaimMismatch { index });
            }
        }

        let proofs: Vec<Vec<String>> = tree
            .proofs()?
            .into_iter()
            .map(|proof| proof.iter().map(hex_encode).collect())
            .collect();

        Ok(Self {
            root: hex_encode(tree.root()),
            addresses: claims.iter().map(Claim::address_hex).collect(),
            amounts: claims.iter().map(|c| c.amount).collect(),
            proofs,
        })
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Reconstructs the claims recorded in the artifact.
    pub fn claims(&self) -> Result<Vec<Claim>> {
        self.ensure_aligned()?;
        self.addresses
            .iter()
            .zip(&self.amounts)
            .map(|(address, amount)| {
                Ok(Claim {
                    address: parse_address(address)?,
                    amount: *amount,
                })
            })
            .collect()
    }

    /// Verifies every recorded proof against the recorded root.
    ///
    /// # Errors
    /// [`MerkleError::SelfCheck`] names the first claim whose proof fails.
    pub fn check(&self) -> Result<()> {
        let root = parse_hash(&self.root)?;
        let claims = self.claims()?;
        if claims.is_empty() {
            return Err(MerkleError::EmptyTree);
        }
        for (index, (claim, proof)) in claims.iter().zip(&self.proofs).enumerate() {
            if !verify_hex(&claim.leaf(), proof, &root)? {
                return Err(MerkleError::SelfCheck { index });
            }
        }
        debug!(claims = claims.len(), "all proofs verify");
        Ok(())
    }

    fn ensure_aligned(&self) -> Result<()> {
        let (addresses, amounts, proofs) =
            (self.addresses.len(), self.amounts.len(), self.proofs.len());
        if addresses != amounts || addresses != proofs {
            return Err(MerkleError::LengthMismatch {
                addresses,
                amounts,
                proofs,
            });
        }
        Ok(())
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the artifact as pretty JSON, atomically.
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        write_file_atomic(path, &self.to_json()?)
    }

    pub fn read(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read merkle data from {:?}", path))?;
        Self::from_json(&content).context("Failed to parse merkle data JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Vec<Claim> {
        vec![
            Claim::new([0x11; 20], 100u64),
            Claim::new([0x22; 20], 200u64),
            Claim::new([0x33; 20], 300u64),
        ]
    }

    #[test]
    fn test_from_claims_aligned() {
        let data = MerkleData::from_claims(&claims(), &TreeOptions::default()).unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data.proofs.len(), 3);
        assert_eq!(
            data.addresses[1],
            "0x2222222222222222222222222222222222222222"
        );
        assert_eq!(data.amounts[2], Amount::from(300u64));
        assert!(data.root.starts_with("0x"));
        assert_eq!(data.root.len(), 66);
    }

    #[test]
    fn test_json_field_order_and_shape() {
        let data = MerkleData::from_claims(&claims(), &TreeOptions::default()).unwrap();
        let json = data.to_json().unwrap();
        let root_at = json.find("\"root\"").unwrap();
        let addresses_at = json.find("\"addresses\"").unwrap();
        let amounts_at = json.find("\"amounts\"").unwrap();
        let proofs_at = json.find("\"proofs\"").unwrap();
        assert!(root_at < addresses_at && addresses_at < amounts_at && amounts_at < proofs_at);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["amounts"][0].as_u64(), Some(100));
        assert!(value["proofs"][0].is_array());
    }

    #[test]
    fn test_json_roundtrip_and_check() {
        let data = MerkleData::from_claims(&claims(), &TreeOptions::default()).unwrap();
        let back = MerkleData::from_json(&data.to_json().unwrap()).unwrap();
        assert_eq!(back, data);
        back.check().unwrap();
        assert_eq!(back.claims().unwrap(), claims());
    }

    #[test]
    fn test_check_detects_tampered_amount() {
        let mut data = MerkleData::from_claims(&claims(), &TreeOptions::default()).unwrap();
        data.amounts[1] = Amount::from(201u64);
        assert_eq!(data.check().unwrap_err(), MerkleError::SelfCheck { index: 1 });
    }

    #[test]
    fn test_check_detects_misalignment() {
        let mut data = MerkleData::from_claims(&claims(), &TreeOptions::default()).unwrap();
        data.proofs.pop();
        assert!(matches!(
            data.check(),
            Err(MerkleError::LengthMismatch { proofs: 2, .. })
        ));
    }

    #[test]
    fn test_check_malformed_proof() {
        let mut data = MerkleData::from_claims(&claims(), &TreeOptions::default()).unwrap();
        data.proofs[0][0] = "0xnothex".to_string();
        assert!(matches!(
            data.check(),
            Err(MerkleError::MalformedProof { position: 0, .. })
        ));
    }

    #[test]
    fn test_from_tree_rejects_short_claim_list() {
        let claims = claims();
        let tree = MerkleTree::from_claims(&claims, &TreeOptions::default()).unwrap();
        assert_eq!(
            MerkleData::from_tree(&claims[..2], &tree).unwrap_err(),
            MerkleError::LengthMismatch {
                addresses: 2,
                amounts: 2,
                proofs: 3
            }
        );
    }

    #[test]
    fn test_from_tree_rejects_foreign_claims() {
        let tree = MerkleTree::from_claims(&claims(), &TreeOptions::default()).unwrap();
        let foreign = vec![
            Claim::new([0x44; 20], 400u64),
            Claim::new([0x22; 20], 200u64),
            Claim::new([0x33; 20], 300u64),
        ];
        assert_eq!(
            MerkleData::from_tree(&foreign, &tree).unwrap_err(),
            MerkleError::ClaimMismatch { index: 0 }
        );

        let mut reordered = claims();
        reordered.swap(1, 2);
        assert_eq!(
            MerkleData::from_tree(&reordered, &tree).unwrap_err(),
            MerkleError::ClaimMismatch { index: 1 }
        );
    }

    #[test]
    fn test_from_tree_matches_from_claims() {
        let claims = claims();
        let tree = MerkleTree::from_claims(&claims, &TreeOptions::default()).unwrap();
        let data = MerkleData::from_tree(&claims, &tree).unwrap();
        data.check().unwrap();
        assert_eq!(
            data,
            MerkleData::from_claims(&claims, &TreeOptions::default()).unwrap()
        );
    }

    #[test]
    fn test_from_claims_empty() {
        let err = MerkleData::from_claims(&[], &TreeOptions::default()).unwrap_err();
        assert_eq!(err, MerkleError::EmptyTree);
    }
}
