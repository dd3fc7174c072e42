use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use airdrop_merkle::{
    hex_encode, parse_address, parse_hash, verify_hex, write_file_atomic, Amount, MerkleData,
};

#[derive(Parser, Debug)]
#[command(about = "Extract the claim and proof for one address", long_about = None)]
pub struct Cli {
    /// Merkle data JSON produced by build-tree
    #[arg(short, long, default_value = "merkleData.json")]
    data: PathBuf,

    /// Claimer address (hex, with or without 0x prefix)
    #[arg(short, long)]
    address: String,

    /// Output JSON file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ClaimOutput {
    merkle_root: String,
    claimer_address: String,
    amount: Amount,
    leaf: String,
    leaf_index: usize,
    merkle_proof: Vec<String>,
}

fn find_claim(data: &MerkleData, address: &[u8; 20]) -> Result<ClaimOutput> {
    let claims = data.claims().context("Invalid merkle data")?;
    let leaf_index = claims
        .iter()
        .position(|claim| claim.address == *address)
        .context("Address not found in claim list")?;
    let claim = &claims[leaf_index];
    let proof = &data.proofs[leaf_index];

    let root = parse_hash(&data.root).context("Invalid Merkle root")?;
    if !verify_hex(&claim.leaf(), proof, &root)? {
        anyhow::bail!(
            "Proof for {} does not verify against root {}",
            claim.address_hex(),
            data.root
        );
    }

    Ok(ClaimOutput {
        merkle_root: data.root.clone(),
        claimer_address: claim.address_hex(),
        amount: claim.amount,
        leaf: hex_encode(claim.leaf()),
        leaf_index,
        merkle_proof: proof.clone(),
    })
}

pub fn run(cli: Cli) -> Result<()> {
    let address = parse_address(&cli.address).context("Invalid claimer address")?;

    eprintln!("Loading merkle data from {:?}...", cli.data);
    let data = MerkleData::read(&cli.data)?;

    let claim = find_claim(&data, &address)?;
    let json_output = serde_json::to_string_pretty(&claim).context("Failed to serialize JSON")?;

    match &cli.output {
        Some(path) => {
            write_file_atomic(path, &json_output).context("Failed to write claim file")?;
            println!("Claim written to {:?}", path);
            println!("Claimer address: {}", claim.claimer_address);
            println!("Amount: {}", claim.amount);
            println!("Proof length: {} nodes", claim.merkle_proof.len());
        }
        None => println!("{}", json_output),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrop_merkle::{Claim, TreeOptions};

    fn data() -> MerkleData {
        let claims = vec![
            Claim::new([0x11; 20], 100u64),
            Claim::new([0x22; 20], 200u64),
            Claim::new([0x33; 20], 300u64),
        ];
        MerkleData::from_claims(&claims, &TreeOptions::default()).unwrap()
    }

    #[test]
    fn test_find_claim() {
        let data = data();
        let claim = find_claim(&data, &[0x22; 20]).unwrap();
        assert_eq!(claim.leaf_index, 1);
        assert_eq!(claim.amount, Amount::from(200u64));
        assert_eq!(claim.merkle_proof, data.proofs[1]);
        assert_eq!(claim.merkle_root, data.root);
    }

    #[test]
    fn test_find_claim_unknown_address() {
        assert!(find_claim(&data(), &[0x44; 20]).is_err());
    }

    #[test]
    fn test_find_claim_rejects_bad_proof() {
        let mut data = data();
        data.proofs[0].clear();
        assert!(find_claim(&data, &[0x11; 20]).is_err());
    }
}
