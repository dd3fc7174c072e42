use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use airdrop_merkle::{parse_hash, MerkleData};

#[derive(Parser, Debug)]
#[command(about = "Verify every proof in a merkle data file", long_about = None)]
pub struct Cli {
    /// Merkle data JSON produced by build-tree
    #[arg(short, long, default_value = "merkleData.json")]
    data: PathBuf,

    /// Expected Merkle root (hex); fails if the file carries a different one
    #[arg(short, long)]
    root: Option<String>,
}

fn ensure_root(data: &MerkleData, expected: &str) -> Result<()> {
    let expected = parse_hash(expected).context("Invalid Merkle root")?;
    let actual = parse_hash(&data.root).context("Invalid Merkle root in data file")?;
    if expected != actual {
        anyhow::bail!(
            "Merkle root mismatch: expected 0x{}, file has {}",
            hex::encode(expected),
            data.root
        );
    }
    Ok(())
}

fn verify_data(data: &MerkleData, expected_root: Option<&str>) -> Result<()> {
    if let Some(expected) = expected_root {
        ensure_root(data, expected)?;
    }
    eprintln!("Verifying {} proofs...", data.len());
    data.check().context("Merkle data failed verification")?;
    Ok(())
}

pub fn run(cli: Cli) -> Result<()> {
    eprintln!("Loading merkle data from {:?}...", cli.data);
    let data = MerkleData::read(&cli.data)?;

    verify_data(&data, cli.root.as_deref())?;

    println!("All {} proofs verify against root {}", data.len(), data.root);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrop_merkle::{Amount, Claim, MerkleError, TreeOptions};

    fn data() -> MerkleData {
        let claims = vec![
            Claim::new([0x11; 20], 100u64),
            Claim::new([0x22; 20], 200u64),
            Claim::new([0x33; 20], 300u64),
            Claim::new([0x44; 20], 400u64),
        ];
        MerkleData::from_claims(&claims, &TreeOptions::default()).unwrap()
    }

    #[test]
    fn test_verify_data_accepts_matching_root() {
        let data = data();
        verify_data(&data, None).unwrap();
        verify_data(&data, Some(&data.root)).unwrap();
        verify_data(&data, Some(&data.root.to_uppercase())).unwrap();
    }

    #[test]
    fn test_verify_data_rejects_wrong_root() {
        let data = data();
        let wrong = format!("0x{}", "00".repeat(32));
        let err = verify_data(&data, Some(&wrong)).unwrap_err();
        assert!(err.to_string().contains("Merkle root mismatch"));
    }

    #[test]
    fn test_verify_data_rejects_malformed_expected_root() {
        let err = verify_data(&data(), Some("0x1234")).unwrap_err();
        assert!(err.to_string().contains("Invalid Merkle root"));
    }

    #[test]
    fn test_verify_data_rejects_tampered_artifact() {
        let mut data = data();
        data.amounts[2] = Amount::from(301u64);
        let err = verify_data(&data, Some(data.root.as_str())).unwrap_err();
        assert_eq!(
            err.downcast_ref::<MerkleError>(),
            Some(&MerkleError::SelfCheck { index: 2 })
        );
    }

    #[test]
    fn test_run_reads_file() {
        let dir = tempfile::TempDir::new().expect("tmpdir");
        let path = dir.path().join("merkleData.json");
        let mut data = data();
        data.write(&path).unwrap();

        let cli = Cli {
            data: path.clone(),
            root: Some(data.root.clone()),
        };
        run(cli).unwrap();

        data.proofs[0][0] = format!("0x{}", "ab".repeat(32));
        data.write(&path).unwrap();
        let cli = Cli {
            data: path,
            root: None,
        };
        assert!(run(cli).is_err());
    }
}
