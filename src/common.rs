use anyhow::Context;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{MerkleError, Result};
use crate::hasher::Hash;

/// Strips an optional `0x`/`0X` prefix and surrounding whitespace.
pub fn strip_hex_prefix(s: &str) -> &str {
    let trimmed = s.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Parses an Ethereum address from a hex string.
///
/// # Arguments
/// * `addr_str` - The address string, with or without "0x" prefix, any case
///
/// # Returns
/// A 20-byte array representing the address
///
/// # Errors
/// Returns [`MerkleError::Encoding`] if the address is not 40 hex characters
/// or contains invalid hex
pub fn parse_address(addr_str: &str) -> Result<[u8; 20]> {
    let cleaned = strip_hex_prefix(addr_str);
    if cleaned.len() != 40 {
        return Err(MerkleError::Encoding(format!(
            "invalid address length: expected 40 hex chars, got {}",
            cleaned.len()
        )));
    }
    let mut address = [0u8; 20];
    hex::decode_to_slice(cleaned, &mut address)
        .map_err(|e| MerkleError::Encoding(format!("invalid address hex: {}", e)))?;
    Ok(address)
}

/// Parses a 32-byte hash (root or proof node) from a hex string.
pub fn parse_hash(hash_str: &str) -> Result<Hash> {
    let cleaned = strip_hex_prefix(hash_str);
    if cleaned.len() != 64 {
        return Err(MerkleError::MalformedHash(format!(
            "expected 64 hex chars, got {}",
            cleaned.len()
        )));
    }
    let mut hash = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut hash)
        .map_err(|e| MerkleError::MalformedHash(format!("invalid hex encoding: {}", e)))?;
    Ok(hash)
}

/// Renders bytes as `0x`-prefixed lowercase hex.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Writes `contents` to `path` through a sibling `.tmp` file and a rename, so a
/// reader never observes a half-written file.
pub fn write_file_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)
        .with_context(|| format!("Failed to create temp file {:?}", temp_path))?;
    file.write_all(contents.as_bytes())
        .context("Failed to write to temp file")?;
    file.flush().context("Failed to flush temp file")?;
    file.sync_all().context("Failed to sync temp file")?;
    drop(file);
    std::fs::rename(&temp_path, path).context("Failed to move temp file to output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_with_prefix() {
        let addr = "0x1234567890abcdef1234567890abcdef12345678";
        let result = parse_address(addr).unwrap();
        assert_eq!(result[0], 0x12);
        assert_eq!(result[19], 0x78);
    }

    #[test]
    fn test_parse_address_without_prefix() {
        let addr = "1234567890abcdef1234567890abcdef12345678";
        let result = parse_address(addr).unwrap();
        assert_eq!(result.len(), 20);
    }

    #[test]
    fn test_parse_address_case_insensitive() {
        let lower = parse_address("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd").unwrap();
        let upper = parse_address("0XABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_parse_address_invalid_length() {
        let result = parse_address("0x1234");
        assert!(matches!(result, Err(MerkleError::Encoding(_))));
    }

    #[test]
    fn test_parse_address_invalid_hex() {
        let addr = "0xghijklmnopqrstuvwxyz1234567890abcdefghij";
        let result = parse_address(addr);
        assert!(matches!(result, Err(MerkleError::Encoding(_))));
    }

    #[test]
    fn test_parse_hash() {
        let hash = parse_hash(&format!("0x{}", "ab".repeat(32))).unwrap();
        assert_eq!(hash, [0xab; 32]);
        assert!(matches!(
            parse_hash("0xabcd"),
            Err(MerkleError::MalformedHash(_))
        ));
        assert!(matches!(
            parse_hash(&"zz".repeat(32)),
            Err(MerkleError::MalformedHash(_))
        ));
    }

    #[test]
    fn test_hex_encode() {
        assert_eq!(hex_encode([0x0a, 0xff]), "0x0aff");
    }

    #[test]
    fn test_write_file_atomic() {
        let dir = tempfile::TempDir::new().expect("tmpdir");
        let path = dir.path().join("merkleData.json");
        write_file_atomic(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
        assert!(!path.with_extension("tmp").exists());

        write_file_atomic(&path, "{\"root\":1}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"root\":1}");
    }
}
