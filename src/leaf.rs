//! Claim model and leaf encoding.
//!
//! A leaf commits to one claim as
//! `keccak256(address[20] || amount as 32-byte big-endian)`, the same layout an
//! EVM contract produces with `abi.encodePacked(address, uint256)`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::common::{hex_encode, parse_address, strip_hex_prefix};
use crate::error::{MerkleError, Result};
use crate::hasher::{keccak256, Hash};

/// Width of an encoded leaf preimage.
pub const LEAF_PREIMAGE_LEN: usize = 20 + 32;

/// Unsigned 256-bit claim amount, stored big-endian.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount([u8; 32]);

impl Amount {
    pub const ZERO: Amount = Amount([0u8; 32]);

    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Returns the amount as a `u64` if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0[..24].iter().any(|b| *b != 0) {
            return None;
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.0[24..]);
        Some(u64::from_be_bytes(buf))
    }

    /// Returns the amount as a `u128` if it fits.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[..16].iter().any(|b| *b != 0) {
            return None;
        }
        let mut buf = [0u8; 16];
        buf.copy_from_slice(&self.0[16..]);
        Some(u128::from_be_bytes(buf))
    }

    fn from_hex_digits(digits: &str) -> Result<Self> {
        if digits.is_empty() || digits.len() > 64 {
            return Err(MerkleError::Encoding(format!(
                "amount must have 1 to 64 hex digits, got {}",
                digits.len()
            )));
        }
        let padded = format!("{:0>64}", digits);
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|e| MerkleError::Encoding(format!("invalid amount hex: {}", e)))?;
        Ok(Self(bytes))
    }

    fn from_decimal_digits(digits: &str) -> Result<Self> {
        if digits.is_empty() {
            return Err(MerkleError::Encoding("amount is empty".to_string()));
        }
        let mut bytes = [0u8; 32];
        for c in digits.chars() {
            let digit = c.to_digit(10).ok_or_else(|| {
                MerkleError::Encoding(format!("invalid digit {:?} in amount", c))
            })?;
            if mul_add(&mut bytes, 10, digit) {
                return Err(MerkleError::Encoding(
                    "amount exceeds 32 bytes of precision".to_string(),
                ));
            }
        }
        Ok(Self(bytes))
    }
}

/// `bytes = bytes * mul + add`, big-endian. Returns true on overflow.
fn mul_add(bytes: &mut [u8; 32], mul: u32, add: u32) -> bool {
    let mut carry = add;
    for b in bytes.iter_mut().rev() {
        let v = (*b as u32) * mul + carry;
        *b = (v & 0xff) as u8;
        carry = v >> 8;
    }
    carry != 0
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl FromStr for Amount {
    type Err = MerkleError;

    /// Accepts decimal (`"1000"`) or `0x`-prefixed hex (`"0x3e8"`).
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.starts_with('-') {
            return Err(MerkleError::Encoding(format!(
                "amount must be non-negative, got {}",
                trimmed
            )));
        }
        let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            Self::from_hex_digits(strip_hex_prefix(trimmed))
        } else {
            Self::from_decimal_digits(trimmed)
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.pad("0");
        }
        let mut n = self.0;
        let mut digits = Vec::with_capacity(78);
        while n.iter().any(|b| *b != 0) {
            let mut rem = 0u32;
            for b in n.iter_mut() {
                let cur = (rem << 8) | *b as u32;
                *b = (cur / 10) as u8;
                rem = cur % 10;
            }
            digits.push(b'0' + rem as u8);
        }
        digits.reverse();
        // Only ASCII digits were pushed.
        let s: String = digits.into_iter().map(char::from).collect();
        f.pad(&s)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self)
    }
}

/// JSON integer when the value fits in `u64`, decimal string otherwise, so
/// the output stays readable by parsers limited to 64-bit numbers.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.to_u64() {
            Some(v) => serializer.serialize_u64(v),
            None => serializer.collect_str(self),
        }
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal/hex string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> std::result::Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Amount, E> {
        u64::try_from(v)
            .map(Amount::from)
            .map_err(|_| E::custom(format!("amount must be non-negative, got {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Amount, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// One airdrop entitlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Claim {
    pub address: [u8; 20],
    pub amount: Amount,
}

impl Claim {
    pub fn new(address: [u8; 20], amount: impl Into<Amount>) -> Self {
        Self {
            address,
            amount: amount.into(),
        }
    }

    /// Builds a claim from textual address and amount.
    pub fn parse(address: &str, amount: &str) -> Result<Self> {
        Ok(Self {
            address: parse_address(address)?,
            amount: amount.parse()?,
        })
    }

    /// `0x`-prefixed lowercase address.
    pub fn address_hex(&self) -> String {
        hex_encode(self.address)
    }

    /// The 52-byte leaf preimage: address followed by the big-endian amount.
    pub fn encode(&self) -> [u8; LEAF_PREIMAGE_LEN] {
        let mut buf = [0u8; LEAF_PREIMAGE_LEN];
        buf[..20].copy_from_slice(&self.address);
        buf[20..].copy_from_slice(&self.amount.to_be_bytes());
        buf
    }

    pub fn leaf(&self) -> Hash {
        encode_leaf(self)
    }
}

/// Parses `ADDRESS:AMOUNT`, e.g. `0x1111…1111:100`.
impl FromStr for Claim {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self> {
        let (address, amount) = s.split_once(':').ok_or_else(|| {
            MerkleError::Encoding(format!("expected 'address:amount', got '{}'", s))
        })?;
        Self::parse(address, amount)
    }
}

/// Hashes a claim into its leaf commitment.
pub fn encode_leaf(claim: &Claim) -> Hash {
    keccak256(&claim.encode())
}
