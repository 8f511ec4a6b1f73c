//! Address types for WRAITH.
//!
//! - [`MetaAddress`]: The public `st:eth:0x…` address a recipient publishes once
//! - [`EthAddress`]: A 20-byte Ethereum address, used for stealth addresses and callers

use serde::{Deserialize, Serialize};

use super::serde_hex;
use super::CompressedPoint;
use crate::constants::{ETH_ADDRESS_SIZE, META_ADDRESS_PREFIX};
use crate::error::{Result, WraithError};

// ═══════════════════════════════════════════════════════════════════════════════
// META-ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A stealth meta-address: the recipient's spending and viewing public keys.
///
/// `Display` produces the canonical text form. Parsing lives in `wraith-crypto`
/// (`decode_meta_address`), since both halves must be validated as curve points.
///
/// # Example
/// ```ignore
/// use wraith_core::MetaAddress;
///
/// let meta = MetaAddress::new(keys.spending.public, keys.viewing.public);
/// let published = meta.to_string(); // "st:eth:0x02…03…"
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MetaAddress {
    /// Spending public key - used to derive stealth addresses
    pub spending_pk: CompressedPoint,
    /// Viewing public key - used for scanning announcements
    pub viewing_pk: CompressedPoint,
}

impl MetaAddress {
    /// Creates a meta-address from its two public keys.
    pub fn new(spending_pk: CompressedPoint, viewing_pk: CompressedPoint) -> Self {
        Self {
            spending_pk,
            viewing_pk,
        }
    }

    /// Encodes as `st:eth:0x` followed by 132 lowercase hex characters.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}",
            META_ADDRESS_PREFIX,
            self.spending_pk.to_hex(),
            self.viewing_pk.to_hex()
        )
    }
}

impl std::fmt::Display for MetaAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for MetaAddress {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ETHEREUM ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A 20-byte Ethereum address.
///
/// Serialized as `0x` + 40 lowercase hex characters. Parsing is case-insensitive,
/// so checksummed (mixed-case) input compares equal to its lowercase form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EthAddress {
    bytes: [u8; ETH_ADDRESS_SIZE],
}

impl EthAddress {
    /// Creates an address from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != ETH_ADDRESS_SIZE {
            return Err(WraithError::InvalidStealthAddress(format!(
                "expected {} bytes, got {}",
                ETH_ADDRESS_SIZE,
                bytes.len()
            )));
        }

        let mut arr = [0u8; ETH_ADDRESS_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Creates from a fixed-size array.
    pub fn from_array(bytes: [u8; ETH_ADDRESS_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the address as a fixed-size array reference.
    pub fn as_array(&self) -> &[u8; ETH_ADDRESS_SIZE] {
        &self.bytes
    }

    /// Returns `0x`-prefixed lowercase hex.
    pub fn to_hex_string(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Parses from hex string (with or without 0x prefix, any case).
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = serde_hex::decode(s.trim())?;
        Self::from_bytes(&bytes)
    }

    /// Returns the zero address.
    pub fn zero() -> Self {
        Self {
            bytes: [0u8; ETH_ADDRESS_SIZE],
        }
    }

    /// Returns true if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }
}

impl Default for EthAddress {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EthAddress({})", self.to_hex_string())
    }
}

impl std::fmt::Display for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

impl std::str::FromStr for EthAddress {
    type Err = WraithError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for EthAddress {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for EthAddress {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
