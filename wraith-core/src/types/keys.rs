//! Key types for WRAITH.
//!
//! This module defines the byte-level key structures used in the protocol:
//!
//! - [`CompressedPoint`]: 33-byte compressed secp256k1 public key
//! - [`PrivateKey`]: 32-byte scalar (zeroized on drop)
//! - [`KeyPair`]: Combined public + private key
//! - [`StealthKeys`]: Spending + viewing key pairs derived from one credential
//!
//! These types only check lengths and prefixes. Curve membership is checked by
//! `wraith-crypto` when the bytes are turned into curve points.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{COMPRESSED_POINT_SIZE, EVEN_Y_PREFIX, ODD_Y_PREFIX, PRIVATE_KEY_SIZE};
use crate::error::{Result, WraithError};

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Compressed SEC1 encoding of a secp256k1 public key.
///
/// This is safe to share publicly. Two of them make up a meta-address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressedPoint {
    bytes: [u8; COMPRESSED_POINT_SIZE],
}

impl CompressedPoint {
    /// Creates a compressed point from raw bytes.
    ///
    /// # Errors
    /// Returns error if the length is not 33 or the prefix is not `0x02`/`0x03`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != COMPRESSED_POINT_SIZE {
            return Err(WraithError::InvalidKeySize {
                expected: COMPRESSED_POINT_SIZE,
                actual: bytes.len(),
            });
        }
        if bytes[0] != EVEN_Y_PREFIX && bytes[0] != ODD_Y_PREFIX {
            return Err(WraithError::PointDecodeError(format!(
                "invalid compressed prefix 0x{:02x}",
                bytes[0]
            )));
        }

        let mut arr = [0u8; COMPRESSED_POINT_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Creates a compressed point from a fixed-size array without checks.
    pub fn from_array(bytes: [u8; COMPRESSED_POINT_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the point as a fixed-size array reference.
    pub fn as_array(&self) -> &[u8; COMPRESSED_POINT_SIZE] {
        &self.bytes
    }

    /// Returns the 32-byte x-coordinate (drops the parity prefix).
    pub fn x_coordinate(&self) -> &[u8] {
        &self.bytes[1..]
    }

    /// Returns the hex-encoded point (no `0x` prefix).
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parses a point from hex, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for CompressedPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CompressedPoint({}...{})",
            hex::encode(&self.bytes[..5]),
            hex::encode(&self.bytes[COMPRESSED_POINT_SIZE - 4..])
        )
    }
}

impl std::fmt::Display for CompressedPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl Serialize for CompressedPoint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CompressedPoint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PRIVATE KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// A secp256k1 private key as 32 big-endian bytes.
///
/// This key is sensitive and will be automatically zeroized when dropped.
/// Never expose this key in logs or error messages.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: [u8; PRIVATE_KEY_SIZE],
}

impl PrivateKey {
    /// Creates a private key from raw bytes.
    ///
    /// # Errors
    /// Returns error if the length is not 32. Range checks happen in `wraith-crypto`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(WraithError::InvalidKeySize {
                expected: PRIVATE_KEY_SIZE,
                actual: bytes.len(),
            });
        }

        let mut arr = [0u8; PRIVATE_KEY_SIZE];
        arr.copy_from_slice(bytes);
        Ok(Self { bytes: arr })
    }

    /// Creates a private key from a fixed-size array.
    pub fn from_array(bytes: [u8; PRIVATE_KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes of the private key.
    ///
    /// # Security
    /// Handle the returned bytes carefully - do not log or expose them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key as a fixed-size array reference.
    pub fn as_array(&self) -> &[u8; PRIVATE_KEY_SIZE] {
        &self.bytes
    }

    /// Returns `0x`-prefixed hex, 64 digits.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Parses a private key from hex, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose secret key content
        write!(f, "PrivateKey([REDACTED])")
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY PAIR
// ═══════════════════════════════════════════════════════════════════════════════

/// A secp256k1 key pair (public + private).
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    /// Public key (safe to share)
    #[zeroize(skip)]
    pub public: CompressedPoint,
    /// Private key (keep private, auto-zeroized)
    pub private: PrivateKey,
}

impl KeyPair {
    /// Creates a new key pair from public and private keys.
    pub fn new(public: CompressedPoint, private: PrivateKey) -> Self {
        Self { public, private }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}

/// Spending key pair - its private half is needed only to spend.
pub type SpendingKeyPair = KeyPair;

/// Viewing key pair - its private half is enough to scan for payments.
pub type ViewingKeyPair = KeyPair;

/// Complete WRAITH key set (spending + viewing), derived once per credential.
#[derive(Clone, ZeroizeOnDrop)]
pub struct StealthKeys {
    /// Keys for spending from stealth addresses
    pub spending: SpendingKeyPair,
    /// Keys for viewing/scanning announcements
    pub viewing: ViewingKeyPair,
}

impl StealthKeys {
    /// Creates a new key set.
    pub fn new(spending: SpendingKeyPair, viewing: ViewingKeyPair) -> Self {
        Self { spending, viewing }
    }
}

impl std::fmt::Debug for StealthKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StealthKeys")
            .field("spending", &self.spending)
            .field("viewing", &self.viewing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn sample_point() -> [u8; COMPRESSED_POINT_SIZE] {
        let mut bytes = [0x42u8; COMPRESSED_POINT_SIZE];
        bytes[0] = EVEN_Y_PREFIX;
        bytes
    }

    #[test]
    fn test_point_from_bytes() {
        let bytes = sample_point();
        let point = CompressedPoint::from_bytes(&bytes).unwrap();
        assert_eq!(point.as_bytes(), &bytes);
        assert_eq!(point.x_coordinate(), &bytes[1..]);
    }

    #[test]
    fn test_point_wrong_size() {
        let result = CompressedPoint::from_bytes(&[0x02; 32]);
        assert!(matches!(result, Err(WraithError::InvalidKeySize { .. })));
    }

    #[test_case(0x00 ; "zero prefix")]
    #[test_case(0x04 ; "uncompressed prefix")]
    #[test_case(0xff ; "garbage prefix")]
    fn test_point_wrong_prefix(prefix: u8) {
        let mut bytes = sample_point();
        bytes[0] = prefix;
        let result = CompressedPoint::from_bytes(&bytes);
        assert!(matches!(result, Err(WraithError::PointDecodeError(_))));
    }

    #[test]
    fn test_point_hex_roundtrip_accepts_0x() {
        let point = CompressedPoint::from_array(sample_point());
        let parsed = CompressedPoint::from_hex(&point.to_string()).unwrap();
        assert_eq!(point, parsed);
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let sk = PrivateKey::from_array([0x11; PRIVATE_KEY_SIZE]);
        let debug = format!("{:?}", sk);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("11"));
    }

    #[test]
    fn test_private_key_hex_is_padded() {
        let mut bytes = [0u8; PRIVATE_KEY_SIZE];
        bytes[31] = 1;
        let sk = PrivateKey::from_array(bytes);
        assert_eq!(sk.to_hex().len(), 66);
        assert_eq!(PrivateKey::from_hex(&sk.to_hex()).unwrap(), sk);
    }

    #[test]
    fn test_point_serde() {
        let point = CompressedPoint::from_array(sample_point());
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.starts_with("\"0x02"));
        let restored: CompressedPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(point, restored);
    }
}
