//! Protocol constants for WRAITH.
//!
//! Sizes follow SEC1 encodings of secp256k1 points and Ethereum conventions.
//! Derivation labels must never change: every derived key depends on them.

// ═══════════════════════════════════════════════════════════════════════════════
// SECP256K1 SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of a private key (scalar) in bytes.
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Size of a compressed SEC1 point: parity prefix (1) + x-coordinate (32).
pub const COMPRESSED_POINT_SIZE: usize = 33;

/// Size of an uncompressed SEC1 point: prefix (1) + x (32) + y (32).
pub const UNCOMPRESSED_POINT_SIZE: usize = 65;

/// Size of a bare x-coordinate, as sometimes found in announcement feeds.
pub const X_COORDINATE_SIZE: usize = 32;

/// SEC1 prefix for a compressed point with even y.
pub const EVEN_Y_PREFIX: u8 = 0x02;

/// SEC1 prefix for a compressed point with odd y.
pub const ODD_Y_PREFIX: u8 = 0x03;

/// SEC1 prefix for an uncompressed point.
pub const UNCOMPRESSED_PREFIX: u8 = 0x04;

// ═══════════════════════════════════════════════════════════════════════════════
// META-ADDRESS FORMAT
// ═══════════════════════════════════════════════════════════════════════════════

/// Prefix of every stealth meta-address (EIP-5564, Ethereum, hex payload).
pub const META_ADDRESS_PREFIX: &str = "st:eth:0x";

/// Hex characters for one compressed point.
pub const POINT_HEX_LEN: usize = COMPRESSED_POINT_SIZE * 2;

/// Hex characters after the prefix: spending point followed by viewing point.
pub const META_ADDRESS_HEX_LEN: usize = POINT_HEX_LEN * 2;

// ═══════════════════════════════════════════════════════════════════════════════
// VIEW TAG CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of view tag in bytes.
/// 1 byte rejects 255/256 of foreign announcements before any point addition.
pub const VIEW_TAG_SIZE: usize = 1;

/// Number of possible view tag values (2^8 = 256).
pub const VIEW_TAG_SPACE: usize = 256;

/// Expected filtering efficiency as a percentage.
pub const VIEW_TAG_EFFICIENCY: f64 = 99.609375; // (255/256) * 100

// ═══════════════════════════════════════════════════════════════════════════════
// KEY DERIVATION
// ═══════════════════════════════════════════════════════════════════════════════

/// HKDF salt for the spending key.
pub const HKDF_SPENDING_SALT: &[u8] = b"EIP-5564-spending-key";

/// HKDF salt for the viewing key.
pub const HKDF_VIEWING_SALT: &[u8] = b"EIP-5564-viewing-key";

/// Suffix appended to the challenge message to form the spending HKDF info.
pub const HKDF_SPENDING_INFO_SUFFIX: &[u8] = b"-spending";

/// Suffix appended to the challenge message to form the viewing HKDF info.
pub const HKDF_VIEWING_INFO_SUFFIX: &[u8] = b"-viewing";

/// Static challenge signed by the credential.
/// Changing it changes every key derived from every credential.
pub const DEFAULT_SIGNING_MESSAGE: &str = "cannes-love-poap";

/// Upper bound on rehash attempts when normalizing HKDF output into a scalar.
pub const MAX_NORMALIZE_ATTEMPTS: usize = 8;

/// Default time allowed for the credential signer to answer, in seconds.
pub const DEFAULT_SIGN_TIMEOUT_SECS: u64 = 60;

/// Key under which credential descriptors are kept in a [`crate::CredentialStore`].
pub const CREDENTIAL_STORAGE_KEY: &str = "wraith-webauthn-credentials";

/// Credential type reported for every WebAuthn descriptor.
pub const CREDENTIAL_KIND: &str = "public-key";

// ═══════════════════════════════════════════════════════════════════════════════
// ETHEREUM CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of Ethereum address in bytes (20 bytes = 160 bits).
pub const ETH_ADDRESS_SIZE: usize = 20;

/// Size of keccak256 hash output.
pub const KECCAK256_SIZE: usize = 32;

/// EIP-5564 scheme id for secp256k1 with view tags.
pub const SCHEME_ID_SECP256K1: u64 = 1;

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Blocks fetched per feed request.
pub const DEFAULT_BLOCK_INTERVAL: u64 = 10_000;

/// Largest block window a single feed request may cover.
pub const MAX_BLOCK_INTERVAL: u64 = 100_000;

/// Upper bound on concurrent scan shards.
pub const MAX_SCAN_SHARDS: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_sizes() {
        assert_eq!(COMPRESSED_POINT_SIZE, 1 + X_COORDINATE_SIZE);
        assert_eq!(UNCOMPRESSED_POINT_SIZE, 1 + 2 * X_COORDINATE_SIZE);
    }

    #[test]
    fn test_meta_address_length() {
        assert_eq!(META_ADDRESS_PREFIX.len(), 9);
        assert_eq!(META_ADDRESS_HEX_LEN, 132);
    }

    #[test]
    fn test_view_tag_efficiency_calculation() {
        let expected_efficiency = (255.0 / 256.0) * 100.0;
        assert!((VIEW_TAG_EFFICIENCY - expected_efficiency).abs() < 0.0001);
    }

    #[test]
    fn test_hkdf_labels_unique() {
        assert_ne!(HKDF_SPENDING_SALT, HKDF_VIEWING_SALT);
        assert_ne!(HKDF_SPENDING_INFO_SUFFIX, HKDF_VIEWING_INFO_SUFFIX);
    }
}
