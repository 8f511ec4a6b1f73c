//! secp256k1 point encoding and decoding.
//!
//! Every decode goes through `k256`, which rejects off-curve coordinates and
//! the point at infinity. Nothing here constructs a point without that check.
//!
//! ## Ephemeral keys from a feed
//!
//! Feeds do not always carry the ephemeral key in the form the sender produced
//! it. [`ephemeral_key_candidates`] turns the raw bytes into a short, ordered
//! list of SEC1 encodings to try:
//!
//! ```text
//! 33 bytes, 0x02/0x03 prefix  →  [bytes]
//! 65 bytes, 0x04 prefix       →  [bytes]
//! 32 bytes (bare x)           →  [0x02 ‖ x, 0x03 ‖ x]
//! anything else               →  []
//! ```
//!
//! [`parse_ephemeral_key`] takes the first candidate that decodes.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;

use wraith_core::constants::{
    COMPRESSED_POINT_SIZE, EVEN_Y_PREFIX, ODD_Y_PREFIX, UNCOMPRESSED_POINT_SIZE,
    UNCOMPRESSED_PREFIX, X_COORDINATE_SIZE,
};
use wraith_core::error::{Result, WraithError};
use wraith_core::types::CompressedPoint;

// ═══════════════════════════════════════════════════════════════════════════════
// DECODING
// ═══════════════════════════════════════════════════════════════════════════════

/// Decodes a SEC1 point (compressed or uncompressed) and checks it is on the curve.
pub fn decode_point(bytes: &[u8]) -> Result<PublicKey> {
    PublicKey::from_sec1_bytes(bytes).map_err(|_| {
        WraithError::PointDecodeError(format!(
            "{} bytes do not encode a secp256k1 point",
            bytes.len()
        ))
    })
}

/// Decodes a [`CompressedPoint`] into a curve point.
pub fn decode_compressed(point: &CompressedPoint) -> Result<PublicKey> {
    decode_point(point.as_bytes())
}

/// Returns the SEC1 encodings worth trying for a feed-supplied ephemeral key.
///
/// The list is bounded (at most two entries) and ordered; callers must still
/// validate each entry on the curve.
pub fn ephemeral_key_candidates(bytes: &[u8]) -> Vec<Vec<u8>> {
    match bytes.len() {
        COMPRESSED_POINT_SIZE if bytes[0] == EVEN_Y_PREFIX || bytes[0] == ODD_Y_PREFIX => {
            vec![bytes.to_vec()]
        }
        UNCOMPRESSED_POINT_SIZE if bytes[0] == UNCOMPRESSED_PREFIX => vec![bytes.to_vec()],
        X_COORDINATE_SIZE => [EVEN_Y_PREFIX, ODD_Y_PREFIX]
            .iter()
            .map(|prefix| {
                let mut candidate = Vec::with_capacity(COMPRESSED_POINT_SIZE);
                candidate.push(*prefix);
                candidate.extend_from_slice(bytes);
                candidate
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Parses an announced ephemeral public key.
///
/// # Errors
/// [`WraithError::AnnouncementParseError`] if no candidate encoding decodes to a
/// valid point.
pub fn parse_ephemeral_key(bytes: &[u8]) -> Result<PublicKey> {
    let candidates = ephemeral_key_candidates(bytes);
    if candidates.is_empty() {
        return Err(WraithError::AnnouncementParseError(format!(
            "unsupported ephemeral key encoding ({} bytes)",
            bytes.len()
        )));
    }

    candidates
        .iter()
        .find_map(|candidate| PublicKey::from_sec1_bytes(candidate).ok())
        .ok_or_else(|| {
            WraithError::AnnouncementParseError("ephemeral key is not on the curve".into())
        })
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENCODING
// ═══════════════════════════════════════════════════════════════════════════════

/// Encodes a point in compressed form.
pub fn compress(point: &PublicKey) -> CompressedPoint {
    let encoded = point.to_encoded_point(true);
    let mut bytes = [0u8; COMPRESSED_POINT_SIZE];
    bytes.copy_from_slice(encoded.as_bytes());
    CompressedPoint::from_array(bytes)
}

/// Encodes a point in uncompressed form (`0x04 ‖ x ‖ y`).
pub fn uncompressed(point: &PublicKey) -> [u8; UNCOMPRESSED_POINT_SIZE] {
    let encoded = point.to_encoded_point(false);
    let mut bytes = [0u8; UNCOMPRESSED_POINT_SIZE];
    bytes.copy_from_slice(encoded.as_bytes());
    bytes
}
