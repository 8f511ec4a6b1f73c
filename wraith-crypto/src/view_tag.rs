//! View tag computation for efficient scanning.
//!
//! View tags enable recipients to quickly filter announcements:
//! - Each announcement carries a 1-byte view tag as `metadata[0]`
//! - Recipients compute their expected view tag from the shared-secret hash
//! - Only announcements with matching view tags require point addition and
//!   address derivation
//!
//! ## Efficiency
//!
//! With 1-byte view tags (256 possible values), ~99.6% of announcements
//! can be skipped after a single ECDH and hash.
//!
//! ## Security
//!
//! View tags leak 1 byte of the shared-secret hash. The stealth scalar is
//! derived from all 32 bytes, so 248 bits stay unknown, and the tag alone cannot
//! identify the recipient. A tag match is a filter result, never a proof of
//! ownership.

use subtle::ConstantTimeEq;

use wraith_core::constants::KECCAK256_SIZE;

/// Computes the view tag from a shared-secret hash: its first byte.
pub fn compute_view_tag(hash: &[u8; KECCAK256_SIZE]) -> u8 {
    hash[0]
}

/// Checks if a view tag matches the expected value for a shared-secret hash.
///
/// This is a constant-time comparison to prevent timing attacks.
pub fn verify_view_tag(hash: &[u8; KECCAK256_SIZE], announced: u8) -> bool {
    compute_view_tag(hash).ct_eq(&announced).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::keccak256;
    use wraith_core::constants::VIEW_TAG_SPACE;

    #[test]
    fn test_view_tag_is_first_byte() {
        let mut hash = [0u8; 32];
        hash[0] = 0xC3;
        hash[1] = 0x01;
        assert_eq!(compute_view_tag(&hash), 0xC3);
    }

    #[test]
    fn test_verify_view_tag() {
        let hash = keccak256(b"shared secret");
        let correct_tag = compute_view_tag(&hash);
        let wrong_tag = correct_tag.wrapping_add(1);

        assert!(verify_view_tag(&hash, correct_tag));
        assert!(!verify_view_tag(&hash, wrong_tag));
    }

    #[test]
    fn test_view_tag_distribution_is_uniform() {
        let mut counts = [0u64; VIEW_TAG_SPACE];
        let samples = 10_000u32;
        for i in 0..samples {
            let hash = keccak256(&i.to_be_bytes());
            counts[compute_view_tag(&hash) as usize] += 1;
        }

        // 255 degrees of freedom: the p=0.001 critical value is ~310
        let expected = samples as f64 / VIEW_TAG_SPACE as f64;
        let chi_sq: f64 = counts
            .iter()
            .map(|&observed| (observed as f64 - expected).powi(2) / expected)
            .sum();
        assert!(chi_sq < 500.0, "view tags are not uniform: chi2 = {}", chi_sq);
    }
}
