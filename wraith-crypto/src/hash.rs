//! Hash functions used by the protocol.
//!
//! - **Keccak-256**: shared-secret hashing and Ethereum address derivation
//! - **SHA-256**: credential entropy and scalar normalization
//!
//! Keccak-256 is the pre-standard Keccak, not SHA3-256. They use different
//! padding and produce different digests.

use sha2::Sha256;
use sha3::{Digest, Keccak256};

use wraith_core::constants::KECCAK256_SIZE;

/// Computes Keccak-256 (Ethereum's hash).
pub fn keccak256(input: &[u8]) -> [u8; KECCAK256_SIZE] {
    let mut hasher = Keccak256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// Computes SHA-256.
pub fn sha256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256() {
        let hash = keccak256(b"hello");

        // Known test vector
        let expected = hex::decode(
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        ).unwrap();
        assert_eq!(hash.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_keccak256_empty() {
        let expected = hex::decode(
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        ).unwrap();
        assert_eq!(keccak256(b"").as_slice(), expected.as_slice());
    }

    #[test]
    fn test_sha256() {
        let expected = hex::decode(
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        ).unwrap();
        assert_eq!(sha256(b"abc").as_slice(), expected.as_slice());
    }

    #[test]
    fn test_keccak_is_not_sha256() {
        assert_ne!(keccak256(b"wraith"), sha256(b"wraith"));
    }
}
