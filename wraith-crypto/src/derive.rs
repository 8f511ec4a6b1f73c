//! Stealth key and address derivation.
//!
//! This module implements the EIP-5564 secp256k1 scheme's core arithmetic.
//! Sender, scanner and recoverer all go through these functions, so the three
//! parties compute the same values by construction.
//!
//! ## Derivation Flow
//!
//! ```text
//! S          = r·V  (sender)   =  v·R  (recipient)
//! h_bytes    = Keccak256(x(S))
//! view_tag   = h_bytes[0]
//! h          = h_bytes as a scalar, rejected if 0 or ≥ n
//! stealth_pk = spending_pk + h·G
//! address    = Keccak256(uncompressed(stealth_pk)[1..])[12..32]
//! ```
//!
//! ## Private Key Derivation
//!
//! The recipient can derive the stealth private key:
//!
//! ```text
//! stealth_sk = (spending_sk + h) mod n
//! ```

use k256::elliptic_curve::PrimeField;
use k256::{ecdh, FieldBytes, NonZeroScalar, ProjectivePoint, PublicKey, Scalar, SecretKey};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use wraith_core::constants::{ETH_ADDRESS_SIZE, KECCAK256_SIZE};
use wraith_core::error::{Result, WraithError};
use wraith_core::types::EthAddress;

use crate::hash::keccak256;
use crate::point::uncompressed;

/// Keccak-256 of the ECDH shared point's x-coordinate.
///
/// Zeroized on drop; it is as sensitive as the stealth private key it yields.
pub type SharedSecretHash = Zeroizing<[u8; KECCAK256_SIZE]>;

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED SECRET
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes `Keccak256(x(secret·point))`.
///
/// The sender calls this with `(r, V)`, the recipient with `(v, R)`.
pub fn shared_secret_hash(secret: &SecretKey, point: &PublicKey) -> SharedSecretHash {
    let shared = ecdh::diffie_hellman(secret.to_nonzero_scalar(), point.as_affine());
    Zeroizing::new(keccak256(shared.raw_secret_bytes()))
}

/// Interprets a shared-secret hash as a non-zero scalar below the curve order.
///
/// # Errors
/// [`WraithError::StealthDerivationError`] for the (negligibly likely) values
/// `0` and `≥ n`. They are rejected, never reduced.
pub fn hash_to_scalar(hash: &[u8; KECCAK256_SIZE]) -> Result<NonZeroScalar> {
    let scalar: Option<Scalar> = Scalar::from_repr(FieldBytes::from(*hash)).into();
    scalar
        .and_then(|s| Option::<NonZeroScalar>::from(NonZeroScalar::new(s)))
        .ok_or_else(|| {
            WraithError::StealthDerivationError("shared-secret hash is not a valid scalar".into())
        })
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH PUBLIC KEY / ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes `spending_pk + h·G`.
pub fn stealth_public_key(spending_pk: &PublicKey, h: &NonZeroScalar) -> Result<PublicKey> {
    let tweak: Scalar = **h;
    let point = spending_pk.to_projective() + ProjectivePoint::GENERATOR * tweak;
    PublicKey::from_affine(point.to_affine()).map_err(|_| {
        WraithError::StealthDerivationError("stealth public key is the point at infinity".into())
    })
}

/// Derives the Ethereum address of a public key.
///
/// `Keccak256(x ‖ y)[12..32]`, where `x ‖ y` is the uncompressed encoding
/// without its `0x04` prefix.
pub fn eth_address(public_key: &PublicKey) -> EthAddress {
    let encoded = uncompressed(public_key);
    let hash = keccak256(&encoded[1..]);

    let mut address = [0u8; ETH_ADDRESS_SIZE];
    address.copy_from_slice(&hash[KECCAK256_SIZE - ETH_ADDRESS_SIZE..]);
    EthAddress::from_array(address)
}

/// Derives the stealth address from the spending public key and shared-secret hash.
///
/// This is what a sender or scanner computes; the spending private key is not needed.
pub fn derive_stealth_address(
    spending_pk: &PublicKey,
    hash: &[u8; KECCAK256_SIZE],
) -> Result<(PublicKey, EthAddress)> {
    let h = hash_to_scalar(hash)?;
    let stealth_pk = stealth_public_key(spending_pk, &h)?;
    let address = eth_address(&stealth_pk);
    Ok((stealth_pk, address))
}

// ═══════════════════════════════════════════════════════════════════════════════
// STEALTH PRIVATE KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// Computes `(spending_sk + h) mod n`.
///
/// # Errors
/// [`WraithError::StealthDerivationError`] if the sum is zero.
pub fn stealth_private_key(spending_sk: &SecretKey, h: &NonZeroScalar) -> Result<SecretKey> {
    let base: Scalar = *spending_sk.to_nonzero_scalar();
    let tweak: Scalar = **h;
    let sum = base + tweak;

    Option::<NonZeroScalar>::from(NonZeroScalar::new(sum))
        .map(SecretKey::from)
        .ok_or_else(|| WraithError::StealthDerivationError("stealth private key is zero".into()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// VERIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Compares two addresses in constant time.
pub fn addresses_match(derived: &EthAddress, expected: &EthAddress) -> bool {
    derived.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Verifies that a stealth address was derived from `spending_pk` and `hash`.
pub fn verify_stealth_address(
    spending_pk: &PublicKey,
    hash: &[u8; KECCAK256_SIZE],
    expected: &EthAddress,
) -> Result<bool> {
    let (_, derived) = derive_stealth_address(spending_pk, hash)?;
    Ok(addresses_match(&derived, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn secret(seed: u64) -> SecretKey {
        SecretKey::random(&mut ChaCha20Rng::seed_from_u64(seed))
    }

    fn scalar_one() -> SecretKey {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        SecretKey::from_bytes(&FieldBytes::from(bytes)).unwrap()
    }

    #[test]
    fn test_shared_secret_agrees() {
        let ephemeral = secret(1);
        let viewing = secret(2);

        let sender = shared_secret_hash(&ephemeral, &viewing.public_key());
        let recipient = shared_secret_hash(&viewing, &ephemeral.public_key());

        assert_eq!(*sender, *recipient);
    }

    #[test]
    fn test_shared_secret_ignores_point_parity() {
        let viewing = secret(3);
        let ephemeral = secret(4).public_key();
        let negated = PublicKey::from_affine((-ephemeral.to_projective()).to_affine()).unwrap();

        assert_eq!(
            *shared_secret_hash(&viewing, &ephemeral),
            *shared_secret_hash(&viewing, &negated)
        );
    }

    #[test]
    fn test_hash_to_scalar_rejects_degenerate() {
        assert!(matches!(
            hash_to_scalar(&[0u8; 32]),
            Err(WraithError::StealthDerivationError(_))
        ));
        assert!(hash_to_scalar(&[0xFF; 32]).is_err());

        let mut one = [0u8; 32];
        one[31] = 1;
        assert!(hash_to_scalar(&one).is_ok());
    }

    #[test]
    fn test_eth_address_of_generator() {
        // Address of private key 1.
        let address = eth_address(&scalar_one().public_key());
        assert_eq!(
            address.to_hex_string(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_public_and_private_derivations_agree() {
        let spending = secret(5);
        let hash = shared_secret_hash(&secret(6), &secret(7).public_key());
        let h = hash_to_scalar(&hash).unwrap();

        let stealth_pk = stealth_public_key(&spending.public_key(), &h).unwrap();
        let stealth_sk = stealth_private_key(&spending, &h).unwrap();

        assert_eq!(stealth_sk.public_key(), stealth_pk);
        assert_ne!(stealth_pk, spending.public_key());
    }

    #[test]
    fn test_stealth_private_key_wraps_modulo_order() {
        // spending = n - 1, h = 2  →  stealth = 1
        let n_minus_one =
            hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140").unwrap();
        let spending = SecretKey::from_slice(&n_minus_one).unwrap();
        let mut two = [0u8; 32];
        two[31] = 2;
        let h = hash_to_scalar(&two).unwrap();

        let stealth = stealth_private_key(&spending, &h).unwrap();
        assert_eq!(stealth, scalar_one());
    }

    #[test]
    fn test_stealth_private_key_zero_rejected() {
        // spending = n - 1, h = 1  →  0
        let n_minus_one =
            hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364140").unwrap();
        let spending = SecretKey::from_slice(&n_minus_one).unwrap();
        let mut one = [0u8; 32];
        one[31] = 1;
        let h = hash_to_scalar(&one).unwrap();

        assert!(matches!(
            stealth_private_key(&spending, &h),
            Err(WraithError::StealthDerivationError(_))
        ));
        assert!(matches!(
            stealth_public_key(&spending.public_key(), &h),
            Err(WraithError::StealthDerivationError(_))
        ));
    }

    #[test]
    fn test_verify_stealth_address() {
        let spending = secret(8);
        let hash = shared_secret_hash(&secret(9), &secret(10).public_key());
        let (_, address) = derive_stealth_address(&spending.public_key(), &hash).unwrap();

        assert!(verify_stealth_address(&spending.public_key(), &hash, &address).unwrap());

        let wrong = EthAddress::from_array([0xFF; ETH_ADDRESS_SIZE]);
        assert!(!verify_stealth_address(&spending.public_key(), &hash, &wrong).unwrap());
    }
}
