//! Deterministic spending/viewing key derivation.
//!
//! A credential yields entropy; HKDF-SHA256 stretches it into two independent
//! 32-byte outputs, which are then normalized into valid secp256k1 scalars.
//!
//! ```text
//! entropy      = SHA-256(credential_id)          (default)
//!              | assertion signature             (opt-in)
//! spending_raw = HKDF(ikm = entropy, salt = "EIP-5564-spending-key", info = message ‖ "-spending")
//! viewing_raw  = HKDF(ikm = entropy, salt = "EIP-5564-viewing-key",  info = message ‖ "-viewing")
//! key          = normalize(raw)
//! ```
//!
//! `normalize` accepts a value in `[1, n)` unchanged and otherwise replaces it
//! with its SHA-256 digest, at most [`MAX_NORMALIZE_ATTEMPTS`] times.

use hkdf::Hkdf;
use k256::{FieldBytes, SecretKey};
use sha2::Sha256;
use zeroize::Zeroizing;

use wraith_core::constants::{
    HKDF_SPENDING_INFO_SUFFIX, HKDF_SPENDING_SALT, HKDF_VIEWING_INFO_SUFFIX, HKDF_VIEWING_SALT,
    MAX_NORMALIZE_ATTEMPTS, PRIVATE_KEY_SIZE,
};
use wraith_core::error::{Result, WraithError};
use wraith_core::types::{CredentialAssertion, StealthKeys};

use crate::hash::sha256;
use crate::keys::keypair_from_secret;

/// Where key-derivation entropy is taken from in a credential assertion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntropySource {
    /// SHA-256 of the credential identifier. Stable for the life of the credential.
    #[default]
    CredentialIdHash,
    /// The raw assertion signature.
    ///
    /// Only reproducible with authenticators that sign deterministically; most
    /// ECDSA authenticators do not.
    Signature,
}

impl EntropySource {
    /// Extracts the entropy bytes from an assertion.
    ///
    /// # Errors
    /// [`WraithError::KeyDerivationError`] if the chosen field is empty.
    pub fn extract(&self, assertion: &CredentialAssertion) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            EntropySource::CredentialIdHash => {
                if assertion.credential_id.is_empty() {
                    return Err(WraithError::KeyDerivationError(
                        "assertion has no credential id".into(),
                    ));
                }
                Ok(Zeroizing::new(sha256(&assertion.credential_id).to_vec()))
            }
            EntropySource::Signature => {
                if assertion.signature.is_empty() {
                    return Err(WraithError::KeyDerivationError(
                        "assertion has no signature".into(),
                    ));
                }
                Ok(Zeroizing::new(assertion.signature.clone()))
            }
        }
    }
}

impl std::str::FromStr for EntropySource {
    type Err = WraithError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "credential-id" | "credential_id" => Ok(EntropySource::CredentialIdHash),
            "signature" => Ok(EntropySource::Signature),
            other => Err(WraithError::ConfigError(format!(
                "unknown entropy source '{}'",
                other
            ))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HKDF
// ═══════════════════════════════════════════════════════════════════════════════

/// HKDF-SHA256 extract-and-expand to 32 bytes.
pub fn hkdf_sha256(
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
) -> Result<Zeroizing<[u8; PRIVATE_KEY_SIZE]>> {
    let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
    hk.expand(info, &mut okm[..])
        .map_err(|e| WraithError::KeyDerivationError(format!("HKDF expand failed: {}", e)))?;
    Ok(okm)
}

fn info(message: &str, suffix: &[u8]) -> Vec<u8> {
    let mut info = Vec::with_capacity(message.len() + suffix.len());
    info.extend_from_slice(message.as_bytes());
    info.extend_from_slice(suffix);
    info
}

// ═══════════════════════════════════════════════════════════════════════════════
// NORMALIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Normalizes 32 bytes into a valid private key by bounded SHA-256 rehashing.
pub fn normalize_private_key(bytes: &[u8; PRIVATE_KEY_SIZE]) -> Result<SecretKey> {
    normalize_with(bytes, sha256)
}

/// Normalization with an explicit rehash function.
///
/// The input is tried first, then up to [`MAX_NORMALIZE_ATTEMPTS`] rehashes.
pub fn normalize_with<F>(bytes: &[u8; PRIVATE_KEY_SIZE], rehash: F) -> Result<SecretKey>
where
    F: Fn(&[u8]) -> [u8; PRIVATE_KEY_SIZE],
{
    let mut candidate = Zeroizing::new(*bytes);
    for _ in 0..=MAX_NORMALIZE_ATTEMPTS {
        if let Ok(secret) = SecretKey::from_bytes(&FieldBytes::from(*candidate)) {
            return Ok(secret);
        }
        *candidate = rehash(candidate.as_slice());
    }

    Err(WraithError::KeyDerivationError(format!(
        "no valid scalar after {} rehashes",
        MAX_NORMALIZE_ATTEMPTS
    )))
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY DERIVATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Derives the spending and viewing key pairs from raw entropy.
///
/// Deterministic: the same `entropy` and `message` always give the same keys.
///
/// # Errors
/// [`WraithError::KeyDerivationError`] if `entropy` is empty, HKDF fails, or
/// normalization exhausts its bound.
pub fn derive_stealth_keys(entropy: &[u8], message: &str) -> Result<StealthKeys> {
    if entropy.is_empty() {
        return Err(WraithError::KeyDerivationError("entropy is empty".into()));
    }

    let spending_raw = hkdf_sha256(
        entropy,
        HKDF_SPENDING_SALT,
        &info(message, HKDF_SPENDING_INFO_SUFFIX),
    )?;
    let viewing_raw = hkdf_sha256(
        entropy,
        HKDF_VIEWING_SALT,
        &info(message, HKDF_VIEWING_INFO_SUFFIX),
    )?;

    let spending = normalize_private_key(&spending_raw)?;
    let viewing = normalize_private_key(&viewing_raw)?;

    Ok(StealthKeys::new(
        keypair_from_secret(&spending),
        keypair_from_secret(&viewing),
    ))
}

/// Derives key pairs from a credential assertion.
pub fn derive_from_assertion(
    assertion: &CredentialAssertion,
    message: &str,
    source: EntropySource,
) -> Result<StealthKeys> {
    let entropy = source.extract(assertion)?;
    derive_stealth_keys(&entropy, message)
}
