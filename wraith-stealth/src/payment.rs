//! Stealth address generation (sender side).
//!
//! Each call samples a fresh ephemeral key, so two payments to the same
//! meta-address never share a stealth address. The ephemeral private scalar
//! is dropped (and zeroized by `k256`) before the function returns.

use rand::{CryptoRng, RngCore};

use wraith_core::error::Result;
use wraith_core::types::{GeneratedStealthAddress, MetaAddress};
use wraith_crypto::{
    compress, compute_view_tag, decode_compressed, decode_meta_address_keys,
    derive_stealth_address, shared_secret_hash, PublicKey, SecretKey,
};

/// Generates a one-time stealth address for a recipient.
///
/// # Errors
/// [`wraith_core::WraithError::StealthDerivationError`] if the shared-secret
/// hash is not a valid scalar. The caller may simply retry.
pub fn generate_stealth_address(
    spending_pk: &PublicKey,
    viewing_pk: &PublicKey,
) -> Result<GeneratedStealthAddress> {
    generate_stealth_address_with_rng(&mut rand::rngs::OsRng, spending_pk, viewing_pk)
}

/// Like [`generate_stealth_address`], drawing the ephemeral key from `rng`.
pub fn generate_stealth_address_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    spending_pk: &PublicKey,
    viewing_pk: &PublicKey,
) -> Result<GeneratedStealthAddress> {
    let ephemeral = SecretKey::random(rng);
    let ephemeral_public_key = compress(&ephemeral.public_key());

    let hash = shared_secret_hash(&ephemeral, viewing_pk);
    drop(ephemeral);

    let view_tag = compute_view_tag(&hash);
    let (_, stealth_address) = derive_stealth_address(spending_pk, &hash)?;

    Ok(GeneratedStealthAddress {
        stealth_address,
        ephemeral_public_key,
        view_tag,
    })
}

/// Decodes a `st:eth:0x…` meta-address and generates a stealth address for it.
///
/// # Errors
/// Format and point errors from decoding are returned before any key is sampled.
pub fn generate_for_meta_address(meta_address: &str) -> Result<GeneratedStealthAddress> {
    let (spending_pk, viewing_pk) = decode_meta_address_keys(meta_address)?;
    generate_stealth_address(&spending_pk, &viewing_pk)
}

/// Generates a stealth address for an already parsed meta-address.
pub fn generate_for(meta_address: &MetaAddress) -> Result<GeneratedStealthAddress> {
    let spending_pk = decode_compressed(&meta_address.spending_pk)?;
    let viewing_pk = decode_compressed(&meta_address.viewing_pk)?;
    generate_stealth_address(&spending_pk, &viewing_pk)
}
