//! Conversions between byte-level key types and `k256` keys.

use k256::{FieldBytes, SecretKey};
use rand::{CryptoRng, RngCore};

use wraith_core::error::{Result, WraithError};
use wraith_core::types::{KeyPair, PrivateKey};

use crate::point::compress;

/// Generates a random secp256k1 key pair from the OS RNG.
pub fn generate_keypair() -> KeyPair {
    generate_keypair_with_rng(&mut rand::rngs::OsRng)
}

/// Generates a key pair from the given RNG.
pub fn generate_keypair_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> KeyPair {
    let secret = SecretKey::random(rng);
    keypair_from_secret(&secret)
}

/// Builds a [`KeyPair`] from a `k256` secret key.
pub fn keypair_from_secret(secret: &SecretKey) -> KeyPair {
    let private = PrivateKey::from_array(secret.to_bytes().into());
    KeyPair::new(compress(&secret.public_key()), private)
}

/// Loads a private key as a `k256` secret key.
///
/// # Errors
/// [`WraithError::KeyDerivationError`] if the scalar is zero or not below the
/// curve order.
pub fn secret_key(private: &PrivateKey) -> Result<SecretKey> {
    SecretKey::from_bytes(&FieldBytes::from(*private.as_array())).map_err(|_| {
        WraithError::KeyDerivationError("private key is not a valid secp256k1 scalar".into())
    })
}

/// Builds a [`KeyPair`] from a private key, deriving the public half.
pub fn keypair_from_private(private: &PrivateKey) -> Result<KeyPair> {
    Ok(keypair_from_secret(&secret_key(private)?))
}
