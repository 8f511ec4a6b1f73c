//! # WRAITH Cryptography
//!
//! secp256k1 primitives for the WRAITH stealth address protocol (EIP-5564,
//! scheme 1).
//!
//! This crate provides:
//!
//! - **Point**: SEC1 decoding with curve validation, bounded ephemeral-key parsing
//! - **Hash**: Keccak-256 and SHA-256
//! - **View Tags**: First byte of the shared-secret hash, constant-time checks
//! - **Derivation**: Shared secret, stealth public/private keys, Ethereum addresses
//! - **KDF**: HKDF-SHA256 spending/viewing key derivation with bounded normalization
//! - **Meta**: The `st:eth:0x…` meta-address codec
//!
//! Curve arithmetic, hashing and HKDF come from `k256`, `sha3`, `sha2` and `hkdf`.
//!
//! ## Security Properties
//!
//! - Every externally supplied point is validated on the curve before use
//! - Degenerate scalars are rejected, never silently reduced
//! - Secret material is zeroized on drop
//!
//! ## Example
//!
//! ```rust
//! use wraith_crypto::{derive_stealth_keys, decode_meta_address, encode_meta_address};
//!
//! let keys = derive_stealth_keys(b"credential entropy", "cannes-love-poap").unwrap();
//! let meta = encode_meta_address(&keys.spending.public, &keys.viewing.public);
//! let decoded = decode_meta_address(&meta).unwrap();
//! assert_eq!(decoded.spending_pk, keys.spending.public);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod derive;
pub mod hash;
pub mod kdf;
pub mod keys;
pub mod meta;
pub mod point;
pub mod view_tag;

// Re-export main functions at crate root
pub use derive::{
    derive_stealth_address, eth_address, hash_to_scalar, shared_secret_hash, stealth_private_key,
    stealth_public_key, verify_stealth_address, SharedSecretHash,
};
pub use hash::{keccak256, sha256};
pub use kdf::{derive_from_assertion, derive_stealth_keys, normalize_private_key, EntropySource};
pub use keys::{generate_keypair, generate_keypair_with_rng, keypair_from_private, secret_key};
pub use meta::{decode_meta_address, decode_meta_address_keys, encode_meta_address, MetaAddressExt};
pub use point::{compress, decode_compressed, decode_point, parse_ephemeral_key};
pub use view_tag::{compute_view_tag, verify_view_tag};

/// Re-exported so downstream crates name the same key types.
pub use k256::{PublicKey, SecretKey};
