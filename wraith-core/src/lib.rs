//! # WRAITH Core
//!
//! Core types, errors, and traits for the WRAITH stealth address protocol
//! (EIP-5564, secp256k1 scheme).
//!
//! This crate provides the foundational building blocks used by all other WRAITH crates:
//!
//! - **Types**: Byte-level models for keys, addresses, meta-addresses, announcements
//!   and scan records
//! - **Errors**: The protocol's error taxonomy
//! - **Constants**: Protocol constants, sizes and derivation labels
//! - **Traits**: Interfaces to the external collaborators (credential signer,
//!   announcement feed, stores)
//!
//! Curve arithmetic lives in `wraith-crypto`; nothing here validates that a
//! [`CompressedPoint`] is actually on the curve.
//!
//! ## Example
//!
//! ```rust
//! use wraith_core::{EthAddress, StealthAddressRecord};
//!
//! let record = StealthAddressRecord {
//!     stealth_address: EthAddress::from_array([0x11; 20]),
//!     ephemeral_public_key: vec![0x02; 33],
//!     metadata: vec![0xAB],
//! };
//! let json = serde_json::to_string(&record).unwrap();
//! assert!(json.contains("0x1111"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{CredentialFailure, Result, WraithError};
pub use traits::*;
pub use types::*;
