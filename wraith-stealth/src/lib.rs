//! # WRAITH Stealth Address Protocol
//!
//! High-level API for creating, discovering and spending stealth addresses.
//!
//! This crate provides:
//!
//! - **Wallet**: Credential-driven key derivation and the resulting account
//! - **Payment**: Sender-side stealth address generation
//! - **Discovery**: Matching announcements against a recipient's keys
//! - **Recovery**: The one-time private key for a matched address
//!
//! ## Quick Start
//!
//! ```rust
//! use wraith_crypto::derive_stealth_keys;
//! use wraith_stealth::{generate_for_meta_address, StealthAccount};
//!
//! // Recipient: derive keys and publish the meta-address
//! let keys = derive_stealth_keys(b"credential entropy", "cannes-love-poap").unwrap();
//! let account = StealthAccount::from_keys(keys).unwrap();
//! let meta_address = account.meta_address().encode();
//!
//! // Sender: generate a one-time address and announce it
//! let generated = generate_for_meta_address(&meta_address).unwrap();
//! let announcement = generated.to_announcement();
//!
//! // Recipient: scan, then recover the spending key
//! let report = account.scan(&[announcement]);
//! assert_eq!(report.matches.len(), 1);
//! let key = account.recover(&report.matches[0]).unwrap();
//! assert_eq!(key.address(), generated.stealth_address);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod discovery;
pub mod payment;
pub mod recover;
pub mod wallet;

pub use discovery::{
    check_announcement, scan_announcements, scan_with_stats, ScanKeys, ScanResult, ScanStats,
};
pub use payment::{
    generate_for, generate_for_meta_address, generate_stealth_address,
    generate_stealth_address_with_rng,
};
pub use recover::{
    recover_for_record, recover_stealth_private_key, recover_with_keys, StealthPrivateKey,
};
pub use wallet::{StealthAccount, StealthWallet, WalletConfig};
