//! Domain types for WRAITH.
//!
//! This module provides all the core data structures used throughout the protocol:
//!
//! - [`CompressedPoint`] / [`PrivateKey`] / [`KeyPair`]: byte-level key material
//! - [`MetaAddress`]: Published `st:eth:0x…` address for receiving private payments
//! - [`EthAddress`]: 20-byte Ethereum address
//! - [`GeneratedStealthAddress`]: Sender-side output for one payment
//! - [`Announcement`]: Feed record carrying ephemeral key + view tag
//! - [`StealthAddressRecord`] / [`ScanReport`]: Recipient-side scan output
//! - [`CredentialDescriptor`] / [`CredentialAssertion`]: passkey bookkeeping

mod keys;
mod address;
mod announcement;
mod credential;
mod record;
mod serde_hex;

pub use keys::*;
pub use address::*;
pub use announcement::*;
pub use credential::*;
pub use record::*;
