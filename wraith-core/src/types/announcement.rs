//! Announcement types for the WRAITH feed.
//!
//! Announcements are emitted by senders (on-chain, through an ERC-5564 style
//! announcer) and contain the ephemeral key and view tag needed for recipients
//! to discover payments.

use serde::{Deserialize, Serialize};

use super::{serde_hex, EthAddress};
use crate::constants::SCHEME_ID_SECP256K1;
use crate::error::{Result, WraithError};

/// An announcement read from the feed.
///
/// Records are immutable once emitted and ordered by `(block_number, log_index)`.
/// Only `metadata[0]` (the view tag) is interpreted; the remaining metadata bytes
/// are carried through untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    /// Scheme identifier (1 = secp256k1 with view tags)
    #[serde(default = "default_scheme_id")]
    pub scheme_id: u64,
    /// The one-time address funds were sent to
    pub stealth_address: EthAddress,
    /// Account that emitted the announcement
    #[serde(default)]
    pub caller: EthAddress,
    /// Sender's ephemeral public key, ideally 33-byte compressed
    #[serde(with = "serde_hex")]
    pub ephemeral_pub_key: Vec<u8>,
    /// Metadata; the first byte is the view tag
    #[serde(with = "serde_hex")]
    pub metadata: Vec<u8>,
    /// Block the announcement was included in
    #[serde(default)]
    pub block_number: u64,
    /// Position of the log within its block
    #[serde(default)]
    pub log_index: u64,
    /// Transaction hash, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

fn default_scheme_id() -> u64 {
    SCHEME_ID_SECP256K1
}

impl Announcement {
    /// Creates a new announcement at block 0 with the default scheme id.
    pub fn new(stealth_address: EthAddress, ephemeral_pub_key: Vec<u8>, metadata: Vec<u8>) -> Self {
        Self {
            scheme_id: SCHEME_ID_SECP256K1,
            stealth_address,
            caller: EthAddress::zero(),
            ephemeral_pub_key,
            metadata,
            block_number: 0,
            log_index: 0,
            tx_hash: None,
        }
    }

    /// Returns the announced view tag, or `None` when metadata is empty.
    pub fn view_tag(&self) -> Option<u8> {
        self.metadata.first().copied()
    }

    /// Returns the feed ordering key.
    pub fn position(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }

    /// Validates the announcement structure.
    ///
    /// Only checks what can be checked without curve arithmetic: a view tag must
    /// be present and the ephemeral key must not be empty.
    pub fn validate(&self) -> Result<()> {
        if self.metadata.is_empty() {
            return Err(WraithError::AnnouncementParseError(
                "metadata is empty (missing view tag)".into(),
            ));
        }

        if self.ephemeral_pub_key.is_empty() {
            return Err(WraithError::AnnouncementParseError(
                "ephemeral public key is empty".into(),
            ));
        }

        Ok(())
    }
}

/// Builder for creating announcements with optional fields.
#[derive(Default)]
pub struct AnnouncementBuilder {
    scheme_id: Option<u64>,
    stealth_address: Option<EthAddress>,
    caller: Option<EthAddress>,
    ephemeral_pub_key: Option<Vec<u8>>,
    metadata: Option<Vec<u8>>,
    block_number: u64,
    log_index: u64,
    tx_hash: Option<String>,
}

impl AnnouncementBuilder {
    /// Creates a new announcement builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scheme id (optional, defaults to secp256k1).
    pub fn scheme_id(mut self, id: u64) -> Self {
        self.scheme_id = Some(id);
        self
    }

    /// Sets the stealth address (required).
    pub fn stealth_address(mut self, address: EthAddress) -> Self {
        self.stealth_address = Some(address);
        self
    }

    /// Sets the caller (optional, defaults to the zero address).
    pub fn caller(mut self, caller: EthAddress) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Sets the ephemeral public key bytes (required).
    pub fn ephemeral_pub_key(mut self, key: Vec<u8>) -> Self {
        self.ephemeral_pub_key = Some(key);
        self
    }

    /// Sets the full metadata (required unless [`Self::view_tag`] is used).
    pub fn metadata(mut self, metadata: Vec<u8>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Sets the metadata to a single view tag byte.
    pub fn view_tag(mut self, tag: u8) -> Self {
        self.metadata = Some(vec![tag]);
        self
    }

    /// Sets the block number.
    pub fn block_number(mut self, num: u64) -> Self {
        self.block_number = num;
        self
    }

    /// Sets the log index within the block.
    pub fn log_index(mut self, index: u64) -> Self {
        self.log_index = index;
        self
    }

    /// Sets the transaction hash (optional).
    pub fn tx_hash(mut self, hash: impl Into<String>) -> Self {
        self.tx_hash = Some(hash.into());
        self
    }

    /// Builds the announcement.
    pub fn build(self) -> Result<Announcement> {
        let stealth_address = self
            .stealth_address
            .ok_or_else(|| WraithError::ValidationError("stealth_address is required".into()))?;

        let ephemeral_pub_key = self
            .ephemeral_pub_key
            .ok_or_else(|| WraithError::ValidationError("ephemeral_pub_key is required".into()))?;

        let metadata = self
            .metadata
            .ok_or_else(|| WraithError::ValidationError("metadata is required".into()))?;

        let announcement = Announcement {
            scheme_id: self.scheme_id.unwrap_or(SCHEME_ID_SECP256K1),
            stealth_address,
            caller: self.caller.unwrap_or_default(),
            ephemeral_pub_key,
            metadata,
            block_number: self.block_number,
            log_index: self.log_index,
            tx_hash: self.tx_hash,
        };

        announcement.validate()?;
        Ok(announcement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ephemeral_key() -> Vec<u8> {
        let mut key = vec![0x42u8; 33];
        key[0] = 0x02;
        key
    }

    #[test]
    fn test_announcement_creation() {
        let ann = Announcement::new(EthAddress::from_array([1; 20]), ephemeral_key(), vec![0x42]);
        assert_eq!(ann.view_tag(), Some(0x42));
        assert_eq!(ann.scheme_id, SCHEME_ID_SECP256K1);
        assert!(ann.caller.is_zero());
        assert!(ann.validate().is_ok());
    }

    #[test]
    fn test_announcement_validation() {
        let valid = Announcement::new(EthAddress::from_array([1; 20]), ephemeral_key(), vec![0x42]);

        let mut no_tag = valid.clone();
        no_tag.metadata.clear();
        assert!(matches!(
            no_tag.validate(),
            Err(WraithError::AnnouncementParseError(_))
        ));

        let mut no_key = valid;
        no_key.ephemeral_pub_key.clear();
        assert!(no_key.validate().is_err());
    }

    #[test]
    fn test_announcement_json_accepts_feed_shape() {
        let json = r#"{
            "schemeId": 1,
            "stealthAddress": "0xABCDEFabcdefABCDEFabcdefABCDEFabcdefABCD",
            "caller": "0x0000000000000000000000000000000000000001",
            "ephemeralPubKey": "0x02aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "metadata": "0x7f01",
            "blockNumber": 12,
            "logIndex": 3
        }"#;
        let ann: Announcement = serde_json::from_str(json).unwrap();
        assert_eq!(ann.ephemeral_pub_key.len(), 33);
        assert_eq!(ann.view_tag(), Some(0x7f));
        assert_eq!(ann.position(), (12, 3));
        assert!(ann.tx_hash.is_none());

        let back = serde_json::to_string(&ann).unwrap();
        assert!(back.contains("\"metadata\":\"0x7f01\""));
        assert!(back.contains("0xabcdefabcdef"));
    }

    #[test]
    fn test_announcement_builder() {
        let ann = AnnouncementBuilder::new()
            .stealth_address(EthAddress::from_array([2; 20]))
            .ephemeral_pub_key(ephemeral_key())
            .view_tag(0x55)
            .block_number(100)
            .log_index(7)
            .tx_hash("0xdead")
            .build()
            .unwrap();

        assert_eq!(ann.view_tag(), Some(0x55));
        assert_eq!(ann.position(), (100, 7));
        assert_eq!(ann.tx_hash.as_deref(), Some("0xdead"));
    }

    #[test]
    fn test_announcement_builder_missing_required() {
        let result = AnnouncementBuilder::new().view_tag(0x42).build();
        assert!(result.is_err());

        let result = AnnouncementBuilder::new()
            .stealth_address(EthAddress::zero())
            .ephemeral_pub_key(ephemeral_key())
            .build();
        assert!(result.is_err());

        let result = AnnouncementBuilder::new()
            .stealth_address(EthAddress::zero())
            .ephemeral_pub_key(ephemeral_key())
            .metadata(Vec::new())
            .build();
        assert!(matches!(result, Err(WraithError::AnnouncementParseError(_))));
    }
}
