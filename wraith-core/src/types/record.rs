//! Sender and recipient outputs.
//!
//! - [`GeneratedStealthAddress`]: what the sender gets for one payment
//! - [`StealthAddressRecord`]: what the recipient's scan emits per match
//! - [`ScanReport`]: matches plus the announcements that were skipped

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{serde_hex, Announcement, CompressedPoint, EthAddress};

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATOR OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of generating one stealth address.
///
/// Contains everything the sender needs to make a payment and to publish the
/// matching announcement. The ephemeral private key is never part of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedStealthAddress {
    /// The address to send funds to
    pub stealth_address: EthAddress,
    /// Ephemeral public key `R = r·G`
    pub ephemeral_public_key: CompressedPoint,
    /// First byte of the shared-secret hash
    pub view_tag: u8,
}

impl GeneratedStealthAddress {
    /// Builds the announcement a sender would publish for this payment.
    pub fn to_announcement(&self) -> Announcement {
        Announcement::new(
            self.stealth_address,
            self.ephemeral_public_key.as_bytes().to_vec(),
            vec![self.view_tag],
        )
    }

    /// Returns true if `record` describes this payment.
    pub fn matches_record(&self, record: &StealthAddressRecord) -> bool {
        record.stealth_address == self.stealth_address
            && record.ephemeral_public_key == self.ephemeral_public_key.as_bytes()
            && record.metadata.first() == Some(&self.view_tag)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNER OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

/// A stealth address found to belong to the scanning recipient.
///
/// The ephemeral key bytes are kept exactly as announced so the spend key can
/// be recovered from the record alone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StealthAddressRecord {
    /// The matched stealth address
    pub stealth_address: EthAddress,
    /// Ephemeral public key as announced
    #[serde(with = "serde_hex")]
    pub ephemeral_public_key: Vec<u8>,
    /// Announcement metadata (view tag first)
    #[serde(with = "serde_hex")]
    pub metadata: Vec<u8>,
}

impl StealthAddressRecord {
    /// Creates a record from the announcement that matched.
    pub fn from_announcement(announcement: &Announcement) -> Self {
        Self {
            stealth_address: announcement.stealth_address,
            ephemeral_public_key: announcement.ephemeral_pub_key.clone(),
            metadata: announcement.metadata.clone(),
        }
    }
}

/// An announcement the scanner could not process.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedAnnouncement {
    /// Block of the skipped announcement
    pub block_number: u64,
    /// Log index of the skipped announcement
    pub log_index: u64,
    /// Why it was skipped
    pub reason: String,
}

/// Output of scanning a batch of announcements.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScanReport {
    /// Records that belong to the recipient, in feed order
    pub matches: Vec<StealthAddressRecord>,
    /// Malformed announcements that were skipped
    pub skipped: Vec<SkippedAnnouncement>,
    /// Stealth addresses in `matches`; rebuilt when out of step with it
    #[serde(skip)]
    seen: HashSet<EthAddress>,
}

impl PartialEq for ScanReport {
    fn eq(&self, other: &Self) -> bool {
        self.matches == other.matches && self.skipped == other.skipped
    }
}

impl Eq for ScanReport {}

impl ScanReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a match unless its stealth address is already present.
    ///
    /// Returns true if the record was added.
    pub fn push_match(&mut self, record: StealthAddressRecord) -> bool {
        // Deserialized reports and direct edits of `matches` leave the set stale.
        if self.seen.len() != self.matches.len() {
            self.seen = self.matches.iter().map(|m| m.stealth_address).collect();
        }
        if !self.seen.insert(record.stealth_address) {
            return false;
        }
        self.matches.push(record);
        true
    }

    /// Records a skipped announcement.
    pub fn push_skipped(&mut self, announcement: &Announcement, reason: impl Into<String>) {
        self.skipped.push(SkippedAnnouncement {
            block_number: announcement.block_number,
            log_index: announcement.log_index,
            reason: reason.into(),
        });
    }

    /// Merges another report into this one.
    ///
    /// Matches are deduplicated by stealth address, keeping the first seen.
    /// Skipped entries are deduplicated by feed position.
    pub fn merge(&mut self, other: ScanReport) {
        for record in other.matches {
            self.push_match(record);
        }

        let mut positions: HashSet<(u64, u64)> = self
            .skipped
            .iter()
            .map(|s| (s.block_number, s.log_index))
            .collect();
        for skipped in other.skipped {
            if positions.insert((skipped.block_number, skipped.log_index)) {
                self.skipped.push(skipped);
            }
        }
    }

    /// Returns true if nothing matched and nothing was skipped.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.skipped.is_empty()
    }
}
