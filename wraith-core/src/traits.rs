//! Interfaces to WRAITH's external collaborators.
//!
//! The protocol engine never talks to an authenticator, a chain or a disk
//! directly. Everything stateful is reached through these traits so that it can
//! be swapped out for in-memory versions in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Announcement, CredentialAssertion, CredentialDescriptor, StealthAddressRecord};

// ═══════════════════════════════════════════════════════════════════════════════
// CREDENTIAL SIGNER
// ═══════════════════════════════════════════════════════════════════════════════

/// The platform credential (e.g. a WebAuthn passkey authenticator).
///
/// Both calls are user-interactive and may never return on their own; callers
/// bound them with a timeout. Failures are reported as
/// [`crate::WraithError::CredentialError`].
#[async_trait]
pub trait CredentialSigner: Send + Sync {
    /// Registers a new credential and returns its descriptor.
    async fn create(&self) -> Result<CredentialDescriptor>;

    /// Signs `challenge` with one of the `allowed` credentials.
    ///
    /// An empty `allowed` list lets the authenticator pick any credential it holds.
    async fn sign(
        &self,
        challenge: &[u8],
        allowed: &[CredentialDescriptor],
    ) -> Result<CredentialAssertion>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// ANNOUNCEMENT FEED
// ═══════════════════════════════════════════════════════════════════════════════

/// A source of announcements addressable by block range.
///
/// Implementations might use:
/// - In-memory storage (for testing/development)
/// - A subgraph or indexer query
/// - `eth_getLogs` against the announcer contract
#[async_trait]
pub trait AnnouncementFeed: Send + Sync {
    /// Returns announcements with `from_block <= block_number <= to_block`,
    /// ordered by `(block_number, log_index)`.
    async fn fetch(&self, from_block: u64, to_block: u64) -> Result<Vec<Announcement>>;

    /// Returns the highest block the feed knows about.
    async fn latest_block(&self) -> Result<u64>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// STORES
// ═══════════════════════════════════════════════════════════════════════════════

/// A small string key-value store, used for credential bookkeeping.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes a value. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Persistence for scan results.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Saves records, skipping any whose stealth address is already stored.
    ///
    /// Returns how many records were newly stored.
    async fn save(&self, records: &[StealthAddressRecord]) -> Result<usize>;

    /// Loads every stored record.
    async fn load(&self) -> Result<Vec<StealthAddressRecord>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCAN PROGRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// Progress update during scanning.
#[derive(Clone, Debug, Default)]
pub struct ScanProgress {
    /// First block of the scan
    pub from_block: u64,
    /// Last block of the scan (inclusive)
    pub to_block: u64,
    /// Last block fully processed
    pub current_block: u64,
    /// Announcements scanned so far
    pub scanned: u64,
    /// Announcements whose view tag matched
    pub matched_view_tag: u64,
    /// Matches found so far
    pub matches: u64,
    /// Announcements skipped as malformed
    pub skipped: u64,
}

impl ScanProgress {
    /// Returns completion as a percentage of the block range.
    pub fn percent(&self) -> f64 {
        if self.to_block < self.from_block {
            return 100.0;
        }
        // Counted in f64: the block count of a full u64 range does not fit in u64.
        let total = (self.to_block - self.from_block) as f64 + 1.0;
        let done = self.current_block.saturating_sub(self.from_block) as f64 + 1.0;
        (done / total * 100.0).min(100.0)
    }
}

/// Callback for scan progress updates.
pub type ProgressCallback = Box<dyn Fn(ScanProgress) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_progress_percent() {
        let progress = ScanProgress {
            from_block: 100,
            to_block: 199,
            current_block: 149,
            ..Default::default()
        };
        assert!((progress.percent() - 50.0).abs() < 1e-9);

        let done = ScanProgress {
            current_block: 199,
            ..progress.clone()
        };
        assert!((done.percent() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_scan_progress_full_range() {
        let progress = ScanProgress {
            from_block: 0,
            to_block: u64::MAX,
            current_block: u64::MAX / 2,
            ..Default::default()
        };
        assert!((progress.percent() - 50.0).abs() < 1e-6);

        let done = ScanProgress {
            current_block: u64::MAX,
            ..progress
        };
        assert!((done.percent() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_scan_progress_empty_range() {
        let progress = ScanProgress {
            from_block: 10,
            to_block: 5,
            ..Default::default()
        };
        assert_eq!(progress.percent(), 100.0);
    }
}
