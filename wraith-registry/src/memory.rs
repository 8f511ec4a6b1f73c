//! In-memory announcement feed and stores.
//!
//! Fast, thread-safe storage suitable for development, testing,
//! and single-process deployments.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, instrument};

use wraith_core::error::Result;
use wraith_core::traits::{AnnouncementFeed, CredentialStore, RecordStore};
use wraith_core::types::{Announcement, EthAddress, StealthAddressRecord};

// ═══════════════════════════════════════════════════════════════════════════════
// ANNOUNCEMENT FEED
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory announcement feed, kept ordered by `(block_number, log_index)`.
///
/// Entries are stored exactly as given, malformed ones included, so scanners
/// see what was emitted on chain. A later entry at the same position replaces
/// the earlier one.
#[derive(Debug, Default)]
pub struct MemoryFeed {
    announcements: RwLock<BTreeMap<(u64, u64), Announcement>>,
    /// Chain head reported by `latest_block`, if ahead of the last announcement
    head: AtomicU64,
}

impl MemoryFeed {
    /// Creates a new empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a feed holding `announcements`.
    pub fn from_announcements(announcements: Vec<Announcement>) -> Self {
        let feed = Self::new();
        feed.import(announcements);
        feed
    }

    /// Parses a JSON array of announcements into a feed.
    pub fn from_json(json: &str) -> Result<Self> {
        let announcements: Vec<Announcement> = serde_json::from_str(json)?;
        Ok(Self::from_announcements(announcements))
    }

    /// Adds announcements without validating them; returns how many were new.
    pub fn import(&self, announcements: Vec<Announcement>) -> usize {
        let mut stored = self.announcements.write();
        let before = stored.len();
        for announcement in announcements {
            stored.insert(announcement.position(), announcement);
        }
        let added = stored.len() - before;
        debug!(added, total = stored.len(), "Imported announcements");
        added
    }

    /// Sets the chain head reported by [`AnnouncementFeed::latest_block`].
    pub fn set_head(&self, block: u64) {
        self.head.fetch_max(block, Ordering::SeqCst);
    }

    /// Returns the number of announcements.
    pub fn len(&self) -> usize {
        self.announcements.read().len()
    }

    /// Returns true if the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.announcements.read().is_empty()
    }
}

#[async_trait]
impl AnnouncementFeed for MemoryFeed {
    #[instrument(skip(self))]
    async fn fetch(&self, from_block: u64, to_block: u64) -> Result<Vec<Announcement>> {
        if from_block > to_block {
            return Ok(Vec::new());
        }

        let found: Vec<Announcement> = self
            .announcements
            .read()
            .range((from_block, 0)..=(to_block, u64::MAX))
            .map(|(_, announcement)| announcement.clone())
            .collect();

        debug!(count = found.len(), "Fetched window");
        Ok(found)
    }

    async fn latest_block(&self) -> Result<u64> {
        let last = self
            .announcements
            .read()
            .keys()
            .next_back()
            .map_or(0, |(block, _)| *block);
        Ok(last.max(self.head.load(Ordering::SeqCst)))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STORES
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory credential and record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: DashMap<String, String>,
    records: RwLock<Vec<StealthAddressRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    /// Appends records whose stealth address is not yet present.
    pub(crate) fn append_new(
        records: &mut Vec<StealthAddressRecord>,
        incoming: &[StealthAddressRecord],
    ) -> usize {
        let mut seen: std::collections::HashSet<EthAddress> =
            records.iter().map(|r| r.stealth_address).collect();
        let mut added = 0;
        for record in incoming {
            if seen.insert(record.stealth_address) {
                records.push(record.clone());
                added += 1;
            }
        }
        added
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn save(&self, records: &[StealthAddressRecord]) -> Result<usize> {
        let added = Self::append_new(&mut self.records.write(), records);
        debug!(added, "Saved records");
        Ok(added)
    }

    async fn load(&self) -> Result<Vec<StealthAddressRecord>> {
        Ok(self.records.read().clone())
    }
}
