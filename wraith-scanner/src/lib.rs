//! # WRAITH Scanner
//!
//! Block-range scanning of an announcement feed to discover payments.
//!
//! ## Features
//!
//! - **Windowed Fetching**: Walks the range in `block_interval` windows
//! - **Progress Reporting**: Callbacks for UI progress updates
//! - **Resumable Scans**: A [`ScanPosition`] checkpoint after every window
//! - **Sharded Scanning**: Contiguous sub-ranges scanned concurrently and merged
//! - **Persistence**: Matches can be saved to a [`RecordStore`] as they are found
//!
//! Malformed announcements are recorded in the report and never stop a scan.
//! A feed failure stops it with the checkpoint left at the first unscanned
//! block, so [`Scanner::resume`] picks up where it broke off.
//!
//! ## Example
//!
//! ```rust
//! use wraith_crypto::derive_stealth_keys;
//! use wraith_registry::MemoryFeed;
//! use wraith_scanner::{Scanner, ScannerConfig};
//! use wraith_stealth::{generate_for, StealthAccount};
//!
//! # tokio_test::block_on(async {
//! let keys = derive_stealth_keys(b"credential entropy", "cannes-love-poap").unwrap();
//! let account = StealthAccount::from_keys(keys).unwrap();
//!
//! let mut announcement = generate_for(account.meta_address()).unwrap().to_announcement();
//! announcement.block_number = 1_234;
//! let feed = MemoryFeed::from_announcements(vec![announcement]);
//!
//! let scanner = Scanner::from_account(&account);
//! let outcome = scanner.scan(&feed, &ScannerConfig::new()).await.unwrap();
//! assert_eq!(outcome.report.matches.len(), 1);
//! assert!(outcome.complete);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use wraith_core::constants::{DEFAULT_BLOCK_INTERVAL, MAX_BLOCK_INTERVAL, MAX_SCAN_SHARDS};
use wraith_core::error::{Result, WraithError};
use wraith_core::traits::{AnnouncementFeed, ProgressCallback, RecordStore, ScanProgress};
use wraith_core::types::{Announcement, ScanReport};
use wraith_stealth::{ScanKeys, ScanResult, ScanStats, StealthAccount};

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Scanner configuration.
#[derive(Clone, Debug)]
pub struct ScannerConfig {
    /// First block to scan (inclusive)
    pub from_block: u64,
    /// Last block to scan (inclusive); `None` means the feed's latest block
    pub to_block: Option<u64>,
    /// Blocks per feed request
    pub block_interval: u64,
    /// Concurrent sub-ranges for [`Scanner::scan_sharded`]
    pub shards: usize,
    /// Whether to stop after the first window that contains a match
    pub stop_on_first: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            from_block: 0,
            to_block: None,
            block_interval: DEFAULT_BLOCK_INTERVAL,
            shards: 1,
            stop_on_first: false,
        }
    }
}

impl ScannerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first block.
    pub fn from_block(mut self, block: u64) -> Self {
        self.from_block = block;
        self
    }

    /// Sets the last block.
    pub fn to_block(mut self, block: u64) -> Self {
        self.to_block = Some(block);
        self
    }

    /// Sets both ends of the block range.
    pub fn block_range(self, from: u64, to: u64) -> Self {
        self.from_block(from).to_block(to)
    }

    /// Sets the window size.
    pub fn block_interval(mut self, blocks: u64) -> Self {
        self.block_interval = blocks;
        self
    }

    /// Sets the shard count.
    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Enables stopping on first discovery.
    pub fn stop_on_first(mut self) -> Self {
        self.stop_on_first = true;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.block_interval == 0 || self.block_interval > MAX_BLOCK_INTERVAL {
            return Err(WraithError::ConfigError(format!(
                "block_interval must be between 1 and {}",
                MAX_BLOCK_INTERVAL
            )));
        }
        if self.shards == 0 || self.shards > MAX_SCAN_SHARDS {
            return Err(WraithError::ConfigError(format!(
                "shards must be between 1 and {}",
                MAX_SCAN_SHARDS
            )));
        }
        if let Some(to) = self.to_block {
            if to < self.from_block {
                return Err(WraithError::ConfigError(format!(
                    "to_block {} is before from_block {}",
                    to, self.from_block
                )));
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// POSITION
// ═══════════════════════════════════════════════════════════════════════════════

/// Scan position for resumable scanning.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPosition {
    /// First block not yet scanned
    pub next_block: u64,
    /// Announcements scanned so far
    pub total_scanned: u64,
    /// Matches found so far
    pub total_matches: u64,
    /// Announcements skipped so far
    pub total_skipped: u64,
}

impl ScanPosition {
    /// Creates a position at `block` with zero totals.
    pub fn new(block: u64) -> Self {
        Self {
            next_block: block,
            ..Self::default()
        }
    }

    /// Marks every block up to `window_end` as scanned.
    pub fn advance(&mut self, window_end: u64, stats: &ScanStats) {
        self.next_block = window_end.saturating_add(1);
        self.total_scanned += stats.total_scanned;
        self.total_matches += stats.matches;
        self.total_skipped += stats.skipped;
    }

    /// Returns true if nothing up to `to_block` is left to scan.
    pub fn is_complete(&self, to_block: u64) -> bool {
        self.next_block > to_block
    }
}

/// What a scan produced.
#[derive(Clone, Debug)]
pub struct ScanOutcome {
    /// Matches and skipped announcements
    pub report: ScanReport,
    /// Checkpoint after the last scanned window
    pub position: ScanPosition,
    /// Statistics for this run
    pub stats: ScanStats,
    /// Last block of the scanned range
    pub to_block: u64,
    /// Whether the whole range was scanned
    pub complete: bool,
}

/// Scan result summary.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Number of announcements scanned
    pub total_scanned: u64,
    /// Number of view tag matches
    pub view_tag_matches: u64,
    /// Number of matches
    pub matches: u64,
    /// Number of skipped announcements
    pub skipped: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Scan rate (announcements per second)
    pub rate: f64,
    /// Filter efficiency (% filtered by view tag)
    pub filter_efficiency: f64,
}

impl From<ScanStats> for ScanSummary {
    fn from(stats: ScanStats) -> Self {
        Self {
            total_scanned: stats.total_scanned,
            view_tag_matches: stats.view_tag_matches,
            matches: stats.matches,
            skipped: stats.skipped,
            duration_ms: stats.duration_ms,
            rate: stats.rate(),
            filter_efficiency: stats.filter_efficiency(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Main scanner for discovering payments.
///
/// Holds only scan keys (viewing private key, spending public key); it cannot
/// spend.
pub struct Scanner {
    keys: ScanKeys,
    records: Option<Arc<dyn RecordStore>>,
    /// Checkpoint of the last sequential scan
    position: RwLock<ScanPosition>,
    /// Statistics across all runs
    stats: RwLock<ScanStats>,
    /// Matches and skips across all runs
    found: RwLock<ScanReport>,
}

/// One contiguous range to walk.
struct Walk<'a> {
    from: u64,
    to: u64,
    base: ScanPosition,
    checkpoint: bool,
    progress: Option<&'a ProgressCallback>,
}

impl Scanner {
    /// Creates a new scanner with the given keys.
    pub fn new(keys: ScanKeys) -> Self {
        Self {
            keys,
            records: None,
            position: RwLock::new(ScanPosition::default()),
            stats: RwLock::new(ScanStats::new()),
            found: RwLock::new(ScanReport::new()),
        }
    }

    /// Creates a scanner from an account's scan keys.
    pub fn from_account(account: &StealthAccount) -> Self {
        Self::new(account.scan_keys().clone())
    }

    /// Persists matches to `store` after each window.
    pub fn with_record_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.records = Some(store);
        self
    }

    /// Returns the current scan position.
    pub fn position(&self) -> ScanPosition {
        self.position.read().clone()
    }

    /// Returns the current statistics.
    pub fn stats(&self) -> ScanStats {
        self.stats.read().clone()
    }

    /// Returns everything found since the last reset, including by scans that failed.
    pub fn found(&self) -> ScanReport {
        self.found.read().clone()
    }

    /// Resets position, statistics and findings.
    pub fn reset(&self) {
        *self.position.write() = ScanPosition::default();
        *self.stats.write() = ScanStats::new();
        *self.found.write() = ScanReport::new();
    }

    /// Checks a single announcement.
    pub fn scan_one(&self, announcement: &Announcement) -> ScanResult {
        let result = self.keys.check(announcement);
        self.stats.write().record(&result);
        result
    }

    /// Scans `[from_block, to_block]` sequentially.
    #[instrument(skip(self, feed, config), fields(from = config.from_block))]
    pub async fn scan(
        &self,
        feed: &dyn AnnouncementFeed,
        config: &ScannerConfig,
    ) -> Result<ScanOutcome> {
        config.validate()?;
        let to = self.resolve_end(feed, config).await?;
        self.walk(
            feed,
            config,
            Walk {
                from: config.from_block,
                to,
                base: ScanPosition::new(config.from_block),
                checkpoint: true,
                progress: None,
            },
        )
        .await
    }

    /// Continues a scan from a checkpoint.
    ///
    /// `config.from_block` is ignored; totals carry over from `position`.
    #[instrument(skip(self, feed, config), fields(next_block = position.next_block))]
    pub async fn resume(
        &self,
        feed: &dyn AnnouncementFeed,
        position: ScanPosition,
        config: &ScannerConfig,
    ) -> Result<ScanOutcome> {
        config.validate()?;
        let to = self.resolve_end(feed, config).await?;
        self.walk(
            feed,
            config,
            Walk {
                from: position.next_block,
                to,
                base: position,
                checkpoint: true,
                progress: None,
            },
        )
        .await
    }

    /// Scans sequentially, reporting progress after every window.
    #[instrument(skip(self, feed, config, progress_callback))]
    pub async fn scan_with_progress(
        &self,
        feed: &dyn AnnouncementFeed,
        config: &ScannerConfig,
        progress_callback: ProgressCallback,
    ) -> Result<ScanOutcome> {
        config.validate()?;
        let to = self.resolve_end(feed, config).await?;
        self.walk(
            feed,
            config,
            Walk {
                from: config.from_block,
                to,
                base: ScanPosition::new(config.from_block),
                checkpoint: true,
                progress: Some(&progress_callback),
            },
        )
        .await
    }

    /// Splits the range into `config.shards` contiguous sub-ranges and scans
    /// them concurrently.
    ///
    /// The merged report is in feed order and deduplicated by stealth address.
    /// The checkpoint only moves once every shard has finished; after a
    /// failure the whole range is rescanned, and record stores deduplicate.
    #[instrument(skip(self, feed, config), fields(shards = config.shards))]
    pub async fn scan_sharded(
        &self,
        feed: &dyn AnnouncementFeed,
        config: &ScannerConfig,
    ) -> Result<ScanOutcome> {
        config.validate()?;
        let to = self.resolve_end(feed, config).await?;
        let from = config.from_block;
        if from > to {
            return Ok(self.empty_outcome(ScanPosition::new(from), to));
        }

        let ranges = split_range(from, to, config.shards);
        debug!(ranges = ranges.len(), "Scanning shards");

        let start = Instant::now();
        let runs = join_all(ranges.iter().map(|&(lo, hi)| {
            self.walk(
                feed,
                config,
                Walk {
                    from: lo,
                    to: hi,
                    base: ScanPosition::new(lo),
                    checkpoint: false,
                    progress: None,
                },
            )
        }))
        .await;

        let mut report = ScanReport::new();
        let mut stats = ScanStats::new();
        let mut complete = true;
        for run in runs {
            let run = run?;
            complete &= run.complete;
            stats.absorb(&run.stats);
            report.merge(run.report);
        }
        stats.duration_ms = start.elapsed().as_millis() as u64;

        let mut position = ScanPosition::new(from);
        position.advance(to, &stats);
        if complete {
            *self.position.write() = position.clone();
        }

        info!(
            matches = report.matches.len(),
            skipped = report.skipped.len(),
            scanned = stats.total_scanned,
            "Sharded scan complete"
        );

        Ok(ScanOutcome {
            report,
            position,
            stats,
            to_block: to,
            complete,
        })
    }

    async fn resolve_end(&self, feed: &dyn AnnouncementFeed, config: &ScannerConfig) -> Result<u64> {
        match config.to_block {
            Some(to) => Ok(to),
            None => feed.latest_block().await,
        }
    }

    fn empty_outcome(&self, position: ScanPosition, to: u64) -> ScanOutcome {
        ScanOutcome {
            report: ScanReport::new(),
            complete: position.is_complete(to),
            position,
            stats: ScanStats::new(),
            to_block: to,
        }
    }

    async fn walk(
        &self,
        feed: &dyn AnnouncementFeed,
        config: &ScannerConfig,
        walk: Walk<'_>,
    ) -> Result<ScanOutcome> {
        let Walk {
            from,
            to,
            mut base,
            checkpoint,
            progress,
        } = walk;
        base.next_block = from;
        if checkpoint {
            *self.position.write() = base.clone();
        }
        if from > to {
            return Ok(self.empty_outcome(base, to));
        }

        let start = Instant::now();
        let mut report = ScanReport::new();
        let mut stats = ScanStats::new();
        let mut position = base;
        let mut window_start = from;
        let mut reached_end = false;

        info!(from, to, interval = config.block_interval, "Starting scan");

        loop {
            let window_end = window_start
                .saturating_add(config.block_interval - 1)
                .min(to);

            let announcements = feed.fetch(window_start, window_end).await.map_err(|e| {
                warn!(window_start, window_end, error = %e, "Feed failed; scan stopped");
                e
            })?;

            let (window_report, window_stats) = self.keys.scan_with_stats(&announcements);
            debug!(
                window_start,
                window_end,
                count = announcements.len(),
                matches = window_report.matches.len(),
                "Scanned window"
            );

            if let Some(store) = &self.records {
                if !window_report.matches.is_empty() {
                    let added = store.save(&window_report.matches).await?;
                    debug!(added, "Persisted matches");
                }
            }

            position.advance(window_end, &window_stats);
            stats.absorb(&window_stats);
            self.stats.write().absorb(&window_stats);
            self.found.write().merge(window_report.clone());
            report.merge(window_report);
            if checkpoint {
                *self.position.write() = position.clone();
            }

            if let Some(callback) = progress {
                callback(ScanProgress {
                    from_block: from,
                    to_block: to,
                    current_block: window_end,
                    scanned: stats.total_scanned,
                    matched_view_tag: stats.view_tag_matches,
                    matches: report.matches.len() as u64,
                    skipped: report.skipped.len() as u64,
                });
            }

            reached_end = window_end >= to;
            if config.stop_on_first && !report.matches.is_empty() {
                info!(block = window_end, "Stopping on first discovery");
                break;
            }
            if reached_end {
                break;
            }
            window_start = window_end + 1;
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            matches = report.matches.len(),
            skipped = report.skipped.len(),
            scanned = stats.total_scanned,
            duration_ms = stats.duration_ms,
            rate = stats.rate(),
            "Scan complete"
        );

        // `next_block` saturates at u64::MAX, so completion is tracked here.
        Ok(ScanOutcome {
            complete: reached_end,
            report,
            position,
            stats,
            to_block: to,
        })
    }
}

/// Splits `[from, to]` into at most `parts` contiguous, non-empty ranges.
fn split_range(from: u64, to: u64, parts: usize) -> Vec<(u64, u64)> {
    // Blocks per range minus one; a full u64 range has u64::MAX + 1 blocks.
    let step = (to - from) / parts as u64;

    let mut ranges = Vec::with_capacity(parts);
    let mut lo = from;
    loop {
        let hi = lo.saturating_add(step).min(to);
        ranges.push((lo, hi));
        if hi >= to {
            break;
        }
        lo = hi + 1;
    }
    ranges
}
