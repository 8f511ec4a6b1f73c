//! Payment discovery (recipient scan).
//!
//! Matching needs only the viewing private key and the spending public key,
//! so a scanner never holds anything that can spend.
//!
//! Per announcement, in feed order:
//!
//! 1. Structural checks (a view tag must be present)
//! 2. Ephemeral key parsing through the bounded candidate list
//! 3. ECDH with the viewing key and a view tag comparison
//! 4. Only on a tag hit: stealth public key, address, and a constant-time
//!    comparison against the announced address
//!
//! Malformed announcements are reported, never fatal.

use std::time::Instant;

use wraith_core::error::{Result, WraithError};
use wraith_core::types::{Announcement, ScanReport, StealthAddressRecord, StealthKeys};
use wraith_crypto::derive::addresses_match;
use wraith_crypto::{
    decode_compressed, derive_stealth_address, parse_ephemeral_key, secret_key,
    shared_secret_hash, verify_view_tag, PublicKey, SecretKey,
};

/// Result of checking a single announcement.
#[derive(Debug)]
pub enum ScanResult {
    /// View tag didn't match - not for this recipient
    NotForUs,
    /// View tag matched but the derived address differs (a 1-in-256 collision)
    ViewTagCollision,
    /// The announcement belongs to this recipient
    Match(StealthAddressRecord),
    /// The announcement could not be processed
    Skipped(WraithError),
}

impl ScanResult {
    /// Returns true if the announcement belongs to the recipient.
    pub fn is_match(&self) -> bool {
        matches!(self, ScanResult::Match(_))
    }

    /// Returns the matched record if present.
    pub fn into_record(self) -> Option<StealthAddressRecord> {
        match self {
            ScanResult::Match(record) => Some(record),
            _ => None,
        }
    }
}

/// Statistics for scanning operations.
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// Total announcements scanned
    pub total_scanned: u64,
    /// Number of view tag matches
    pub view_tag_matches: u64,
    /// Number of announcements that belong to the recipient
    pub matches: u64,
    /// Number of announcements skipped as malformed
    pub skipped: u64,
    /// Duration of the scan in milliseconds
    pub duration_ms: u64,
}

impl ScanStats {
    /// Creates a new stats tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a scan result.
    pub fn record(&mut self, result: &ScanResult) {
        self.total_scanned += 1;
        match result {
            ScanResult::Match(_) => {
                self.view_tag_matches += 1;
                self.matches += 1;
            }
            ScanResult::ViewTagCollision => self.view_tag_matches += 1,
            ScanResult::Skipped(_) => self.skipped += 1,
            ScanResult::NotForUs => {}
        }
    }

    /// Adds another tracker's counts to this one.
    pub fn absorb(&mut self, other: &ScanStats) {
        self.total_scanned += other.total_scanned;
        self.view_tag_matches += other.view_tag_matches;
        self.matches += other.matches;
        self.skipped += other.skipped;
        self.duration_ms += other.duration_ms;
    }

    /// Returns the scan rate (announcements per second).
    pub fn rate(&self) -> f64 {
        if self.duration_ms == 0 {
            0.0
        } else {
            (self.total_scanned as f64 / self.duration_ms as f64) * 1000.0
        }
    }

    /// Returns the filter efficiency (percentage of announcements rejected by the view tag).
    pub fn filter_efficiency(&self) -> f64 {
        let checked = self.total_scanned - self.skipped;
        if checked == 0 {
            0.0
        } else {
            ((checked - self.view_tag_matches) as f64 / checked as f64) * 100.0
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCAN KEYS
// ═══════════════════════════════════════════════════════════════════════════════

/// The key material a scanner needs: viewing private key and spending public key.
#[derive(Clone)]
pub struct ScanKeys {
    viewing_sk: SecretKey,
    spending_pk: PublicKey,
}

impl ScanKeys {
    /// Creates scan keys.
    pub fn new(viewing_sk: SecretKey, spending_pk: PublicKey) -> Self {
        Self {
            viewing_sk,
            spending_pk,
        }
    }

    /// Extracts scan keys from a derived key set.
    ///
    /// # Errors
    /// Key errors if either half is not a valid secp256k1 key.
    pub fn from_stealth_keys(keys: &StealthKeys) -> Result<Self> {
        Ok(Self {
            viewing_sk: secret_key(&keys.viewing.private)?,
            spending_pk: decode_compressed(&keys.spending.public)?,
        })
    }

    /// Returns the viewing private key.
    pub fn viewing_secret(&self) -> &SecretKey {
        &self.viewing_sk
    }

    /// Returns the spending public key.
    pub fn spending_public(&self) -> &PublicKey {
        &self.spending_pk
    }

    /// Checks one announcement.
    pub fn check(&self, announcement: &Announcement) -> ScanResult {
        check_announcement(announcement, &self.viewing_sk, &self.spending_pk)
    }

    /// Scans announcements in order.
    pub fn scan(&self, announcements: &[Announcement]) -> ScanReport {
        scan_announcements(announcements, &self.viewing_sk, &self.spending_pk)
    }

    /// Scans announcements, also returning statistics.
    pub fn scan_with_stats(&self, announcements: &[Announcement]) -> (ScanReport, ScanStats) {
        scan_with_stats(announcements, &self.viewing_sk, &self.spending_pk)
    }
}

impl std::fmt::Debug for ScanKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanKeys")
            .field("viewing_sk", &"[REDACTED]")
            .field("spending_pk", &wraith_crypto::compress(&self.spending_pk))
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MATCHING
// ═══════════════════════════════════════════════════════════════════════════════

/// Checks whether an announcement belongs to the holder of `viewing_sk`.
pub fn check_announcement(
    announcement: &Announcement,
    viewing_sk: &SecretKey,
    spending_pk: &PublicKey,
) -> ScanResult {
    if let Err(e) = announcement.validate() {
        return ScanResult::Skipped(e);
    }
    let Some(announced_tag) = announcement.view_tag() else {
        return ScanResult::Skipped(WraithError::AnnouncementParseError(
            "metadata is empty (missing view tag)".into(),
        ));
    };

    let ephemeral = match parse_ephemeral_key(&announcement.ephemeral_pub_key) {
        Ok(point) => point,
        Err(e) => return ScanResult::Skipped(e),
    };

    let hash = shared_secret_hash(viewing_sk, &ephemeral);
    if !verify_view_tag(&hash, announced_tag) {
        return ScanResult::NotForUs;
    }

    match derive_stealth_address(spending_pk, &hash) {
        Ok((_, derived)) if addresses_match(&derived, &announcement.stealth_address) => {
            ScanResult::Match(StealthAddressRecord::from_announcement(announcement))
        }
        Ok(_) => ScanResult::ViewTagCollision,
        Err(e) => ScanResult::Skipped(e),
    }
}

/// Scans announcements in order and collects matches and skipped items.
///
/// Matches are deduplicated by stealth address.
pub fn scan_announcements(
    announcements: &[Announcement],
    viewing_sk: &SecretKey,
    spending_pk: &PublicKey,
) -> ScanReport {
    scan_with_stats(announcements, viewing_sk, spending_pk).0
}

/// Like [`scan_announcements`], also returning statistics.
pub fn scan_with_stats(
    announcements: &[Announcement],
    viewing_sk: &SecretKey,
    spending_pk: &PublicKey,
) -> (ScanReport, ScanStats) {
    let start = Instant::now();
    let mut report = ScanReport::new();
    let mut stats = ScanStats::new();

    for announcement in announcements {
        let result = check_announcement(announcement, viewing_sk, spending_pk);
        stats.record(&result);
        match result {
            ScanResult::Match(record) => {
                report.push_match(record);
            }
            ScanResult::Skipped(e) => {
                tracing::warn!(
                    block = announcement.block_number,
                    log_index = announcement.log_index,
                    error = %e,
                    "Skipping announcement"
                );
                report.push_skipped(announcement, e.to_string());
            }
            ScanResult::NotForUs | ScanResult::ViewTagCollision => {}
        }
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    (report, stats)
}
