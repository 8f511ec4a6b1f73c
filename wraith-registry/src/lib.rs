//! # WRAITH Registry
//!
//! Announcement feeds and stores for the WRAITH protocol.
//!
//! This crate provides:
//!
//! - **Memory**: An in-memory [`AnnouncementFeed`](wraith_core::AnnouncementFeed)
//!   and an in-memory credential/record store for development and testing
//! - **File**: A persistent credential/record store for single-process use
//!
//! ## Example
//!
//! ```rust
//! use wraith_core::{AnnouncementFeed, Announcement, EthAddress};
//! use wraith_registry::MemoryFeed;
//!
//! # tokio_test::block_on(async {
//! let mut announcement = Announcement::new(EthAddress::zero(), vec![0x02; 33], vec![0x42]);
//! announcement.block_number = 7;
//! let feed = MemoryFeed::from_announcements(vec![announcement]);
//!
//! let window = feed.fetch(0, 10).await.unwrap();
//! assert_eq!(window.len(), 1);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod file;
mod memory;

pub use file::FileStore;
pub use memory::{MemoryFeed, MemoryStore};
