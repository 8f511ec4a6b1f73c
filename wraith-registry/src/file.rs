//! File-backed credential and record store.
//!
//! Keeps everything in memory and writes the whole state to disk after each
//! change. Suitable for a single process; concurrent writers to the same file
//! are not coordinated.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use wraith_core::error::{Result, WraithError};
use wraith_core::traits::{CredentialStore, RecordStore};
use wraith_core::types::StealthAddressRecord;

use crate::memory::MemoryStore;

/// File format magic bytes
const MAGIC: &[u8; 4] = b"WRTH";
/// Current file format version
const VERSION: u8 = 1;
/// Magic + version
const HEADER_LEN: usize = 5;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    values: BTreeMap<String, String>,
    #[serde(default)]
    records: Vec<StealthAddressRecord>,
}

/// File-backed store.
///
/// # File Format
///
/// ```text
/// magic (4 bytes): "WRTH"
/// version (1 byte): 1
/// state (variable): JSON { "values": {..}, "records": [..] }
/// ```
///
/// Writes go to a temporary file that is then renamed over the original, so a
/// crash never leaves a half-written store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    state: RwLock<StoreState>,
    /// Serializes writers so saves land in order
    write_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    /// Opens the store at `path`, loading it if the file exists.
    ///
    /// The file is not created until the first write.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if fs::try_exists(&path).await? {
            Self::read(&path).await?
        } else {
            StoreState::default()
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    #[instrument]
    async fn read(path: &Path) -> Result<StoreState> {
        let contents = fs::read(path).await?;

        if contents.len() < HEADER_LEN {
            return Err(WraithError::StoreError("file too short".into()));
        }
        if &contents[..4] != MAGIC {
            return Err(WraithError::StoreError("invalid magic bytes".into()));
        }
        if contents[4] != VERSION {
            return Err(WraithError::StoreError(format!(
                "unsupported store version {} (expected {})",
                contents[4], VERSION
            )));
        }

        let state: StoreState = serde_json::from_slice(&contents[HEADER_LEN..])
            .map_err(|e| WraithError::StoreError(format!("corrupt store: {}", e)))?;
        info!(
            values = state.values.len(),
            records = state.records.len(),
            "Loaded store"
        );
        Ok(state)
    }

    /// Writes the current state to disk.
    #[instrument(skip(self), fields(path = ?self.path))]
    pub async fn persist(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let serialized = serde_json::to_vec(&*self.state.read())?;

        let mut contents = Vec::with_capacity(HEADER_LEN + serialized.len());
        contents.extend_from_slice(MAGIC);
        contents.push(VERSION);
        contents.extend_from_slice(&serialized);

        // Write atomically (write to temp, then rename)
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&contents).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!(bytes = contents.len(), "Store saved");
        Ok(())
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of stored records.
    pub fn record_count(&self) -> usize {
        self.state.read().records.len()
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.state.read().values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.state
            .write()
            .values
            .insert(key.to_string(), value.to_string());
        self.persist().await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let removed = self.state.write().values.remove(key).is_some();
        if removed {
            self.persist().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn save(&self, records: &[StealthAddressRecord]) -> Result<usize> {
        let added = MemoryStore::append_new(&mut self.state.write().records, records);
        if added > 0 {
            self.persist().await?;
        }
        Ok(added)
    }

    async fn load(&self) -> Result<Vec<StealthAddressRecord>> {
        Ok(self.state.read().records.clone())
    }
}
