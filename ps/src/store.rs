//! Core KvStore implementation

use eyre::{Context, Result};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed key/value store with advisory locking
///
/// Values are opaque strings (the planner stores serialized JSON payloads).
/// Every operation opens the backing file, takes an exclusive lock, and
/// rewrites the whole map. Payloads are small (one plan), so the simplicity
/// wins over an append log.
pub struct KvStore {
    path: PathBuf,
}

impl KvStore {
    /// Open a store rooted at the given directory, creating it if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).context("Failed to create store directory")?;
        let path = dir.join(crate::STORE_FILE);
        debug!(path = %path.display(), "KvStore::open");
        Ok(Self { path })
    }

    /// Path to the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a value under a key, replacing any previous value
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        debug!(%key, len = value.len(), "KvStore::put");
        let mut file = self.open_locked()?;
        let mut map = read_map(&mut file)?;
        map.insert(key.to_string(), value.to_string());
        write_map(&mut file, &map)
    }

    /// Fetch the value stored under a key
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        debug!(%key, "KvStore::get");
        let mut file = self.open_locked()?;
        let map = read_map(&mut file)?;
        Ok(map.get(key).cloned())
    }

    /// Remove a key; removing an absent key is a no-op
    pub fn remove(&self, key: &str) -> Result<()> {
        debug!(%key, "KvStore::remove");
        let mut file = self.open_locked()?;
        let mut map = read_map(&mut file)?;
        if map.remove(key).is_some() {
            write_map(&mut file, &map)?;
        }
        Ok(())
    }

    /// List all keys currently in the store
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut file = self.open_locked()?;
        let map = read_map(&mut file)?;
        Ok(map.keys().cloned().collect())
    }

    fn open_locked(&self) -> Result<fs::File> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .context("Failed to open store file")?;
        file.lock_exclusive().context("Failed to lock store file")?;
        Ok(file)
    }
}

fn read_map(file: &mut fs::File) -> Result<BTreeMap<String, String>> {
    let mut content = String::new();
    file.read_to_string(&mut content).context("Failed to read store file")?;
    if content.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&content).context("Failed to parse store file")
}

fn write_map(file: &mut fs::File, map: &BTreeMap<String, String>) -> Result<()> {
    let content = serde_json::to_string_pretty(map).context("Failed to serialize store")?;
    file.seek(SeekFrom::Start(0)).context("Failed to seek store file")?;
    file.set_len(0).context("Failed to truncate store file")?;
    file.write_all(content.as_bytes()).context("Failed to write store file")?;
    file.sync_all().context("Failed to sync store file")?;
    Ok(())
}
