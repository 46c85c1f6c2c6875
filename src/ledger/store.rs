use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::ledger::{CollectionEntry, LedgerStore};

/// Volatile [`LedgerStore`], for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    entries: RwLock<HashMap<Uuid, CollectionEntry>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> Result<Vec<CollectionEntry>> {
        Ok(self.entries.read().values().cloned().collect())
    }

    fn save(&self, entry: &CollectionEntry) -> Result<()> {
        self.entries.write().insert(entry.id, entry.clone());
        Ok(())
    }

    fn remove(&self, id: Uuid) -> Result<bool> {
        Ok(self.entries.write().remove(&id).is_some())
    }
}

const LEDGER_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct LedgerFile {
    version: u32,
    entries: Vec<CollectionEntry>,
}

/// [`LedgerStore`] persisted as one JSON document.
///
/// The whole document is rewritten on every change, through a sibling
/// temporary file that is flushed to disk before being renamed over the
/// original, so a crash mid-write leaves the previous version intact. The in-memory copy only changes once the write
/// succeeded.
#[derive(Debug)]
pub struct JsonLedgerStore {
    path: PathBuf,
    entries: Mutex<Vec<CollectionEntry>>,
}

impl JsonLedgerStore {
    /// Opens the ledger at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// * [`Error::Io`] - If the file exists but cannot be read
    /// * [`Error::Persistence`] - If its contents are not a ledger document
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let file: LedgerFile = serde_json::from_str(&content).map_err(|e| {
                Error::persistence(format!("corrupt ledger {}: {}", path.display(), e))
            })?;
            if file.version > LEDGER_FORMAT_VERSION {
                return Err(Error::persistence(format!(
                    "ledger {} has unsupported version {}",
                    path.display(),
                    file.version
                )));
            }
            file.entries
        } else {
            Vec::new()
        };

        debug!(path = %path.display(), entries = entries.len(), "opened ledger");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, entries: &[CollectionEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let document = serde_json::to_vec_pretty(&LedgerFile {
            version: LEDGER_FORMAT_VERSION,
            entries: entries.to_vec(),
        })?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        let mut file = File::create(&temp)?;
        file.write_all(&document)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl LedgerStore for JsonLedgerStore {
    fn load(&self) -> Result<Vec<CollectionEntry>> {
        Ok(self.entries.lock().clone())
    }

    fn save(&self, entry: &CollectionEntry) -> Result<()> {
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        match next.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => *existing = entry.clone(),
            None => next.push(entry.clone()),
        }

        self.write(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, id: Uuid) -> Result<bool> {
        let mut entries = self.entries.lock();
        let mut next = entries.clone();
        let before = next.len();
        next.retain(|entry| entry.id != id);
        if next.len() == before {
            return Ok(false);
        }

        self.write(&next)?;
        *entries = next;
        Ok(true)
    }
}
