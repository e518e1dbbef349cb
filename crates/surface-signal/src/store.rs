//! Durable slot stores shared by every surface of one application instance.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    process,
    sync::Arc,
};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::{Error, Result, Signal};

/// Key/value slots holding at most one [`Signal`] each.
///
/// Writes replace the slot's previous record; there is no history.
pub trait SlotStore: Send + Sync {
    /// Current record in `slot`, if any.
    fn read(&self, slot: &str) -> Result<Option<Signal>>;

    /// Replace the record in `slot`.
    fn write(&self, slot: &str, signal: &Signal) -> Result<()>;
}

/// In-memory store. Clones share the same slots.
#[derive(Clone, Default, Debug)]
pub struct MemoryStore {
    /// Slot contents.
    slots: Arc<Mutex<BTreeMap<String, Signal>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemoryStore {
    fn read(&self, slot: &str) -> Result<Option<Signal>> {
        Ok(self.slots.lock().get(slot).cloned())
    }

    fn write(&self, slot: &str, signal: &Signal) -> Result<()> {
        self.slots.lock().insert(slot.to_string(), signal.clone());
        Ok(())
    }
}

/// JSON file holding every slot as one object: `{ "<slot>": { "id", "timestamp" } }`.
///
/// Writes go to a sibling temp file that is then renamed over the target, so
/// readers in other processes never observe a partial file.
#[derive(Debug)]
pub struct FileStore {
    /// Backing file.
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    /// Store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the slot map; a missing file is an empty map.
    fn load(&self) -> Result<BTreeMap<String, Signal>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(Error::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|source| Error::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the slot map atomically.
    fn save(&self, slots: &BTreeMap<String, Signal>) -> Result<()> {
        let io_err = |source| Error::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(format!(".{}.tmp", process::id()));
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, serde_json::to_vec_pretty(slots)?).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl SlotStore for FileStore {
    fn read(&self, slot: &str) -> Result<Option<Signal>> {
        let _g = self.lock.lock();
        Ok(self.load()?.remove(slot))
    }

    fn write(&self, slot: &str, signal: &Signal) -> Result<()> {
        let _g = self.lock.lock();
        let mut slots = match self.load() {
            Ok(s) => s,
            Err(e @ Error::Corrupt { .. }) => {
                warn!(error = %e, "discarding corrupt signal store");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        slots.insert(slot.to_string(), signal.clone());
        self.save(&slots)?;
        debug!(slot, id = %signal.id, path = %self.path.display(), "signal written");
        Ok(())
    }
}
