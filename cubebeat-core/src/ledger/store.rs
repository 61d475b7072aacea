use std::{fs, io, path::PathBuf};

use parking_lot::Mutex;

use super::{LedgerData, LedgerError};

/// Where the ledger is kept between runs. Every save is a full rewrite.
pub trait LedgerStore: Send + Sync {
    fn load(&self) -> Result<LedgerData, LedgerError>;
    fn save(&self, data: &LedgerData) -> Result<(), LedgerError>;
}

/// Keeps the ledger in a human readable JSON file, one entry per room
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Result<LedgerData, LedgerError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Default::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, data: &LedgerData) -> Result<(), LedgerError> {
        let contents = serde_json::to_string_pretty(data)?;

        // Written beside the ledger, then renamed over it
        let temporary = self.path.with_extension("json.tmp");
        fs::write(&temporary, contents)?;
        fs::rename(&temporary, &self.path)?;

        Ok(())
    }
}

/// A store that never touches the disk
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<LedgerData>,
}

impl MemoryStore {
    pub fn snapshot(&self) -> LedgerData {
        self.saved.lock().clone()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<LedgerData, LedgerError> {
        Ok(self.snapshot())
    }

    fn save(&self, data: &LedgerData) -> Result<(), LedgerError> {
        *self.saved.lock() = data.clone();
        Ok(())
    }
}
