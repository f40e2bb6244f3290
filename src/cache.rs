use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{OrgSelector, config_directory};
use crate::error::{AppError, AppResult};

const LEDGER_FILE_NAME: &str = "refresh_ledger.json";
const LEDGER_LIMIT: usize = 256;

#[derive(Default, Serialize, Deserialize)]
struct LedgerFile {
    entries: Vec<LedgerEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub block_id: String,
    pub keys: Vec<String>,
    #[serde(default)]
    pub org: OrgSelector,
    pub updated_at: DateTime<Utc>,
}

pub struct RefreshLedger {
    file_path: PathBuf,
    file: LedgerFile,
}

impl RefreshLedger {
    pub fn load() -> AppResult<Self> {
        Self::load_from(config_directory()?.join(LEDGER_FILE_NAME))
    }

    pub fn load_from(path: PathBuf) -> AppResult<Self> {
        let file = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<LedgerFile>(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid refresh ledger: {err}"))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => LedgerFile::default(),
            Err(err) => return Err(AppError::Io(err)),
        };

        Ok(Self {
            file_path: path,
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.file.entries
    }

    pub fn record(&mut self, entry: LedgerEntry) {
        self.file
            .entries
            .retain(|existing| existing.block_id != entry.block_id);
        self.file.entries.push(entry);

        if self.file.entries.len() > LEDGER_LIMIT {
            let overflow = self.file.entries.len() - LEDGER_LIMIT;
            self.file.entries.drain(0..overflow);
        }
    }

    pub fn remove(&mut self, block_id: &str) -> bool {
        let before = self.file.entries.len();
        self.file.entries.retain(|entry| entry.block_id != block_id);
        self.file.entries.len() != before
    }

    pub fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.file)?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }
}
