//! JSON persistence for tracked contracts
//!
//! The whole set is read at the start of a run and overwritten at the end.
//! An unreadable store is treated as empty so a corrupt file never blocks
//! a run.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{normalize_address, TrackedContract};

pub struct ContractStore {
    path: PathBuf,
}

impl ContractStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted set; missing or corrupt files yield an empty set
    pub fn load(&self) -> Vec<TrackedContract> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("📂 No readable store at {} ({}), starting empty", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<TrackedContract>>(&raw) {
            Ok(contracts) => {
                let contracts = dedup_addresses(contracts);
                info!("📂 Loaded {} tracked contracts from {}", contracts.len(), self.path.display());
                contracts
            }
            Err(e) => {
                warn!("📂 Store {} is corrupt ({}), starting empty", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Overwrite the store with the full set (pretty-printed)
    pub fn save(&self, contracts: &[TrackedContract]) -> AppResult<()> {
        let json = serde_json::to_string_pretty(contracts).map_err(|e| {
            AppError::with_source(ErrorCode::StoreWriteFailed, "Failed to serialize store", e)
        })?;

        write_atomic(&self.path, format!("{}\n", json).as_bytes()).map_err(|e| {
            AppError::with_source(
                ErrorCode::StoreWriteFailed,
                format!("Failed to write {}", self.path.display()),
                e,
            )
        })?;

        info!("💾 Saved {} tracked contracts to {}", contracts.len(), self.path.display());
        Ok(())
    }
}

/// Lowercase every address and keep the first record per address
fn dedup_addresses(contracts: Vec<TrackedContract>) -> Vec<TrackedContract> {
    let mut seen = HashSet::new();
    let before = contracts.len();
    let kept: Vec<TrackedContract> = contracts
        .into_iter()
        .filter_map(|mut c| {
            c.address = normalize_address(&c.address);
            seen.insert(c.address.clone()).then_some(c)
        })
        .collect();
    if kept.len() < before {
        warn!("📂 Dropped {} duplicate store entries", before - kept.len());
    }
    kept
}

/// Write through a sibling temp file, then rename over the target
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}
