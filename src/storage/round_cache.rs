//! Last-known-round cache slots.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, warn};

use super::{load_json, save_json};
use crate::discovery::RoundCacheSlot;

/// Process-local cache; forgets everything on exit.
#[derive(Debug, Default)]
pub struct MemoryRoundCache {
    round: Mutex<Option<u32>>,
}

impl MemoryRoundCache {
    pub fn with_round(round: u32) -> Self {
        Self {
            round: Mutex::new(Some(round)),
        }
    }
}

impl RoundCacheSlot for MemoryRoundCache {
    fn last_known_round(&self) -> Option<u32> {
        *self.round.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_last_known_round(&self, round: u32) -> Result<()> {
        *self.round.lock().unwrap_or_else(PoisonError::into_inner) = Some(round);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedRound {
    last_known_round: u32,
    updated_at: DateTime<Utc>,
}

/// Cache persisted as a small JSON file. Read once at construction, written
/// through on every update.
#[derive(Debug)]
pub struct FileRoundCache {
    path: String,
    cached: Mutex<Option<CachedRound>>,
}

impl FileRoundCache {
    /// Open the cache at `path`. An unreadable file is logged and treated
    /// as empty; the next successful search overwrites it.
    pub fn open(path: impl Into<String>) -> Self {
        let path = path.into();
        let cached = match load_json::<CachedRound>(&path) {
            Ok(cached) => cached,
            Err(e) => {
                warn!(path = %path, error = %e, "Ignoring unreadable round cache");
                None
            }
        };
        Self {
            path,
            cached: Mutex::new(cached),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// When the cached round was last written.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|c| c.updated_at)
    }
}

impl RoundCacheSlot for FileRoundCache {
    fn last_known_round(&self) -> Option<u32> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|c| c.last_known_round)
    }

    fn set_last_known_round(&self, round: u32) -> Result<()> {
        let entry = CachedRound {
            last_known_round: round,
            updated_at: Utc::now(),
        };
        save_json(&self.path, &entry)?;
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Some(entry);
        debug!(path = %self.path, round, "Round cache updated");
        Ok(())
    }
}
