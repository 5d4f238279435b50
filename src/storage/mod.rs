//! Persistence layer.
//!
//! JSON-file adapters for the collaborators the engine consumes: the draw
//! history, the last-known-round cache and the generation log. Also an
//! offline `RoundProbe` answering from a loaded history.

pub mod history;
pub mod round_cache;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

use crate::engine::GenerationRecord;
use crate::types::DrawRecord;
pub use history::{HistoryProbe, JsonDrawHistory};
pub use round_cache::{FileRoundCache, MemoryRoundCache};

/// Source of the complete draw history, ascending by round.
pub trait DrawHistorySource: Send + Sync {
    fn all(&self) -> Result<Vec<DrawRecord>>;
}

// ---------------------------------------------------------------------------
// JSON helpers
// ---------------------------------------------------------------------------

/// Serialise `value` to `path`, creating parent directories.
pub(crate) fn save_json<T: Serialize + ?Sized>(path: &str, value: &T) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for {path}"))?;
        }
    }
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialise {path}"))?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {path}"))?;
    Ok(())
}

/// Parse `path`, or `None` when the file does not exist.
pub(crate) fn load_json<T: DeserializeOwned>(path: &str) -> Result<Option<T>> {
    if !Path::new(path).exists() {
        return Ok(None);
    }
    let json =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let value =
        serde_json::from_str(&json).with_context(|| format!("Failed to parse {path}"))?;
    Ok(Some(value))
}

// ---------------------------------------------------------------------------
// Generation log
// ---------------------------------------------------------------------------

/// Load every logged generation; an absent log is empty.
pub fn load_generations(path: &str) -> Result<Vec<GenerationRecord>> {
    Ok(load_json(path)?.unwrap_or_default())
}

/// Append `records` to the log at `path`. Returns the new log length.
pub fn append_generations(path: &str, records: &[GenerationRecord]) -> Result<usize> {
    let mut log = load_generations(path)?;
    log.extend_from_slice(records);
    save_json(path, &log)?;
    debug!(path, appended = records.len(), total = log.len(), "Generation log updated");
    Ok(log.len())
}

/// Delete a storage file (for testing or reset).
pub fn delete_file(path: &str) -> Result<()> {
    if Path::new(path).exists() {
        std::fs::remove_file(path).with_context(|| format!("Failed to delete {path}"))?;
        info!(path, "Storage file deleted");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
