//! Draw history file and the offline probe built on it.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::{load_json, save_json, DrawHistorySource};
use crate::discovery::RoundProbe;
use crate::types::DrawRecord;

/// Draw history stored as a JSON array of draws.
#[derive(Debug, Clone)]
pub struct JsonDrawHistory {
    path: String,
}

impl JsonDrawHistory {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Load all draws sorted by round. A missing file is an empty history.
    pub fn load(&self) -> Result<Vec<DrawRecord>> {
        let Some(mut draws) = load_json::<Vec<DrawRecord>>(&self.path)? else {
            info!(path = %self.path, "No draw history found, starting empty");
            return Ok(Vec::new());
        };
        draws.sort_by_key(|d| d.round());
        info!(
            path = %self.path,
            draws = draws.len(),
            latest = draws.last().map(|d| d.round()).unwrap_or(0),
            "Draw history loaded"
        );
        Ok(draws)
    }

    pub fn save(&self, draws: &[DrawRecord]) -> Result<()> {
        save_json(&self.path, draws)?;
        debug!(path = %self.path, draws = draws.len(), "Draw history saved");
        Ok(())
    }

    /// Add `record` unless its round is already stored. Returns whether
    /// the file changed.
    pub fn append(&self, record: DrawRecord) -> Result<bool> {
        let mut draws = self.load()?;
        if draws.iter().any(|d| d.round() == record.round()) {
            return Ok(false);
        }
        draws.push(record);
        draws.sort_by_key(|d| d.round());
        self.save(&draws)?;
        Ok(true)
    }
}

impl DrawHistorySource for JsonDrawHistory {
    fn all(&self) -> Result<Vec<DrawRecord>> {
        self.load()
    }
}

/// `RoundProbe` answering from an in-memory history, for offline runs and
/// tests. Rounds not in the history are reported as unpublished.
#[derive(Debug, Clone, Default)]
pub struct HistoryProbe {
    draws: BTreeMap<u32, DrawRecord>,
}

impl HistoryProbe {
    pub fn new(draws: Vec<DrawRecord>) -> Self {
        Self {
            draws: draws.into_iter().map(|d| (d.round(), d)).collect(),
        }
    }

    pub fn from_source(source: &dyn DrawHistorySource) -> Result<Self> {
        Ok(Self::new(source.all()?))
    }

    pub fn latest_round(&self) -> Option<u32> {
        self.draws.keys().next_back().copied()
    }
}

#[async_trait]
impl RoundProbe for HistoryProbe {
    async fn probe(&self, round: u32) -> Result<Option<DrawRecord>> {
        Ok(self.draws.get(&round).cloned())
    }
}
