//! Mock draw publisher for integration testing.
//!
//! Provides a deterministic `RoundProbe` that publishes every round up to
//! a configurable latest round, counts probes, and can be forced to fail
//! like a broken transport.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use lotto_recommender::discovery::{rounds, RoundProbe};
use lotto_recommender::types::DrawRecord;

/// A mock publisher for deterministic discovery testing.
pub struct MockPublisher {
    latest: u32,
    calls: AtomicU32,
    probed: Arc<Mutex<Vec<u32>>>,
    /// If set, every probe fails with this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockPublisher {
    pub fn new(latest: u32) -> Self {
        Self {
            latest,
            calls: AtomicU32::new(0),
            probed: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Force all subsequent probes to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Rounds probed so far, in order.
    pub fn probed(&self) -> Vec<u32> {
        self.probed.lock().unwrap().clone()
    }
}

/// Deterministic draw for `round`, spread across the universe.
pub fn make_draw(round: u32) -> DrawRecord {
    let date = rounds::draw_date_for_round(round)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(2002, 12, 7).unwrap());
    let base = (round * 11) % 45;
    let mut numbers = [0u8; 6];
    for (i, slot) in numbers.iter_mut().enumerate() {
        *slot = ((base + i as u32 * 7) % 45 + 1) as u8;
    }
    let mut bonus = ((base + 44) % 45 + 1) as u8;
    while numbers.contains(&bonus) {
        bonus = bonus % 45 + 1;
    }
    DrawRecord::new(round, date, numbers, bonus).unwrap()
}

pub fn make_history(latest: u32) -> Vec<DrawRecord> {
    (1..=latest).map(make_draw).collect()
}

#[async_trait]
impl RoundProbe for MockPublisher {
    async fn probe(&self, round: u32) -> Result<Option<DrawRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.probed.lock().unwrap().push(round);

        if let Some(msg) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{msg}"));
        }
        if round >= 1 && round <= self.latest {
            Ok(Some(make_draw(round)))
        } else {
            Ok(None)
        }
    }
}
