//! Generation records: one per produced combination, for the log file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::quality::{QualityGrade, QualityReport};
use crate::strategy::StrategyPlan;
use crate::types::{Recommendation, StrategySpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub numbers: Recommendation,
    /// Canonical names and weights as applied.
    pub strategies: Vec<StrategySpec>,
    pub quality_score: u32,
    pub grade: QualityGrade,
    /// Round the combination was generated for, when known.
    pub target_round: Option<u32>,
    pub deterministic: bool,
}

impl GenerationRecord {
    pub fn new(
        numbers: Recommendation,
        plan: &StrategyPlan,
        report: &QualityReport,
        target_round: Option<u32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            numbers,
            strategies: plan.specs(),
            quality_score: report.score,
            grade: report.grade,
            target_round,
            deterministic: plan.is_deterministic(),
        }
    }
}

impl fmt::Display for GenerationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target_round {
            Some(round) => write!(f, "[#{round}] ")?,
            None => write!(f, "[#?] ")?,
        }
        write!(
            f,
            "{}  ({}/100, {})",
            self.numbers, self.quality_score, self.grade
        )
    }
}
