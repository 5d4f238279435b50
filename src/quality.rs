//! Quality grading for any six-number combination.
//!
//! Independent of history: scores parity balance, zone coverage and
//! adjacency, each capped, for a total of at most 100.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{is_odd, validate_six, zone_of, LottoError, ZONE_COUNT};

const PARITY_MAX: u32 = 30;
const ZONE_MAX: u32 = 40;
const CONSECUTIVE_MAX: u32 = 30;

/// Coarse label for a quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityGrade {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => QualityGrade::Excellent,
            60..=79 => QualityGrade::Good,
            40..=59 => QualityGrade::Fair,
            _ => QualityGrade::Poor,
        }
    }
}

impl fmt::Display for QualityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityGrade::Excellent => write!(f, "Excellent"),
            QualityGrade::Good => write!(f, "Good"),
            QualityGrade::Fair => write!(f, "Fair"),
            QualityGrade::Poor => write!(f, "Poor"),
        }
    }
}

/// Score, grade and the analysis behind them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub score: u32,
    pub grade: QualityGrade,
    pub parity_score: u32,
    pub zone_score: u32,
    pub consecutive_score: u32,
    pub odd_count: usize,
    pub even_count: usize,
    /// Numbers per zone: 1–9, 10–18, 19–27, 28–36, 37–45.
    pub zone_counts: [usize; ZONE_COUNT],
    /// Adjacent pairs (n, n + 1) after sorting.
    pub adjacent_pairs: Vec<(u8, u8)>,
}

impl QualityReport {
    pub fn empty_zones(&self) -> usize {
        self.zone_counts.iter().filter(|&&c| c == 0).count()
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/100 ({}) | odd:even {}:{} | zones {:?} | adjacent {}",
            self.score,
            self.grade,
            self.odd_count,
            self.even_count,
            self.zone_counts,
            self.adjacent_pairs.len()
        )
    }
}

/// Grade six distinct numbers in 1..=45.
pub fn score(numbers: &[u8]) -> Result<QualityReport, LottoError> {
    validate_six(numbers)?;

    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();

    let odd_count = sorted.iter().filter(|&&n| is_odd(n)).count();
    let even_count = sorted.len() - odd_count;
    let parity_score = PARITY_MAX.saturating_sub(5 * odd_count.abs_diff(even_count) as u32);

    let mut zone_counts = [0usize; ZONE_COUNT];
    for &n in &sorted {
        zone_counts[zone_of(n)] += 1;
    }
    let empty = zone_counts.iter().filter(|&&c| c == 0).count() as u32;
    let mut zone_score = ZONE_MAX.saturating_sub(8 * empty);
    if zone_counts.iter().any(|&c| c > 3) {
        zone_score = zone_score.saturating_sub(15);
    }

    let adjacent_pairs: Vec<(u8, u8)> = sorted
        .windows(2)
        .filter(|w| w[1] == w[0] + 1)
        .map(|w| (w[0], w[1]))
        .collect();
    let consecutive_score =
        CONSECUTIVE_MAX.saturating_sub(10 * adjacent_pairs.len() as u32);

    let score = (parity_score + zone_score + consecutive_score).min(100);

    Ok(QualityReport {
        score,
        grade: QualityGrade::from_score(score),
        parity_score,
        zone_score,
        consecutive_score,
        odd_count,
        even_count,
        zone_counts,
        adjacent_pairs,
    })
}
