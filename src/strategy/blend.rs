//! Deterministic linear blends over the statistics columns.

use super::ScoreMap;
use crate::stats::StatisticsSnapshot;
use crate::types::{all_numbers, NumberStat};

/// Coefficients of one blend: a linear combination plus a constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub appearance: f64,
    pub popularity: f64,
    pub trend: f64,
    pub neglect: f64,
    pub offset: f64,
}

impl Coefficients {
    const fn new(appearance: f64, popularity: f64, trend: f64, neglect: f64, offset: f64) -> Self {
        Self {
            appearance,
            popularity,
            trend,
            neglect,
            offset,
        }
    }

    pub fn evaluate(&self, stat: &NumberStat) -> f64 {
        self.appearance * stat.appearance_count as f64
            + self.popularity * stat.popularity_score
            + self.trend * stat.trend_score
            + self.neglect * stat.neglect_score
            + self.offset
    }
}

/// Named pure-statistics presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blend {
    /// Also switches selection to the deterministic branch.
    StatisticsMode,
    HighFrequency,
    Neglected,
    RecentTrend,
    HighWeight,
    Balanced,
    Cyclic,
    Correlation,
    Regression,
}

impl Blend {
    pub const ALL: [Blend; 9] = [
        Blend::StatisticsMode,
        Blend::HighFrequency,
        Blend::Neglected,
        Blend::RecentTrend,
        Blend::HighWeight,
        Blend::Balanced,
        Blend::Cyclic,
        Blend::Correlation,
        Blend::Regression,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Blend::StatisticsMode => "pure-statistics-mode",
            Blend::HighFrequency => "pure-high-frequency",
            Blend::Neglected => "pure-neglected",
            Blend::RecentTrend => "pure-recent-trend",
            Blend::HighWeight => "pure-high-weight",
            Blend::Balanced => "pure-balanced",
            Blend::Cyclic => "pure-cyclic",
            Blend::Correlation => "pure-correlation",
            Blend::Regression => "pure-regression",
        }
    }

    /// Match a normalised (lowercase, hyphenated) key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "pure" | "pure-statistics" | "순수통계" => return Some(Blend::StatisticsMode),
            "순수고빈도" => return Some(Blend::HighFrequency),
            "순수소외번호" => return Some(Blend::Neglected),
            "순수최근추세" => return Some(Blend::RecentTrend),
            "순수고가중치" => return Some(Blend::HighWeight),
            "순수균형가중치" => return Some(Blend::Balanced),
            "순수주기성" => return Some(Blend::Cyclic),
            "순수상관관계" => return Some(Blend::Correlation),
            "순수회귀분석" => return Some(Blend::Regression),
            _ => {}
        }
        Self::ALL.into_iter().find(|b| b.name() == key)
    }

    pub fn coefficients(self) -> Coefficients {
        match self {
            Blend::StatisticsMode => Coefficients::new(0.4, 0.3, 0.2, 0.1, 0.0),
            Blend::HighFrequency => Coefficients::new(1.0, 0.0, 0.0, 0.0, 0.0),
            Blend::Neglected => Coefficients::new(0.0, 0.0, 0.0, 1.0, 0.0),
            Blend::RecentTrend => Coefficients::new(0.0, 0.0, 1.0, 0.0, 0.0),
            Blend::HighWeight => Coefficients::new(1.4, 0.6, 0.0, 0.0, 0.0),
            Blend::Balanced => Coefficients::new(0.25, 0.25, 0.25, 0.25, 0.0),
            Blend::Cyclic => Coefficients::new(1.0, 0.0, 0.0, -1.0, 0.0),
            Blend::Correlation => Coefficients::new(0.0, 0.5, 0.5, 0.0, 0.0),
            Blend::Regression => Coefficients::new(0.6, 0.0, 0.0, -0.4, 40.0),
        }
    }

    /// Add `coefficients · stat × weight` for every number.
    pub fn apply(self, map: &mut ScoreMap, snapshot: &StatisticsSnapshot, weight: f64) {
        let coeffs = self.coefficients();
        for n in all_numbers() {
            map.add(n, coeffs.evaluate(&snapshot.number(n)) * weight);
        }
    }
}
