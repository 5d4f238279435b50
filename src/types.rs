//! Shared types for the recommender.
//!
//! These types form the data model used across all modules. Statistics,
//! strategy, selection and discovery code depend on them without
//! depending on each other.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Number universe
// ---------------------------------------------------------------------------

/// Lowest ball number.
pub const MIN_NUMBER: u8 = 1;
/// Highest ball number.
pub const MAX_NUMBER: u8 = 45;
/// Main numbers per draw and per recommendation.
pub const PICK_COUNT: usize = 6;
/// Number of contiguous zones partitioning 1..=45.
pub const ZONE_COUNT: usize = 5;
/// Width of each zone (1–9, 10–18, 19–27, 28–36, 37–45).
pub const ZONE_WIDTH: u8 = 9;

/// Iterate the whole universe in ascending order.
pub fn all_numbers() -> impl Iterator<Item = u8> {
    MIN_NUMBER..=MAX_NUMBER
}

/// Whether `n` lies in 1..=45.
pub fn in_range(n: u8) -> bool {
    (MIN_NUMBER..=MAX_NUMBER).contains(&n)
}

/// Zone index (0..5) of a number.
pub fn zone_of(n: u8) -> usize {
    (((n.max(MIN_NUMBER) - 1) / ZONE_WIDTH) as usize).min(ZONE_COUNT - 1)
}

pub fn is_odd(n: u8) -> bool {
    n % 2 == 1
}

pub fn last_digit(n: u8) -> u8 {
    n % 10
}

/// Check that `numbers` is exactly six distinct in-range values.
pub fn validate_six(numbers: &[u8]) -> Result<(), LottoError> {
    if numbers.len() != PICK_COUNT {
        return Err(LottoError::InvalidCombination(format!(
            "expected {PICK_COUNT} numbers, got {}",
            numbers.len()
        )));
    }
    for (i, &n) in numbers.iter().enumerate() {
        if !in_range(n) {
            return Err(LottoError::InvalidCombination(format!(
                "number {n} out of range ({MIN_NUMBER}-{MAX_NUMBER})"
            )));
        }
        if numbers[i + 1..].contains(&n) {
            return Err(LottoError::InvalidCombination(format!("duplicate number {n}")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Draw record
// ---------------------------------------------------------------------------

/// One published drawing. Immutable once built; the only input the
/// statistics aggregators consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDrawRecord", into = "RawDrawRecord")]
pub struct DrawRecord {
    round: u32,
    date: NaiveDate,
    numbers: [u8; PICK_COUNT],
    bonus: u8,
}

impl DrawRecord {
    /// Build a validated draw. Main numbers are stored sorted.
    pub fn new(
        round: u32,
        date: NaiveDate,
        numbers: [u8; PICK_COUNT],
        bonus: u8,
    ) -> Result<Self, LottoError> {
        if round == 0 {
            return Err(LottoError::InvalidDraw {
                round,
                message: "round must be positive".to_string(),
            });
        }
        validate_six(&numbers).map_err(|e| LottoError::InvalidDraw {
            round,
            message: e.to_string(),
        })?;
        if !in_range(bonus) {
            return Err(LottoError::InvalidDraw {
                round,
                message: format!("bonus {bonus} out of range"),
            });
        }
        if numbers.contains(&bonus) {
            return Err(LottoError::InvalidDraw {
                round,
                message: format!("bonus {bonus} repeats a main number"),
            });
        }
        let mut numbers = numbers;
        numbers.sort_unstable();
        Ok(Self {
            round,
            date,
            numbers,
            bonus,
        })
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Main numbers, ascending.
    pub fn numbers(&self) -> &[u8; PICK_COUNT] {
        &self.numbers
    }

    pub fn bonus(&self) -> u8 {
        self.bonus
    }

    /// Whether `n` is one of the six main numbers.
    pub fn contains(&self, n: u8) -> bool {
        self.numbers.binary_search(&n).is_ok()
    }
}

impl fmt::Display for DrawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mains: Vec<String> = self.numbers.iter().map(|n| format!("{n:02}")).collect();
        write!(
            f,
            "#{} ({}) {} + {:02}",
            self.round,
            self.date,
            mains.join(" "),
            self.bonus
        )
    }
}

/// Unvalidated wire shape; every deserialised draw goes through
/// `DrawRecord::new`.
#[derive(Serialize, Deserialize)]
struct RawDrawRecord {
    round: u32,
    date: NaiveDate,
    numbers: [u8; PICK_COUNT],
    bonus: u8,
}

impl TryFrom<RawDrawRecord> for DrawRecord {
    type Error = LottoError;

    fn try_from(raw: RawDrawRecord) -> Result<Self, Self::Error> {
        DrawRecord::new(raw.round, raw.date, raw.numbers, raw.bonus)
    }
}

impl From<DrawRecord> for RawDrawRecord {
    fn from(d: DrawRecord) -> Self {
        RawDrawRecord {
            round: d.round,
            date: d.date,
            numbers: d.numbers,
            bonus: d.bonus,
        }
    }
}

// ---------------------------------------------------------------------------
// Statistics rows
// ---------------------------------------------------------------------------

/// Per-number statistics, recomputed from scratch on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberStat {
    pub number: u8,
    pub appearance_count: u32,
    /// Round of the most recent appearance; 0 when never drawn.
    pub last_round_seen: u32,
    pub gap_since_last_seen: u32,
    pub popularity_score: f64,
    pub neglect_score: f64,
    pub trend_score: f64,
    /// Static, history-independent.
    pub avoidance_score: f64,
    pub is_odd: bool,
    pub last_digit: u8,
}

impl NumberStat {
    /// Zeroed row used when a number has no computed statistics.
    pub fn empty(number: u8, avoidance_score: f64) -> Self {
        Self {
            number,
            appearance_count: 0,
            last_round_seen: 0,
            gap_since_last_seen: 0,
            popularity_score: 0.0,
            neglect_score: 0.0,
            trend_score: 0.0,
            avoidance_score,
            is_odd: is_odd(number),
            last_digit: last_digit(number),
        }
    }
}

/// Co-occurrence of an unordered pair `first < second`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairStat {
    pub first: u8,
    pub second: u8,
    pub joint_count: u32,
    /// `joint_count / total_draws * 100`.
    pub pair_score: f64,
    pub last_round_together: u32,
}

impl PairStat {
    /// The other member of the pair, if `n` belongs to it.
    pub fn partner_of(&self, n: u8) -> Option<u8> {
        if self.first == n {
            Some(self.second)
        } else if self.second == n {
            Some(self.first)
        } else {
            None
        }
    }

    pub fn is_consecutive(&self) -> bool {
        self.second - self.first == 1
    }
}

// ---------------------------------------------------------------------------
// Strategy input
// ---------------------------------------------------------------------------

/// A caller-supplied strategy name and its additive weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySpec {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl StrategySpec {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }

    /// Equal weights summing to 1, as used when a caller names strategies
    /// without weighting them.
    pub fn equally_weighted<S: AsRef<str>>(names: &[S]) -> Vec<Self> {
        if names.is_empty() {
            return Vec::new();
        }
        let w = 1.0 / names.len() as f64;
        names.iter().map(|n| Self::new(n.as_ref(), w)).collect()
    }
}

impl fmt::Display for StrategySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{:.2}", self.name, self.weight)
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// Six distinct numbers in 1..=45, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Recommendation([u8; PICK_COUNT]);

impl Recommendation {
    pub fn from_numbers(numbers: &[u8]) -> Result<Self, LottoError> {
        validate_six(numbers)?;
        let mut arr = [0u8; PICK_COUNT];
        arr.copy_from_slice(numbers);
        arr.sort_unstable();
        Ok(Self(arr))
    }

    /// For callers that already guarantee six distinct in-range numbers.
    pub(crate) fn from_validated(mut numbers: [u8; PICK_COUNT]) -> Self {
        debug_assert!(validate_six(&numbers).is_ok());
        numbers.sort_unstable();
        Self(numbers)
    }

    pub fn numbers(&self) -> &[u8; PICK_COUNT] {
        &self.0
    }

    pub fn contains(&self, n: u8) -> bool {
        self.0.binary_search(&n).is_ok()
    }

    pub fn sum(&self) -> u32 {
        self.0.iter().map(|&n| n as u32).sum()
    }
}

impl TryFrom<Vec<u8>> for Recommendation {
    type Error = LottoError;

    fn try_from(v: Vec<u8>) -> Result<Self, Self::Error> {
        Recommendation::from_numbers(&v)
    }
}

impl From<Recommendation> for Vec<u8> {
    fn from(r: Recommendation) -> Self {
        r.0.to_vec()
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|n| format!("{n:2}")).collect();
        write!(f, "{}", parts.join(" - "))
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Input errors raised by the recommender.
#[derive(Debug, thiserror::Error)]
pub enum LottoError {
    #[error("No strategies supplied")]
    NoStrategies,

    #[error("No recognized strategies (ignored: {})", ignored.join(", "))]
    NoRecognizedStrategies { ignored: Vec<String> },

    #[error("Invalid weight for strategy {name}: {weight}")]
    InvalidWeight { name: String, weight: f64 },

    #[error("Combination count must be positive")]
    InvalidCount,

    #[error("Invalid combination: {0}")]
    InvalidCombination(String),

    #[error("Invalid draw #{round}: {message}")]
    InvalidDraw { round: u32, message: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 13).unwrap()
    }

    #[test]
    fn test_zone_of_boundaries() {
        assert_eq!(zone_of(1), 0);
        assert_eq!(zone_of(9), 0);
        assert_eq!(zone_of(10), 1);
        assert_eq!(zone_of(27), 2);
        assert_eq!(zone_of(36), 3);
        assert_eq!(zone_of(37), 4);
        assert_eq!(zone_of(45), 4);
    }

    #[test]
    fn test_draw_sorts_numbers() {
        let d = DrawRecord::new(1189, date(), [38, 9, 19, 29, 35, 37], 31).unwrap();
        assert_eq!(d.numbers(), &[9, 19, 29, 35, 37, 38]);
        assert!(d.contains(35));
        assert!(!d.contains(31));
        assert_eq!(d.bonus(), 31);
    }

    #[test]
    fn test_draw_rejects_bad_input() {
        assert!(DrawRecord::new(0, date(), [1, 2, 3, 4, 5, 6], 7).is_err());
        assert!(DrawRecord::new(1, date(), [0, 2, 3, 4, 5, 6], 7).is_err());
        assert!(DrawRecord::new(1, date(), [1, 2, 3, 4, 5, 46], 7).is_err());
        assert!(DrawRecord::new(1, date(), [1, 1, 3, 4, 5, 6], 7).is_err());
        assert!(DrawRecord::new(1, date(), [1, 2, 3, 4, 5, 6], 6).is_err());
        assert!(DrawRecord::new(1, date(), [1, 2, 3, 4, 5, 6], 46).is_err());
    }

    #[test]
    fn test_draw_deserialization_validates() {
        let ok = r#"{"round":5,"date":"2003-01-04","numbers":[16,24,29,40,41,42],"bonus":3}"#;
        let d: DrawRecord = serde_json::from_str(ok).unwrap();
        assert_eq!(d.round(), 5);

        let dup = r#"{"round":5,"date":"2003-01-04","numbers":[16,16,29,40,41,42],"bonus":3}"#;
        assert!(serde_json::from_str::<DrawRecord>(dup).is_err());
    }

    #[test]
    fn test_recommendation_validation() {
        let r = Recommendation::from_numbers(&[45, 1, 20, 33, 7, 12]).unwrap();
        assert_eq!(r.numbers(), &[1, 7, 12, 20, 33, 45]);
        assert_eq!(r.sum(), 118);
        assert!(Recommendation::from_numbers(&[1, 2, 3, 4, 5]).is_err());
        assert!(Recommendation::from_numbers(&[1, 2, 3, 4, 5, 5]).is_err());
        assert!(Recommendation::from_numbers(&[1, 2, 3, 4, 5, 0]).is_err());
    }

    #[test]
    fn test_recommendation_display() {
        let r = Recommendation::from_numbers(&[3, 11, 22, 30, 38, 44]).unwrap();
        assert_eq!(format!("{r}"), " 3 - 11 - 22 - 30 - 38 - 44");
    }

    #[test]
    fn test_pair_partner() {
        let p = PairStat {
            first: 4,
            second: 5,
            joint_count: 2,
            pair_score: 1.0,
            last_round_together: 10,
        };
        assert_eq!(p.partner_of(4), Some(5));
        assert_eq!(p.partner_of(5), Some(4));
        assert_eq!(p.partner_of(6), None);
        assert!(p.is_consecutive());
    }

    #[test]
    fn test_equal_weights() {
        let specs = StrategySpec::equally_weighted(&["popularity", "trend"]);
        assert_eq!(specs.len(), 2);
        assert!((specs[0].weight - 0.5).abs() < 1e-12);
        assert!(StrategySpec::equally_weighted::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_error_display() {
        let e = LottoError::NoRecognizedStrategies {
            ignored: vec!["foo".into(), "bar".into()],
        };
        assert_eq!(e.to_string(), "No recognized strategies (ignored: foo, bar)");
    }
}
