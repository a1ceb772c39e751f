//! Score calculator
//!
//! Turns a per-100g nutrient vector into a Nutri-Score style record: the raw
//! point score, a 0-100 display score and an A-E grade.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bands;
use crate::models::NutrientVector;

/// Negative point total at which protein stops earning credit
pub const PROTEIN_CAP_NEGATIVE_POINTS: u8 = 11;

/// Produce percentage at or above which protein credit is kept regardless
pub const PROTEIN_CAP_PRODUCE_EXEMPTION: f64 = 80.0;

/// Nominal raw score range used by the 0-100 rescaling
pub const NOMINAL_MIN_SCORE: i32 = -15;
pub const NOMINAL_MAX_SCORE: i32 = 40;

/// Letter grade, A best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    E,
}

impl Grade {
    /// Grade for a raw score. Cut points are inclusive upper bounds.
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s <= -1 => Grade::A,
            s if s <= 2 => Grade::B,
            s if s <= 10 => Grade::C,
            s if s <= 18 => Grade::D,
            _ => Grade::E,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
        }
    }

    /// Parse a stored grade letter
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "A" => Some(Grade::A),
            "B" => Some(Grade::B),
            "C" => Some(Grade::C),
            "D" => Some(Grade::D),
            "E" => Some(Grade::E),
            _ => None,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points penalising energy, sugar, saturated fat and sodium
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegativePoints {
    pub energy: u8,
    pub sugars: u8,
    pub saturated_fat: u8,
    pub sodium: u8,
    pub total: u8,
}

/// Points rewarding produce, fiber and protein
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositivePoints {
    pub fruits_veg_nuts: u8,
    pub fiber: u8,
    pub protein: u8,
    pub total: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub negative_points: NegativePoints,
    pub positive_points: PositivePoints,
}

/// Full result of scoring one nutrient vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Raw score, nominally -15 to +40, lower is better
    pub score: i32,
    /// 0-100, higher is better
    pub simple_score: i32,
    pub grade: Grade,
    pub components: ScoreComponents,
}

impl ScoreRecord {
    /// The "neutral food" record returned whenever real values are unusable
    pub fn neutral() -> Self {
        Self {
            score: 0,
            simple_score: 50,
            grade: Grade::C,
            components: ScoreComponents::default(),
        }
    }

    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            grade: self.grade,
            score: self.score,
            simple_score: self.simple_score,
        }
    }
}

/// The three score fields persisted alongside a food
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub grade: Grade,
    pub score: i32,
    pub simple_score: i32,
}

impl Default for ScoreSummary {
    fn default() -> Self {
        ScoreRecord::neutral().summary()
    }
}

/// Scoring error types
#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("Nutrient '{field}' is not a finite number: {value}")]
    NonFinite { field: &'static str, value: f64 },
}

/// Score a nutrient vector.
///
/// Never fails: any vector that cannot be scored yields
/// [`ScoreRecord::neutral`] and an error log line.
pub fn compute(nutrients: &NutrientVector) -> ScoreRecord {
    match try_compute(nutrients) {
        Ok(record) => record,
        Err(e) => {
            tracing::error!("Error calculating Nutri-Score: {}", e);
            ScoreRecord::neutral()
        }
    }
}

/// Score a nutrient vector, reporting unusable input
pub fn try_compute(nutrients: &NutrientVector) -> Result<ScoreRecord, ScoreError> {
    if let Some((field, value)) = nutrients.first_non_finite() {
        return Err(ScoreError::NonFinite { field, value });
    }

    let energy = bands::ENERGY_KJ.points(nutrients.energy_kj);
    let sugars = bands::SUGARS_G.points(nutrients.sugars);
    let saturated_fat = bands::SATURATED_FAT_G.points(nutrients.saturated_fat);
    let sodium = bands::SODIUM_G.points(nutrients.sodium / 1000.0);
    let negative_total = energy + sugars + saturated_fat + sodium;

    let fruits_veg_nuts = bands::FRUITS_VEG_NUTS_PCT.points(nutrients.fruits_veg_nuts);
    let fiber = bands::FIBER_G.points(nutrients.fiber);
    let mut protein = bands::PROTEIN_G.points(nutrients.protein);

    // Unhealthy foods only keep protein credit when they are mostly produce
    if negative_total >= PROTEIN_CAP_NEGATIVE_POINTS
        && nutrients.fruits_veg_nuts < PROTEIN_CAP_PRODUCE_EXEMPTION
    {
        protein = 0;
    }
    let positive_total = fruits_veg_nuts + fiber + protein;

    let score = i32::from(negative_total) - i32::from(positive_total);

    Ok(ScoreRecord {
        score,
        simple_score: simple_score(score),
        grade: Grade::from_score(score),
        components: ScoreComponents {
            negative_points: NegativePoints {
                energy,
                sugars,
                saturated_fat,
                sodium,
                total: negative_total,
            },
            positive_points: PositivePoints {
                fruits_veg_nuts,
                fiber,
                protein,
                total: positive_total,
            },
        },
    })
}

/// Rescale a raw score onto 0-100 (100 best), clamping anything outside the
/// nominal range.
pub fn simple_score(score: i32) -> i32 {
    let width = f64::from(NOMINAL_MAX_SCORE - NOMINAL_MIN_SCORE);
    let scaled = 100.0 - f64::from(score - NOMINAL_MIN_SCORE) * (100.0 / width);
    (scaled.round_ties_even() as i32).clamp(0, 100)
}
