//! Nutrient vector
//!
//! The ten nutrient values every food carries, on a per-100g basis unless
//! the vector has been scaled to an eaten quantity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Nutrient values for one food or one aggregation window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutrientVector {
    pub calories: f64,        // kcal
    pub energy_kj: f64,       // kJ
    pub protein: f64,         // grams
    pub carbs: f64,           // grams
    pub sugars: f64,          // grams
    pub fat: f64,             // grams
    pub saturated_fat: f64,   // grams
    pub sodium: f64,          // milligrams
    pub fiber: f64,           // grams
    pub fruits_veg_nuts: f64, // percentage, 0-100
}

/// JSON keys in wire order
pub const NUTRIENT_KEYS: [&str; 10] = [
    "calories",
    "energy_kj",
    "protein",
    "carbs",
    "sugars",
    "fat",
    "saturated_fat",
    "sodium",
    "fiber",
    "fruits_veg_nuts",
];

/// kJ per kcal
pub const KJ_PER_KCAL: f64 = 4.184;

/// Round to one decimal place.
///
/// Ties go to the even digit, judged on the exact binary value, so
/// `round1(0.25) == 0.2` and `round1(2.675)` rounds from 2.67499...
pub fn round1(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // `{:.1}` formats from the exact decimal expansion with ties-to-even.
    let rounded = format!("{:.1}", value).parse::<f64>().unwrap_or(value);
    // Normalise -0.0
    rounded + 0.0
}

impl NutrientVector {
    /// Create a new vector with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Stand-in values used when no nutrition source can describe a food
    pub fn oracle_default() -> Self {
        Self {
            calories: 100.0,
            energy_kj: 418.4,
            protein: 5.0,
            carbs: 15.0,
            sugars: 5.0,
            fat: 5.0,
            saturated_fat: 2.0,
            sodium: 100.0,
            fiber: 2.0,
            fruits_veg_nuts: 0.0,
        }
    }

    /// Build a vector from loosely typed JSON.
    ///
    /// Missing keys, nulls and anything that is not a finite number (or a
    /// string holding one) become 0.
    pub fn from_json(value: &Value) -> Self {
        let field = |key: &str| value.get(key).map(lenient_number).unwrap_or(0.0);
        Self {
            calories: field("calories"),
            energy_kj: field("energy_kj"),
            protein: field("protein"),
            carbs: field("carbs"),
            sugars: field("sugars"),
            fat: field("fat"),
            saturated_fat: field("saturated_fat"),
            sodium: field("sodium"),
            fiber: field("fiber"),
            fruits_veg_nuts: field("fruits_veg_nuts"),
        }
    }

    /// Field values paired with their JSON keys
    pub fn fields(&self) -> [(&'static str, f64); 10] {
        [
            ("calories", self.calories),
            ("energy_kj", self.energy_kj),
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("sugars", self.sugars),
            ("fat", self.fat),
            ("saturated_fat", self.saturated_fat),
            ("sodium", self.sodium),
            ("fiber", self.fiber),
            ("fruits_veg_nuts", self.fruits_veg_nuts),
        ]
    }

    /// Apply `f` to every field, the percentage field included
    pub fn map<F: Fn(f64) -> f64>(&self, f: F) -> Self {
        Self {
            calories: f(self.calories),
            energy_kj: f(self.energy_kj),
            protein: f(self.protein),
            carbs: f(self.carbs),
            sugars: f(self.sugars),
            fat: f(self.fat),
            saturated_fat: f(self.saturated_fat),
            sodium: f(self.sodium),
            fiber: f(self.fiber),
            fruits_veg_nuts: f(self.fruits_veg_nuts),
        }
    }

    /// Every field rounded to one decimal
    pub fn rounded(&self) -> Self {
        self.map(round1)
    }

    /// Scale per-100g values to an eaten quantity in grams.
    ///
    /// Each absolute nutrient is multiplied by `grams / 100` and rounded to
    /// one decimal. `fruits_veg_nuts` is a percentage and is left as is.
    pub fn for_quantity(&self, grams: f64) -> Self {
        let factor = grams / 100.0;
        Self {
            fruits_veg_nuts: self.fruits_veg_nuts,
            ..self.map(|v| round1(v * factor))
        }
    }

    /// Fill in `energy_kj` from calories when only calories are known
    pub fn with_energy_completed(mut self) -> Self {
        if self.energy_kj == 0.0 && self.calories != 0.0 {
            self.energy_kj = self.calories * KJ_PER_KCAL;
        }
        self
    }

    /// First field holding NaN or an infinity
    pub fn first_non_finite(&self) -> Option<(&'static str, f64)> {
        self.fields().into_iter().find(|(_, v)| !v.is_finite())
    }

    /// Add another vector field by field
    pub fn add(&self, other: &NutrientVector) -> Self {
        Self {
            calories: self.calories + other.calories,
            energy_kj: self.energy_kj + other.energy_kj,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            sugars: self.sugars + other.sugars,
            fat: self.fat + other.fat,
            saturated_fat: self.saturated_fat + other.saturated_fat,
            sodium: self.sodium + other.sodium,
            fiber: self.fiber + other.fiber,
            fruits_veg_nuts: self.fruits_veg_nuts + other.fruits_veg_nuts,
        }
    }
}

fn lenient_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

impl std::ops::Add for NutrientVector {
    type Output = NutrientVector;

    fn add(self, other: NutrientVector) -> NutrientVector {
        NutrientVector::add(&self, &other)
    }
}

impl std::iter::Sum for NutrientVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientVector::zero(), |acc, n| acc + n)
    }
}
