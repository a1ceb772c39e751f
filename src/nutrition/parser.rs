//! Nutrition source replies
//!
//! A nutrition source (language model or nutrition API) answers with free
//! text listing nine numbers per 100g, in this order:
//!
//! `calories, energy_kj, sugars, saturated_fat, fat, sodium, fiber, protein, fruits_veg_nuts`
//!
//! The text is often wrapped in prose or labels, so parsing is forgiving.

use crate::models::{round1, NutrientVector};

/// Number of values a reply must carry
pub const REPLY_VALUE_COUNT: usize = 9;

/// Ratio used to estimate carbs from sugars, which replies do not include
pub const CARBS_PER_SUGAR: f64 = 1.2;

/// Something that can describe a food's nutrients as reply text
pub trait NutritionSource {
    /// Raw reply for a food, or None when the source has nothing
    fn lookup(&self, food_name: &str) -> Option<String>;
}

/// A reply that was already obtained elsewhere (e.g. by an MCP client)
#[derive(Debug, Clone)]
pub struct CannedReply(pub String);

impl NutritionSource for CannedReply {
    fn lookup(&self, _food_name: &str) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Parse a reply into a per-100g vector.
///
/// Returns None when fewer than nine values can be found or when calories,
/// protein and fat are all zero.
pub fn parse_nutrition_reply(reply: &str) -> Option<NutrientVector> {
    let reply = reply.trim();
    tracing::debug!("Parsing nutrition values from: {}", reply);

    let runs = numeric_runs(reply);
    let values = if runs.len() >= REPLY_VALUE_COUNT {
        let mut values = Vec::with_capacity(REPLY_VALUE_COUNT);
        for run in &runs[..REPLY_VALUE_COUNT] {
            match run.parse::<f64>() {
                Ok(v) if v.is_finite() => values.push(v),
                _ => {
                    tracing::warn!("Could not parse nutrition value '{}'", run);
                    return None;
                }
            }
        }
        values
    } else {
        // Fewer numbers than expected; fall back to comma separated fields
        let pieces: Vec<&str> = reply.split(',').map(str::trim).collect();
        if pieces.len() < REPLY_VALUE_COUNT {
            tracing::info!(
                "Not enough values provided: expected {}, got {}",
                REPLY_VALUE_COUNT,
                pieces.len()
            );
            return None;
        }
        pieces[..REPLY_VALUE_COUNT].iter().map(|p| extract_number(p)).collect()
    };

    let sugars = round1(values[2]);
    let nutrition = NutrientVector {
        calories: round1(values[0]),
        energy_kj: round1(values[1]),
        sugars,
        saturated_fat: round1(values[3]),
        fat: round1(values[4]),
        sodium: round1(values[5]),
        fiber: round1(values[6]),
        protein: round1(values[7]),
        fruits_veg_nuts: round1(values[8]),
        carbs: round1(sugars * CARBS_PER_SUGAR),
    };

    if nutrition.calories < 1.0 || nutrition.calories > 1000.0 {
        tracing::info!("Calories value seems unreasonable: {}", nutrition.calories);
    }

    if nutrition.calories == 0.0 && nutrition.protein == 0.0 && nutrition.fat == 0.0 {
        tracing::warn!("All main nutrition values are zero, rejecting reply");
        return None;
    }

    Some(nutrition)
}

/// Ask `source` about a food, falling back to stand-in values when it has no
/// usable answer
pub fn resolve_nutrition(source: &dyn NutritionSource, food_name: &str) -> NutrientVector {
    match source.lookup(food_name).as_deref().and_then(parse_nutrition_reply) {
        Some(nutrition) => {
            tracing::info!("Resolved nutrition for '{}'", food_name);
            nutrition.with_energy_completed()
        }
        None => {
            tracing::info!("Failed to get nutrition values for '{}', using defaults", food_name);
            NutrientVector::oracle_default()
        }
    }
}

/// Maximal runs of digits, '.' and '-' that contain at least one digit
fn numeric_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;

    for (i, c) in text.char_indices() {
        let numeric = c.is_ascii_digit() || c == '.' || c == '-';
        match (numeric, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(&text[s..i]);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(&text[s..]);
    }

    runs.retain(|run| run.chars().any(|c| c.is_ascii_digit()));
    runs
}

/// Keep only digits, '.' and '-' and parse; anything unparseable is 0
fn extract_number(piece: &str) -> f64 {
    let cleaned: String = piece
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}
