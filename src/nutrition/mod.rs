//! Nutrition source handling
//!
//! Turns replies from an external nutrition source into nutrient vectors.

pub mod parser;

pub use parser::{parse_nutrition_reply, resolve_nutrition, CannedReply, NutritionSource};
