//! Data models
//!
//! Nutrient vectors plus the stored food records they travel in.

mod food_entry;
mod food_reference;
mod nutrients;

pub use food_entry::{
    sanitize_quantity, AdjustedNutrition, FoodEntry, FoodEntryCreate, MealType, DATE_FORMAT,
    DEFAULT_QUANTITY_G,
};
pub use food_reference::{FoodReference, FoodReferenceCreate, FoodReferenceUsage, GENERIC_BRAND};
pub use nutrients::{round1, NutrientVector, KJ_PER_KCAL, NUTRIENT_KEYS};
