//! Food Entry MCP Tools
//!
//! Logging, listing and deleting the foods a user ate.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;

use crate::db::Database;
use crate::models::{
    sanitize_quantity, AdjustedNutrition, FoodEntry, FoodEntryCreate, FoodReference,
    FoodReferenceCreate, FoodReferenceUsage, MealType, NutrientVector, GENERIC_BRAND,
};
use crate::nutrition::{resolve_nutrition, CannedReply};
use crate::scoring::EntryDetail;

/// Everything a client may send when logging a food
#[derive(Debug, Clone, Default)]
pub struct LogFoodRequest {
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub meal_type: Option<String>,
    /// Grams eaten; defaults to 100
    pub quantity: Option<f64>,
    /// Defaults to today
    pub date: Option<NaiveDate>,
    /// Log straight from a known reference
    pub reference_id: Option<i64>,
    /// Per-100g nutrients typed in by the user. May also carry `unit` and `weight`.
    pub nutrients: Option<Value>,
    /// Raw reply from a nutrition source, used when no reference matches
    pub nutrition_reply: Option<String>,
    /// Share a newly created reference with other users
    pub is_shared: bool,
}

/// Where the logged nutrients came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionOrigin {
    Reference,
    Manual,
    ExistingReference,
    NutritionReply,
}

/// Response for log_food
#[derive(Debug, Serialize)]
pub struct LogFoodResponse {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub quantity: f64,
    pub reference_id: i64,
    pub source: NutritionOrigin,
    pub nutrition: AdjustedNutrition,
}

/// Response for list_food_entries
#[derive(Debug, Serialize)]
pub struct ListFoodEntriesResponse {
    pub entries: Vec<EntryDetail>,
    pub total: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Log a food, working out its nutrients in this order: an explicit
/// reference, manual nutrients, a similar known reference, then a
/// nutrition source reply.
pub fn log_food(
    db: &Database,
    user_id: i64,
    request: &LogFoodRequest,
) -> Result<LogFoodResponse, String> {
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err("Food name is required".to_string());
    }

    let mut brand = non_empty(request.brand.as_deref());
    let description = non_empty(request.description.as_deref());
    let meal_type = request
        .meal_type
        .as_deref()
        .map(MealType::from_str)
        .unwrap_or_default();
    let quantity = sanitize_quantity(request.quantity);
    let date = request.date.unwrap_or_else(|| Local::now().date_naive());

    tracing::info!(
        "Logging '{}' (brand: {:?}), {}g as {} on {}",
        name,
        brand,
        quantity,
        meal_type.as_str(),
        date
    );

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let new_reference = |nutrients: NutrientVector, unit: Option<String>, weight: Option<f64>| {
        FoodReferenceCreate {
            name: name.clone(),
            brand: brand.clone(),
            nutrients,
            is_shared: request.is_shared,
            creator_id: user_id,
            last_used_quantity: quantity,
            last_used_unit: unit,
            last_used_meal_type: meal_type,
            weight_per_unit: weight,
        }
    };

    let (reference, source) = if let Some(reference_id) = request.reference_id {
        let reference = FoodReference::get_by_id(&conn, reference_id)
            .map_err(|e| format!("Failed to get food reference: {}", e))?
            .filter(|r| r.is_shared || r.creator_id == user_id)
            .ok_or_else(|| format!("Food reference not found with id: {}", reference_id))?;
        (reference, NutritionOrigin::Reference)
    } else if let Some(manual) = &request.nutrients {
        let unit = manual.get("unit").and_then(Value::as_str).map(String::from);
        let weight = manual.get("weight").and_then(Value::as_f64).unwrap_or(100.0);

        let existing = FoodReference::find_similar_branded(&conn, &name, brand.as_deref(), user_id)
            .map_err(|e| format!("Failed to search food references: {}", e))?;

        match existing {
            Some(reference) => {
                // Manual values may be rough; keep the stored nutrients
                let usage = FoodReferenceUsage {
                    quantity,
                    meal_type,
                    unit,
                    weight_per_unit: Some(weight),
                };
                FoodReference::touch_last_used(&conn, reference.id, &usage)
                    .map_err(|e| format!("Failed to update food reference: {}", e))?;
                (reference, NutritionOrigin::ExistingReference)
            }
            None => {
                let nutrients = NutrientVector::from_json(manual);
                let reference =
                    FoodReference::create(&conn, &new_reference(nutrients, unit, Some(weight)))
                        .map_err(|e| format!("Failed to create food reference: {}", e))?;
                tracing::info!("Stored manual nutrition as reference {} for '{}'", reference.id, name);
                (reference, NutritionOrigin::Manual)
            }
        }
    } else {
        let mut found = FoodReference::find_similar_branded(&conn, &name, brand.as_deref(), user_id)
            .map_err(|e| format!("Failed to search food references: {}", e))?;
        if found.is_none() {
            found = FoodReference::find_similar(&conn, &name, user_id)
                .map_err(|e| format!("Failed to search food references: {}", e))?;
        }

        match (found, request.nutrition_reply.as_deref()) {
            (Some(reference), _) => {
                tracing::info!("Found '{}' in reference database", name);
                if brand.as_deref().map_or(true, |b| b == GENERIC_BRAND) {
                    brand = Some(reference.brand.clone());
                }
                let usage = FoodReferenceUsage {
                    quantity,
                    meal_type,
                    unit: None,
                    weight_per_unit: None,
                };
                FoodReference::touch_last_used(&conn, reference.id, &usage)
                    .map_err(|e| format!("Failed to update food reference: {}", e))?;
                (reference, NutritionOrigin::ExistingReference)
            }
            (None, Some(reply)) => {
                let nutrients = resolve_nutrition(&CannedReply(reply.to_string()), &name);
                let reference = FoodReference::create(&conn, &new_reference(nutrients, None, None))
                    .map_err(|e| format!("Failed to create food reference: {}", e))?;
                tracing::info!("Stored source nutrition as reference {} for '{}'", reference.id, name);
                (reference, NutritionOrigin::NutritionReply)
            }
            (None, None) => return Err("Failed to get nutrition information".to_string()),
        }
    };

    let data = FoodEntryCreate {
        user_id,
        name: name.clone(),
        brand,
        description,
        meal_type,
        date,
        quantity,
        nutrients: reference.nutrients,
        score: reference.score(),
    };

    let entry = FoodEntry::create(&conn, &data)
        .map_err(|e| format!("Failed to log food: {}", e))?;
    tracing::info!("Added food entry {} for '{}'", entry.id, entry.name);

    Ok(LogFoodResponse {
        id: entry.id,
        nutrition: entry.adjusted_nutrition(),
        name: entry.name,
        brand: entry.brand,
        date: entry.date,
        meal_type: entry.meal_type,
        quantity: entry.quantity,
        reference_id: reference.id,
        source,
    })
}

/// Delete one of the user's entries. Returns false when it doesn't exist.
pub fn delete_food_entry(db: &Database, user_id: i64, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = FoodEntry::delete(&conn, id, user_id)
        .map_err(|e| format!("Failed to delete food entry: {}", e))?;
    if deleted {
        tracing::info!("Deleted food entry {}", id);
    }
    Ok(deleted)
}

/// The user's entries between two dates (inclusive), newest first
pub fn list_food_entries(
    db: &Database,
    user_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<ListFoodEntriesResponse, String> {
    if start_date > end_date {
        return Err(format!(
            "start_date {} is after end_date {}",
            start_date, end_date
        ));
    }

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entries = FoodEntry::list_for_range(&conn, user_id, start_date, end_date)
        .map_err(|e| format!("Failed to list food entries: {}", e))?;
    let entries: Vec<EntryDetail> = entries.iter().map(EntryDetail::from).collect();

    Ok(ListFoodEntriesResponse {
        total: entries.len(),
        entries,
        start_date,
        end_date,
    })
}
