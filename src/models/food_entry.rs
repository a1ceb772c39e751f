//! Food Entry model
//!
//! A food a user logged on a given date, with its per-100g nutrients and the
//! score it was stored with.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::scoring::{Grade, ScoreSummary};
use super::NutrientVector;

/// Quantity used when none (or nonsense) is given, in grams
pub const DEFAULT_QUANTITY_G: f64 = 100.0;

/// Date format used in storage and on the wire
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Meal type enum
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    #[default]
    Snack,
    Tea,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
            MealType::Tea => "tea",
        }
    }

    /// Anything unrecognised is a snack
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => MealType::Breakfast,
            "lunch" => MealType::Lunch,
            "dinner" => MealType::Dinner,
            "tea" => MealType::Tea,
            _ => MealType::Snack,
        }
    }
}

/// Replace a missing, non-finite or non-positive quantity with 100 g
pub fn sanitize_quantity(quantity: Option<f64>) -> f64 {
    match quantity {
        Some(q) if q.is_finite() && q > 0.0 => q,
        _ => DEFAULT_QUANTITY_G,
    }
}

/// A logged food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub meal_type: MealType,
    pub date: NaiveDate,
    /// Eaten quantity in grams
    pub quantity: f64,
    /// Per-100g values
    pub nutrients: NutrientVector,
    pub grade: Option<Grade>,
    pub numeric_score: Option<i32>,
    pub simple_score: Option<i32>,
    pub created_at: String,
}

/// Nutrients scaled to the eaten quantity plus the entry's stored score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedNutrition {
    #[serde(flatten)]
    pub nutrients: NutrientVector,
    pub grade: Grade,
    pub numeric_score: i32,
    pub simple_score: i32,
}

/// Data for creating a food entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodEntryCreate {
    pub user_id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub meal_type: MealType,
    pub date: NaiveDate,
    pub quantity: f64,
    pub nutrients: NutrientVector,
    pub score: ScoreSummary,
}

fn nullable(row: &Row, column: &str) -> rusqlite::Result<f64> {
    Ok(row.get::<_, Option<f64>>(column)?.unwrap_or(0.0))
}

/// Parse an ISO date column
pub(crate) fn date_column(row: &Row, column: &str) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(column)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl FoodEntry {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let meal_type: String = row.get("meal_type")?;
        let grade: Option<String> = row.get("nutri_score")?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            brand: row.get("brand")?,
            description: row.get("description")?,
            meal_type: MealType::from_str(&meal_type),
            date: date_column(row, "date")?,
            quantity: row.get("quantity")?,
            nutrients: NutrientVector {
                calories: nullable(row, "calories")?,
                energy_kj: nullable(row, "energy_kj")?,
                protein: nullable(row, "protein")?,
                carbs: nullable(row, "carbs")?,
                sugars: nullable(row, "sugars")?,
                fat: nullable(row, "fat")?,
                saturated_fat: nullable(row, "saturated_fat")?,
                sodium: nullable(row, "sodium")?,
                fiber: nullable(row, "fiber")?,
                fruits_veg_nuts: nullable(row, "fruits_veg_nuts")?,
            },
            grade: grade.as_deref().and_then(Grade::parse),
            numeric_score: row.get("numeric_score")?,
            simple_score: row.get("simple_score")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Nutrients for the eaten quantity
    pub fn adjusted_nutrients(&self) -> NutrientVector {
        self.nutrients.for_quantity(self.quantity)
    }

    /// Stored score, with neutral defaults for anything never recorded
    pub fn stored_score(&self) -> ScoreSummary {
        ScoreSummary {
            grade: self.grade.unwrap_or(Grade::C),
            score: self.numeric_score.unwrap_or(0),
            simple_score: self.simple_score.unwrap_or(50),
        }
    }

    pub fn adjusted_nutrition(&self) -> AdjustedNutrition {
        let stored = self.stored_score();
        AdjustedNutrition {
            nutrients: self.adjusted_nutrients(),
            grade: stored.grade,
            numeric_score: stored.score,
            simple_score: stored.simple_score,
        }
    }

    /// Create a new food entry
    pub fn create(conn: &Connection, data: &FoodEntryCreate) -> DbResult<Self> {
        let n = &data.nutrients;
        conn.execute(
            r#"
            INSERT INTO food_entries (
                user_id, name, brand, description, meal_type, date, quantity,
                calories, energy_kj, protein, carbs, sugars, fat,
                saturated_fat, sodium, fiber, fruits_veg_nuts,
                nutri_score, numeric_score, simple_score
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            "#,
            params![
                data.user_id,
                data.name,
                data.brand,
                data.description,
                data.meal_type.as_str(),
                data.date.format(DATE_FORMAT).to_string(),
                sanitize_quantity(Some(data.quantity)),
                n.calories,
                n.energy_kj,
                n.protein,
                n.carbs,
                n.sugars,
                n.fat,
                n.saturated_fat,
                n.sodium,
                n.fiber,
                n.fruits_veg_nuts,
                data.score.grade.as_str(),
                data.score.score,
                data.score.simple_score,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a food entry by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_entries WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// A user's entries between two dates (inclusive), newest date first
    pub fn list_for_range(
        conn: &Connection,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM food_entries
             WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date DESC, id",
        )?;

        let entries = stmt
            .query_map(
                params![
                    user_id,
                    start.format(DATE_FORMAT).to_string(),
                    end.format(DATE_FORMAT).to_string()
                ],
                Self::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Every entry of every user
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_entries ORDER BY id")?;
        let entries = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Overwrite the stored score fields
    pub fn update_score(conn: &Connection, id: i64, score: &ScoreSummary) -> DbResult<bool> {
        let rows = conn.execute(
            "UPDATE food_entries SET nutri_score = ?1, numeric_score = ?2, simple_score = ?3 WHERE id = ?4",
            params![score.grade.as_str(), score.score, score.simple_score, id],
        )?;
        Ok(rows > 0)
    }

    /// Delete an entry owned by `user_id`.
    ///
    /// Returns `Ok(false)` when the entry does not exist and
    /// `DbError::Forbidden` when it belongs to someone else.
    pub fn delete(conn: &Connection, id: i64, user_id: i64) -> DbResult<bool> {
        let entry = match Self::get_by_id(conn, id)? {
            Some(entry) => entry,
            None => return Ok(false),
        };
        if entry.user_id != user_id {
            return Err(DbError::Forbidden(format!("food entry {} belongs to another user", id)));
        }

        let rows = conn.execute("DELETE FROM food_entries WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn create_data(user_id: i64, name: &str, date: &str) -> FoodEntryCreate {
        FoodEntryCreate {
            user_id,
            name: name.to_string(),
            brand: None,
            description: None,
            meal_type: MealType::Lunch,
            date: NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap(),
            quantity: 150.0,
            nutrients: NutrientVector {
                calories: 200.0,
                energy_kj: 836.8,
                protein: 10.0,
                fruits_veg_nuts: 30.0,
                ..Default::default()
            },
            score: ScoreSummary { grade: Grade::B, score: 1, simple_score: 71 },
        }
    }

    #[test]
    fn test_meal_type_from_str() {
        assert_eq!(MealType::from_str("Breakfast"), MealType::Breakfast);
        assert_eq!(MealType::from_str(" tea "), MealType::Tea);
        assert_eq!(MealType::from_str("brunch"), MealType::Snack);
        assert_eq!(MealType::from_str(""), MealType::Snack);
    }

    #[test]
    fn test_sanitize_quantity() {
        assert_eq!(sanitize_quantity(Some(250.0)), 250.0);
        assert_eq!(sanitize_quantity(Some(0.0)), 100.0);
        assert_eq!(sanitize_quantity(Some(-5.0)), 100.0);
        assert_eq!(sanitize_quantity(Some(f64::NAN)), 100.0);
        assert_eq!(sanitize_quantity(None), 100.0);
    }

    #[test]
    fn test_create_and_get() {
        let conn = conn();
        let entry = FoodEntry::create(&conn, &create_data(1, "Apple", "2025-03-12")).unwrap();
        assert_eq!(entry.name, "Apple");
        assert_eq!(entry.meal_type, MealType::Lunch);
        assert_eq!(entry.grade, Some(Grade::B));
        assert_eq!(entry.numeric_score, Some(1));
        assert_eq!(entry.nutrients.energy_kj, 836.8);

        let fetched = FoodEntry::get_by_id(&conn, entry.id).unwrap().unwrap();
        assert_eq!(fetched.date, entry.date);
        assert!(FoodEntry::get_by_id(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_null_nutrients_read_as_zero() {
        let conn = conn();
        conn.execute(
            "INSERT INTO food_entries (user_id, name, meal_type, date, quantity) VALUES (1, 'Mystery', 'snack', '2025-03-12', 80)",
            [],
        )
        .unwrap();
        let entry = FoodEntry::list_all(&conn).unwrap().remove(0);
        assert_eq!(entry.nutrients, NutrientVector::zero());
        assert_eq!(entry.grade, None);
        let stored = entry.stored_score();
        assert_eq!((stored.grade, stored.score, stored.simple_score), (Grade::C, 0, 50));
    }

    #[test]
    fn test_adjusted_nutrition() {
        let conn = conn();
        let entry = FoodEntry::create(&conn, &create_data(1, "Soup", "2025-03-12")).unwrap();
        let adjusted = entry.adjusted_nutrition();
        assert_eq!(adjusted.nutrients.calories, 300.0);
        assert_eq!(adjusted.nutrients.protein, 15.0);
        assert_eq!(adjusted.nutrients.fruits_veg_nuts, 30.0);
        assert_eq!(adjusted.grade, Grade::B);
        assert_eq!(adjusted.simple_score, 71);

        let value = serde_json::to_value(&adjusted).unwrap();
        assert_eq!(value["calories"], 300.0);
        assert_eq!(value["numeric_score"], 1);
    }

    #[test]
    fn test_list_for_range_filters_user_and_dates() {
        let conn = conn();
        FoodEntry::create(&conn, &create_data(1, "Mon", "2025-03-10")).unwrap();
        FoodEntry::create(&conn, &create_data(1, "Wed", "2025-03-12")).unwrap();
        FoodEntry::create(&conn, &create_data(1, "Next week", "2025-03-17")).unwrap();
        FoodEntry::create(&conn, &create_data(2, "Other user", "2025-03-11")).unwrap();

        let start = NaiveDate::parse_from_str("2025-03-10", DATE_FORMAT).unwrap();
        let end = NaiveDate::parse_from_str("2025-03-12", DATE_FORMAT).unwrap();
        let entries = FoodEntry::list_for_range(&conn, 1, start, end).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Wed", "Mon"]);
    }

    #[test]
    fn test_delete_checks_owner() {
        let conn = conn();
        let entry = FoodEntry::create(&conn, &create_data(1, "Cake", "2025-03-12")).unwrap();

        assert!(matches!(FoodEntry::delete(&conn, entry.id, 2), Err(DbError::Forbidden(_))));
        assert!(FoodEntry::delete(&conn, entry.id, 1).unwrap());
        assert!(!FoodEntry::delete(&conn, entry.id, 1).unwrap());
    }

    #[test]
    fn test_update_score() {
        let conn = conn();
        let entry = FoodEntry::create(&conn, &create_data(1, "Bread", "2025-03-12")).unwrap();
        let new_score = ScoreSummary { grade: Grade::D, score: 12, simple_score: 45 };
        assert!(FoodEntry::update_score(&conn, entry.id, &new_score).unwrap());
        let fetched = FoodEntry::get_by_id(&conn, entry.id).unwrap().unwrap();
        assert_eq!(fetched.stored_score(), new_score);
    }
}
