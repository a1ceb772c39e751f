//! Score MCP Tools
//!
//! Meal, day, week and month scores for a user, plus ad-hoc scoring.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::db::Database;
use crate::models::{FoodEntry, NutrientVector};
use crate::scoring::{self, AggregateResult, Period, ScoreRecord};

/// Response for score_nutrients
#[derive(Debug, Serialize)]
pub struct ScoreNutrientsResponse {
    pub nutrients: NutrientVector,
    #[serde(flatten)]
    pub score: ScoreRecord,
}

/// Score the user's food for the period containing `anchor`
pub fn period_score(
    db: &Database,
    user_id: i64,
    period: Period,
    anchor: NaiveDate,
) -> Result<AggregateResult, String> {
    let (start, end) = period.bounds(anchor);
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let entries = FoodEntry::list_for_range(&conn, user_id, start, end)
        .map_err(|e| format!("Failed to load food entries: {}", e))?;

    tracing::debug!(
        "Scoring {} entries for {} {}..{}",
        entries.len(),
        period,
        start,
        end
    );

    Ok(scoring::aggregate(&entries, period, anchor))
}

/// Score a loosely typed per-100g nutrient object
pub fn score_nutrients(nutrients: &Value) -> ScoreNutrientsResponse {
    let nutrients = NutrientVector::from_json(nutrients);
    ScoreNutrientsResponse {
        score: scoring::compute(&nutrients),
        nutrients,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{FoodEntryCreate, MealType};
    use crate::scoring::Grade;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_db() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("test.db")).unwrap();
        db.with_conn(run_migrations).unwrap();
        (dir, db)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn add_entry(db: &Database, user_id: i64, day: &str, nutrients: NutrientVector) {
        let data = FoodEntryCreate {
            user_id,
            name: "Food".to_string(),
            brand: None,
            description: None,
            meal_type: MealType::Lunch,
            date: date(day),
            quantity: 100.0,
            score: scoring::compute(&nutrients).summary(),
            nutrients,
        };
        db.with_conn(|conn| FoodEntry::create(conn, &data)).unwrap();
    }

    #[test]
    fn test_period_score_without_entries() {
        let (_dir, db) = test_db();
        let result = period_score(&db, 1, Period::Week, date("2025-01-09")).unwrap();
        assert_eq!(result.score, 0);
        assert_eq!(result.simple_score, 50);
        assert_eq!(result.grade, Grade::C);
        assert_eq!(result.num_days, Some(0));
    }

    #[test]
    fn test_period_score_is_per_user_and_period() {
        let (_dir, db) = test_db();
        let sugary = NutrientVector {
            calories: 400.0,
            energy_kj: 1673.6,
            sugars: 40.0,
            ..NutrientVector::zero()
        };
        add_entry(&db, 1, "2025-01-09", sugary);
        add_entry(&db, 2, "2025-01-09", NutrientVector::zero());
        // Previous week
        add_entry(&db, 1, "2025-01-05", NutrientVector::zero());

        let day = period_score(&db, 1, Period::Day, date("2025-01-09")).unwrap();
        assert_eq!(day.entries.len(), 1);
        assert_eq!(day.score, scoring::compute(&sugary).score);

        let week = period_score(&db, 1, Period::Week, date("2025-01-09")).unwrap();
        assert_eq!(week.entries.len(), 1);
        assert_eq!(week.score, day.score);

        let month = period_score(&db, 1, Period::Month, date("2025-01-09")).unwrap();
        assert_eq!(month.num_days, Some(2));
        assert_eq!(month.entries.len(), 2);
    }

    #[test]
    fn test_score_nutrients() {
        let response = score_nutrients(&json!({"calories": "52", "sugars": 10.4, "fiber": null}));
        assert_eq!(response.nutrients.calories, 52.0);
        assert_eq!(response.nutrients.fiber, 0.0);
        assert_eq!(response.score, scoring::compute(&response.nutrients));

        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("grade").is_some());
        assert!(value.get("components").is_some());
        assert_eq!(value["nutrients"]["calories"], json!(52.0));
    }
}
