//! Food Reference model
//!
//! Previously seen foods with their per-100g nutrients and computed score,
//! reused instead of asking a nutrition source again.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::scoring::{self, Grade, ScoreSummary};
use super::{MealType, NutrientVector};

/// Brand recorded when none is given
pub const GENERIC_BRAND: &str = "Generic";

/// A cached food description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodReference {
    pub id: i64,
    pub name: String,
    pub brand: String,
    /// Per-100g values
    #[serde(flatten)]
    pub nutrients: NutrientVector,
    pub nutri_score: Grade,
    pub numeric_score: i32,
    pub simple_score: i32,
    pub is_shared: bool,
    pub creator_id: i64,
    pub last_used_quantity: f64,
    pub last_used_unit: Option<String>,
    pub last_used_meal_type: Option<MealType>,
    pub weight_per_unit: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a food reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodReferenceCreate {
    pub name: String,
    pub brand: Option<String>,
    pub nutrients: NutrientVector,
    pub is_shared: bool,
    pub creator_id: i64,
    pub last_used_quantity: f64,
    pub last_used_unit: Option<String>,
    pub last_used_meal_type: MealType,
    pub weight_per_unit: Option<f64>,
}

/// Fields refreshed each time a reference is logged again
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodReferenceUsage {
    pub quantity: f64,
    pub meal_type: MealType,
    pub unit: Option<String>,
    pub weight_per_unit: Option<f64>,
}

impl FoodReference {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let grade: String = row.get("nutri_score")?;
        let meal_type: Option<String> = row.get("last_used_meal_type")?;
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            brand: row.get("brand")?,
            nutrients: NutrientVector {
                calories: row.get("calories")?,
                energy_kj: row.get("energy_kj")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                sugars: row.get("sugars")?,
                fat: row.get("fat")?,
                saturated_fat: row.get("saturated_fat")?,
                sodium: row.get("sodium")?,
                fiber: row.get("fiber")?,
                fruits_veg_nuts: row.get("fruits_veg_nuts")?,
            },
            nutri_score: Grade::parse(&grade).unwrap_or(Grade::C),
            numeric_score: row.get("numeric_score")?,
            simple_score: row.get("simple_score")?,
            is_shared: row.get::<_, i64>("is_shared")? != 0,
            creator_id: row.get("creator_id")?,
            last_used_quantity: row.get("last_used_quantity")?,
            last_used_unit: row.get("last_used_unit")?,
            last_used_meal_type: meal_type.as_deref().map(MealType::from_str),
            weight_per_unit: row.get("weight_per_unit")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// The stored score fields
    pub fn score(&self) -> ScoreSummary {
        ScoreSummary {
            grade: self.nutri_score,
            score: self.numeric_score,
            simple_score: self.simple_score,
        }
    }

    /// Create a new reference, scoring its nutrients
    pub fn create(conn: &Connection, data: &FoodReferenceCreate) -> DbResult<Self> {
        let n = &data.nutrients;
        let score = scoring::compute(n);
        let brand = data
            .brand
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(GENERIC_BRAND);

        conn.execute(
            r#"
            INSERT INTO food_references (
                name, brand,
                calories, energy_kj, protein, carbs, sugars, fat,
                saturated_fat, sodium, fiber, fruits_veg_nuts,
                nutri_score, numeric_score, simple_score,
                is_shared, creator_id,
                last_used_quantity, last_used_unit, last_used_meal_type, weight_per_unit
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)
            "#,
            params![
                data.name,
                brand,
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
                score.grade.as_str(),
                score.score,
                score.simple_score,
                data.is_shared,
                data.creator_id,
                data.last_used_quantity,
                data.last_used_unit,
                data.last_used_meal_type.as_str(),
                data.weight_per_unit.unwrap_or(100.0),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    /// Get a reference by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_references WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(reference) => Ok(Some(reference)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// First visible reference whose name and brand contain the given text
    /// (case-insensitive). An empty brand searches for "Generic".
    pub fn find_similar_branded(
        conn: &Connection,
        name: &str,
        brand: Option<&str>,
        user_id: i64,
    ) -> DbResult<Option<Self>> {
        let brand = brand.map(str::trim).filter(|b| !b.is_empty()).unwrap_or(GENERIC_BRAND);
        let mut stmt = conn.prepare(
            "SELECT * FROM food_references
             WHERE name LIKE '%' || ?1 || '%'
               AND brand LIKE '%' || ?2 || '%'
               AND (is_shared = 1 OR creator_id = ?3)
             ORDER BY id
             LIMIT 1",
        )?;

        let result = stmt.query_row(params![name.trim(), brand, user_id], Self::from_row);
        match result {
            Ok(reference) => Ok(Some(reference)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// First visible reference whose name contains the given text
    pub fn find_similar(conn: &Connection, name: &str, user_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM food_references
             WHERE name LIKE '%' || ?1 || '%'
               AND (is_shared = 1 OR creator_id = ?2)
             ORDER BY id
             LIMIT 1",
        )?;

        let result = stmt.query_row(params![name.trim(), user_id], Self::from_row);
        match result {
            Ok(reference) => Ok(Some(reference)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// References visible to a user: their own first, then shared ones,
    /// alphabetical within each group
    pub fn list_visible(conn: &Connection, user_id: i64, search: Option<&str>) -> DbResult<Vec<Self>> {
        let mut sql = String::from(
            "SELECT * FROM food_references WHERE (is_shared = 1 OR creator_id = ?1)",
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            params_vec.push(Box::new(search.to_string()));
            sql.push_str(&format!(" AND name LIKE '%' || ?{} || '%'", params_vec.len()));
        }

        sql.push_str(" ORDER BY CASE WHEN creator_id = ?1 THEN 0 ELSE 1 END, name");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let references = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(references)
    }

    /// Every reference
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM food_references ORDER BY id")?;
        let references = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(references)
    }

    /// Record the latest quantity/meal type a reference was logged with.
    /// Nutrients are left untouched.
    pub fn touch_last_used(conn: &Connection, id: i64, usage: &FoodReferenceUsage) -> DbResult<()> {
        conn.execute(
            r#"
            UPDATE food_references SET
                last_used_quantity = ?1,
                last_used_meal_type = ?2,
                last_used_unit = COALESCE(?3, last_used_unit),
                weight_per_unit = COALESCE(?4, weight_per_unit),
                updated_at = datetime('now')
            WHERE id = ?5
            "#,
            params![
                usage.quantity,
                usage.meal_type.as_str(),
                usage.unit,
                usage.weight_per_unit,
                id,
            ],
        )?;
        Ok(())
    }

    /// Overwrite the stored score fields
    pub fn update_score(conn: &Connection, id: i64, score: &ScoreSummary) -> DbResult<bool> {
        let rows = conn.execute(
            "UPDATE food_references SET nutri_score = ?1, numeric_score = ?2, simple_score = ?3,
                 updated_at = datetime('now')
             WHERE id = ?4",
            params![score.grade.as_str(), score.score, score.simple_score, id],
        )?;
        Ok(rows > 0)
    }

    /// Delete a reference. Only its creator may do so.
    pub fn delete(conn: &Connection, id: i64, user_id: i64) -> DbResult<bool> {
        let reference = match Self::get_by_id(conn, id)? {
            Some(reference) => reference,
            None => return Ok(false),
        };
        if reference.creator_id != user_id {
            return Err(DbError::Forbidden(
                "you can only delete foods you created".to_string(),
            ));
        }

        let rows = conn.execute("DELETE FROM food_references WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
