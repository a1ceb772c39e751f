//! Food Reference MCP Tools
//!
//! Browsing and pruning the cache of known foods.

use serde::Serialize;

use crate::db::Database;
use crate::models::FoodReference;

/// Response for list_food_references
#[derive(Debug, Serialize)]
pub struct ListFoodReferencesResponse {
    pub references: Vec<FoodReference>,
    pub total: usize,
}

/// References the user can log from: their own, then shared ones
pub fn list_food_references(
    db: &Database,
    user_id: i64,
    search: Option<&str>,
) -> Result<ListFoodReferencesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let references = FoodReference::list_visible(&conn, user_id, search)
        .map_err(|e| format!("Failed to list food references: {}", e))?;

    Ok(ListFoodReferencesResponse {
        total: references.len(),
        references,
    })
}

/// Delete a reference the user created. Entries logged from it keep their
/// own copy of the nutrients.
pub fn delete_food_reference(db: &Database, user_id: i64, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = FoodReference::delete(&conn, id, user_id)
        .map_err(|e| format!("Failed to delete food reference: {}", e))?;
    if deleted {
        tracing::info!("Deleted food reference {}", id);
    }
    Ok(deleted)
}
