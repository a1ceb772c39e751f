//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: references and entries
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- FOOD REFERENCES
        -- Foods seen before, reused instead of asking a nutrition source
        -- ============================================
        CREATE TABLE food_references (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            brand TEXT NOT NULL DEFAULT 'Generic',

            -- Nutrients per 100g
            calories REAL NOT NULL DEFAULT 0,
            energy_kj REAL NOT NULL DEFAULT 0,
            protein REAL NOT NULL DEFAULT 0,
            carbs REAL NOT NULL DEFAULT 0,
            sugars REAL NOT NULL DEFAULT 0,
            fat REAL NOT NULL DEFAULT 0,
            saturated_fat REAL NOT NULL DEFAULT 0,
            sodium REAL NOT NULL DEFAULT 0,           -- milligrams
            fiber REAL NOT NULL DEFAULT 0,
            fruits_veg_nuts REAL NOT NULL DEFAULT 0,  -- percentage

            -- Score computed from the nutrients above
            nutri_score TEXT NOT NULL CHECK(nutri_score IN ('A', 'B', 'C', 'D', 'E')),
            numeric_score INTEGER NOT NULL,
            simple_score INTEGER NOT NULL,

            -- Ownership and last-use hints
            is_shared INTEGER NOT NULL DEFAULT 0,
            creator_id INTEGER NOT NULL,
            last_used_quantity REAL NOT NULL DEFAULT 100,
            last_used_unit TEXT,
            last_used_meal_type TEXT DEFAULT 'snack',
            weight_per_unit REAL DEFAULT 100,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_food_references_name ON food_references(name);
        CREATE INDEX idx_food_references_creator ON food_references(creator_id);

        -- ============================================
        -- FOOD ENTRIES
        -- What a user ate, and when
        -- ============================================
        CREATE TABLE food_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            brand TEXT,
            description TEXT,
            meal_type TEXT NOT NULL DEFAULT 'snack'
                CHECK(meal_type IN ('breakfast', 'lunch', 'dinner', 'snack', 'tea')),
            date TEXT NOT NULL,                       -- ISO date: "2025-01-09"
            quantity REAL NOT NULL DEFAULT 100,       -- grams

            -- Nutrients per 100g (NULL reads as 0)
            calories REAL,
            energy_kj REAL,
            protein REAL,
            carbs REAL,
            sugars REAL,
            fat REAL,
            saturated_fat REAL,
            sodium REAL,
            fiber REAL,
            fruits_veg_nuts REAL,

            -- Score stored when the entry was logged
            nutri_score TEXT,
            numeric_score INTEGER,
            simple_score INTEGER,

            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_food_entries_user_date ON food_entries(user_id, date);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        assert!(!needs_migration(&conn).unwrap());
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_fresh_database_needs_migration() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE schema_migrations (version INTEGER PRIMARY KEY, applied_at TEXT)",
            [],
        )
        .unwrap();
        assert!(needs_migration(&conn).unwrap());
    }
}
