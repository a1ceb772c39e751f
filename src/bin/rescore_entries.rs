//! Recompute the stored scores of every food reference and entry
//! Usage: cargo run --bin rescore_entries -- [--dry-run]

use nutriscore::config::Config;
use nutriscore::db::{migrations, Database};
use nutriscore::models::{FoodEntry, FoodReference};
use nutriscore::scoring::{self, ScoreSummary};

fn describe(score: &ScoreSummary) -> String {
    format!("{} ({}, simple {})", score.grade, score.score, score.simple_score)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dry_run = std::env::args().skip(1).any(|a| a == "--dry-run");

    let config = Config::from_env();
    println!("Database: {}", config.database_path.display());
    if dry_run {
        println!("Dry run: nothing will be written");
    }

    let database = Database::new(&config.database_path)?;

    database.with_transaction(|conn| {
        migrations::run_migrations(conn)?;

        let references = FoodReference::list_all(conn)?;
        let mut changed_references = 0;
        for reference in &references {
            let old = reference.score();
            let new = scoring::compute(&reference.nutrients).summary();
            if old != new {
                println!(
                    "Reference {} '{}': {} -> {}",
                    reference.id,
                    reference.name,
                    describe(&old),
                    describe(&new)
                );
                if !dry_run {
                    FoodReference::update_score(conn, reference.id, &new)?;
                }
                changed_references += 1;
            }
        }

        let entries = FoodEntry::list_all(conn)?;
        let mut changed_entries = 0;
        for entry in &entries {
            let old = entry.stored_score();
            let new = scoring::compute(&entry.nutrients).summary();
            let missing = entry.grade.is_none()
                || entry.numeric_score.is_none()
                || entry.simple_score.is_none();
            if old != new || missing {
                println!(
                    "Entry {} '{}' on {}: {} -> {}",
                    entry.id,
                    entry.name,
                    entry.date,
                    describe(&old),
                    describe(&new)
                );
                if !dry_run {
                    FoodEntry::update_score(conn, entry.id, &new)?;
                }
                changed_entries += 1;
            }
        }

        println!(
            "\n{} of {} references and {} of {} entries {}",
            changed_references,
            references.len(),
            changed_entries,
            entries.len(),
            if dry_run { "would change" } else { "updated" }
        );
        Ok(())
    })?;

    Ok(())
}
