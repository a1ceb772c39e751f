//! Database module
//!
//! SQLite store for food references and logged entries.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
