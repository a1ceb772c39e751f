//! NutriScore Library
//!
//! Nutrition scoring for single foods, meals, days, weeks and months, plus the
//! food log it reads from.

pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod scoring;
pub mod tools;
