//! MCP server
//!
//! Serves the food logging and scoring tools over the Model Context Protocol.

mod server;

pub use server::NutriScoreService;
