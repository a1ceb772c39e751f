//! NutriScore Tools module
//!
//! Tool implementations behind the MCP server.

pub mod entries;
pub mod instructions;
pub mod references;
pub mod scores;
