//! NutriScore MCP Server Implementation
//!
//! Exposes food logging and scoring as MCP tools.

use chrono::{Local, NaiveDate};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::Database;
use crate::models::DATE_FORMAT;
use crate::nutrition::parse_nutrition_reply;
use crate::scoring::{self, Period};
use crate::tools::entries::{self, LogFoodRequest};
use crate::tools::references;
use crate::tools::scores::{self, ScoreNutrientsResponse};

/// NutriScore MCP Service
#[derive(Clone)]
pub struct NutriScoreService {
    database: Database,
    default_user_id: i64,
    tool_router: ToolRouter<NutriScoreService>,
}

impl NutriScoreService {
    pub fn new(database: Database, default_user_id: i64) -> Self {
        Self {
            database,
            default_user_id,
            tool_router: Self::tool_router(),
        }
    }

    fn user(&self, user_id: Option<i64>) -> i64 {
        user_id.unwrap_or(self.default_user_id)
    }

    fn period_score(&self, period: Period, p: PeriodScoreParams) -> Result<CallToolResult, McpError> {
        let anchor = parse_date(p.date.as_deref())?;
        let result = scores::period_score(&self.database, self.user(p.user_id), period, anchor)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

/// Parse an optional YYYY-MM-DD date, defaulting to today
fn parse_date(date: Option<&str>) -> Result<NaiveDate, McpError> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => NaiveDate::parse_from_str(d, DATE_FORMAT).map_err(|e| {
            McpError::invalid_params(format!("Invalid date '{}' (expected YYYY-MM-DD): {}", d, e), None)
        }),
        None => Ok(Local::now().date_naive()),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    id: i64,
    deleted: bool,
}

// ============================================================================
// Food Entry Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogFoodParams {
    /// Food name, e.g. "Greek yogurt"
    pub name: String,
    pub brand: Option<String>,
    pub description: Option<String>,
    /// breakfast, lunch, dinner, snack or tea
    pub meal_type: Option<String>,
    /// Grams eaten (default 100)
    pub quantity: Option<f64>,
    /// YYYY-MM-DD (default today)
    pub date: Option<String>,
    /// Log from a known food reference
    pub reference_id: Option<i64>,
    /// Per-100g nutrients: calories, energy_kj, protein, carbs, sugars, fat,
    /// saturated_fat, sodium (mg), fiber, fruits_veg_nuts (%), optional unit and weight
    pub nutrients: Option<Value>,
    /// Reply listing calories, energy_kj, sugars, saturated_fat, fat, sodium,
    /// fiber, protein, fruits_veg_nuts per 100g
    pub nutrition_reply: Option<String>,
    /// Share a newly created food reference with other users
    #[serde(default)]
    pub is_shared: bool,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteByIdParams {
    pub id: i64,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListFoodEntriesParams {
    /// YYYY-MM-DD (default today)
    pub start_date: Option<String>,
    /// YYYY-MM-DD (default start_date)
    pub end_date: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListFoodReferencesParams {
    /// Only names containing this text
    pub search: Option<String>,
    pub user_id: Option<i64>,
}

// ============================================================================
// Score Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PeriodScoreParams {
    /// Any date inside the period, YYYY-MM-DD (default today)
    pub date: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ScoreNutrientsParams {
    /// Per-100g nutrients; missing or non-numeric values count as 0
    pub nutrients: Value,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ParseNutritionReplyParams {
    pub reply: String,
}

#[tool_router]
impl NutriScoreService {
    // --- Instructions ---

    #[tool(description = "Get instructions for logging foods and reading scores. Call this when starting a food logging session.")]
    fn scoring_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::instructions::SCORING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(SCORING_INSTRUCTIONS)]))
    }

    // --- Food Entries ---

    #[tool(description = "Log a food eaten. Nutrients come from reference_id, manual nutrients, a similar known food, or a nutrition_reply, in that order.")]
    fn log_food(&self, Parameters(p): Parameters<LogFoodParams>) -> Result<CallToolResult, McpError> {
        let date = p.date.as_deref().map(|d| parse_date(Some(d))).transpose()?;
        let request = LogFoodRequest {
            name: p.name,
            brand: p.brand,
            description: p.description,
            meal_type: p.meal_type,
            quantity: p.quantity,
            date,
            reference_id: p.reference_id,
            nutrients: p.nutrients,
            nutrition_reply: p.nutrition_reply,
            is_shared: p.is_shared,
        };
        let result = entries::log_food(&self.database, self.user(p.user_id), &request)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a logged food entry (only your own)")]
    fn delete_food_entry(&self, Parameters(p): Parameters<DeleteByIdParams>) -> Result<CallToolResult, McpError> {
        let deleted = entries::delete_food_entry(&self.database, self.user(p.user_id), p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&DeleteResponse { id: p.id, deleted })
    }

    #[tool(description = "List logged foods between two dates (inclusive), newest first, with quantity-adjusted nutrition")]
    fn list_food_entries(&self, Parameters(p): Parameters<ListFoodEntriesParams>) -> Result<CallToolResult, McpError> {
        let start = parse_date(p.start_date.as_deref())?;
        let end = match p.end_date.as_deref() {
            Some(d) => parse_date(Some(d))?,
            None => start,
        };
        let result = entries::list_food_entries(&self.database, self.user(p.user_id), start, end)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Food References ---

    #[tool(description = "List known foods you can log by reference_id: your own first, then shared ones")]
    fn list_food_references(&self, Parameters(p): Parameters<ListFoodReferencesParams>) -> Result<CallToolResult, McpError> {
        let result = references::list_food_references(&self.database, self.user(p.user_id), p.search.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete a known food you created. Already logged entries are kept.")]
    fn delete_food_reference(&self, Parameters(p): Parameters<DeleteByIdParams>) -> Result<CallToolResult, McpError> {
        let deleted = references::delete_food_reference(&self.database, self.user(p.user_id), p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&DeleteResponse { id: p.id, deleted })
    }

    // --- Scores ---

    #[tool(description = "Score one day's food (default today). A single food keeps its own score; several are scored on their combined nutrients.")]
    fn daily_score(&self, Parameters(p): Parameters<PeriodScoreParams>) -> Result<CallToolResult, McpError> {
        self.period_score(Period::Day, p)
    }

    #[tool(description = "Score the week from Monday up to the given date by averaging each day's nutrients")]
    fn weekly_score(&self, Parameters(p): Parameters<PeriodScoreParams>) -> Result<CallToolResult, McpError> {
        self.period_score(Period::Week, p)
    }

    #[tool(description = "Score the calendar month containing the given date by averaging each day's nutrients")]
    fn monthly_score(&self, Parameters(p): Parameters<PeriodScoreParams>) -> Result<CallToolResult, McpError> {
        self.period_score(Period::Month, p)
    }

    #[tool(description = "Score per-100g nutrient values without logging anything")]
    fn score_nutrients(&self, Parameters(p): Parameters<ScoreNutrientsParams>) -> Result<CallToolResult, McpError> {
        to_json(&scores::score_nutrients(&p.nutrients))
    }

    #[tool(description = "Check how a nutrition reply (nine per-100g numbers) will be read, and score it")]
    fn parse_nutrition_reply(&self, Parameters(p): Parameters<ParseNutritionReplyParams>) -> Result<CallToolResult, McpError> {
        match parse_nutrition_reply(&p.reply) {
            Some(nutrients) => {
                let nutrients = nutrients.with_energy_completed();
                to_json(&ScoreNutrientsResponse {
                    score: scoring::compute(&nutrients),
                    nutrients,
                })
            }
            None => Ok(CallToolResult::success(vec![Content::text(
                r#"{"error": "Could not read nine nutrition values from reply"}"#,
            )])),
        }
    }
}

#[tool_handler]
impl ServerHandler for NutriScoreService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutriscore".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: Some("NutriScore".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "NutriScore - food logging with per-meal, daily, weekly and monthly nutrition scores. \
                 IMPORTANT: Call scoring_instructions before logging food. \
                 Entries: log_food/list_food_entries/delete_food_entry. \
                 Known foods: list_food_references/delete_food_reference. \
                 Scores: daily_score/weekly_score/monthly_score, score_nutrients, parse_nutrition_reply."
                    .into(),
            ),
        }
    }
}
