//! Meal Planner MCP Server Implementation
//!
//! Implements the MCP server with all planner tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{FoodSource, IngredientLine, IngredientUpdate, SearchResultItem};
use crate::nutrition::NumericInput;
use crate::tools::meals;
use crate::tools::plans;
use crate::tools::shopping::{self, ShoppingListState, ShoppingScope};
use crate::tools::status::StatusTracker;

/// Meal Planner MCP Service
#[derive(Clone)]
pub struct PlannerService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<PlannerService>,
    /// Most recently generated shopping list
    shopping_list: Arc<Mutex<ShoppingListState>>,
}

impl PlannerService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
            shopping_list: Arc::new(Mutex::new(ShoppingListState::default())),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(what: &str, id: i64) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(format!(
        r#"{{"error": "{} not found", "id": {}}}"#,
        what, id
    ))]))
}

/// Numbers, numeric strings and null are all accepted; anything else counts as missing
fn numeric(value: Option<serde_json::Value>) -> NumericInput {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

fn parse_source(source: Option<&str>) -> Result<Option<FoodSource>, McpError> {
    match source.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => FoodSource::from_str(s)
            .map(Some)
            .ok_or_else(|| McpError::invalid_params(format!("Unknown source '{}' (expected USDA or OpenFoodFacts)", s), None)),
        None => Ok(None),
    }
}

// ============================================================================
// Meal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientParams {
    #[serde(default)]
    pub name: String,
    /// USDA or OpenFoodFacts
    pub source: Option<String>,
    /// Grams; number or numeric string
    pub grams: Option<serde_json::Value>,
    pub calories_100g: Option<serde_json::Value>,
    pub protein_100g: Option<serde_json::Value>,
    pub fat_100g: Option<serde_json::Value>,
    pub carbs_100g: Option<serde_json::Value>,
}

impl IngredientParams {
    fn into_line(self) -> Result<IngredientLine, McpError> {
        Ok(IngredientLine {
            source: parse_source(self.source.as_deref())?,
            name: self.name,
            grams: numeric(self.grams),
            calories_100g: numeric(self.calories_100g),
            protein_100g: numeric(self.protein_100g),
            fat_100g: numeric(self.fat_100g),
            carbs_100g: numeric(self.carbs_100g),
        })
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateMealTemplateParams {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListMealTemplatesParams {
    /// Filter by name (substring match)
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MealIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RenameMealParams {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DuplicateMealParams {
    pub id: i64,
    /// Name for the copy; defaults to the original's name
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddIngredientParams {
    pub meal_id: i64,
    #[serde(flatten)]
    pub ingredient: IngredientParams,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateIngredientParams {
    pub id: i64,
    pub name: Option<String>,
    pub source: Option<String>,
    pub grams: Option<serde_json::Value>,
    pub calories_100g: Option<serde_json::Value>,
    pub protein_100g: Option<serde_json::Value>,
    pub fat_100g: Option<serde_json::Value>,
    pub carbs_100g: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveIngredientParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddIngredientFromSearchParams {
    pub meal_id: i64,
    /// Raw USDA or OpenFoodFacts record with a "source" field
    pub item: serde_json::Value,
    /// Overrides the record's default quantity
    pub grams: Option<f64>,
}

// ============================================================================
// Plan Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetWeekParams {
    /// Any date in the week (YYYY-MM-DD)
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AssignTemplateParams {
    /// YYYY-MM-DD
    pub date: String,
    pub template_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddQuickMealParams {
    /// YYYY-MM-DD
    pub date: String,
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RemoveMealFromDayParams {
    pub assignment_id: i64,
}

// ============================================================================
// Shopping Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GenerateShoppingListParams {
    /// Any date in the week to shop for; omit to use every meal template
    pub week_of: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ToggleShoppingItemParams {
    /// Item id from generate_shopping_list
    pub id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ExportShoppingListParams {
    /// "text" or "markdown"
    #[serde(default = "default_export_format")]
    pub format: String,
}

fn default_export_format() -> String { "markdown".to_string() }

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl PlannerService {
    // --- Status ---

    #[tool(description = "Get the current status of the meal planner including build info, database status, and process information")]
    async fn planner_status(&self) -> Result<CallToolResult, McpError> {
        let items = self.shopping_list.lock().await.items().len();
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(items);
        let json = serde_json::to_string_pretty(&status)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    #[tool(description = "Get step-by-step instructions for planning meals and building a shopping list. Call this when starting a planning session or when unsure how to use the tools.")]
    fn planner_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::PLANNER_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(PLANNER_INSTRUCTIONS)]))
    }

    // --- Meals ---

    #[tool(description = "Create a meal template in the library, optionally with ingredient lines (grams and per-100g densities)")]
    fn create_meal_template(&self, Parameters(p): Parameters<CreateMealTemplateParams>) -> Result<CallToolResult, McpError> {
        let lines = p.ingredients
            .into_iter()
            .map(IngredientParams::into_line)
            .collect::<Result<Vec<_>, _>>()?;
        let result = meals::create_meal_template(&self.database, &p.name, lines)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List meal templates with totals, optionally filtered by name")]
    fn list_meal_templates(&self, Parameters(p): Parameters<ListMealTemplatesParams>) -> Result<CallToolResult, McpError> {
        let result = meals::list_meal_templates(&self.database, p.query.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a meal (template or day instance) with ingredient lines, per-line and total nutrients, and macro split")]
    fn get_meal(&self, Parameters(p): Parameters<MealIdParams>) -> Result<CallToolResult, McpError> {
        match meals::get_meal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))? {
            Some(meal) => to_json(&meal),
            None => not_found("Meal", p.id),
        }
    }

    #[tool(description = "Rename a meal. Calendar entries for the meal show the new name.")]
    fn rename_meal(&self, Parameters(p): Parameters<RenameMealParams>) -> Result<CallToolResult, McpError> {
        match meals::rename_meal(&self.database, p.id, &p.name).map_err(|e| McpError::internal_error(e, None))? {
            Some(meal) => to_json(&meal),
            None => not_found("Meal", p.id),
        }
    }

    #[tool(description = "Copy a meal and its ingredients into a new template")]
    fn duplicate_meal(&self, Parameters(p): Parameters<DuplicateMealParams>) -> Result<CallToolResult, McpError> {
        match meals::duplicate_meal(&self.database, p.id, p.name.as_deref()).map_err(|e| McpError::internal_error(e, None))? {
            Some(meal) => to_json(&meal),
            None => not_found("Meal", p.id),
        }
    }

    #[tool(description = "Delete a meal with its ingredients and any calendar entries")]
    fn delete_meal(&self, Parameters(p): Parameters<MealIdParams>) -> Result<CallToolResult, McpError> {
        let result = meals::delete_meal(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Ingredients ---

    #[tool(description = "Append an ingredient line to a meal. Numeric fields accept numbers or strings; invalid values count as 0.")]
    fn add_ingredient(&self, Parameters(p): Parameters<AddIngredientParams>) -> Result<CallToolResult, McpError> {
        let line = p.ingredient.into_line()?;
        let result = meals::add_ingredient(&self.database, p.meal_id, line)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Update some fields of an ingredient line")]
    fn update_ingredient(&self, Parameters(p): Parameters<UpdateIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = IngredientUpdate {
            name: p.name,
            source: parse_source(p.source.as_deref())?,
            grams: p.grams.map(|v| numeric(Some(v))),
            calories_100g: p.calories_100g.map(|v| numeric(Some(v))),
            protein_100g: p.protein_100g.map(|v| numeric(Some(v))),
            fat_100g: p.fat_100g.map(|v| numeric(Some(v))),
            carbs_100g: p.carbs_100g.map(|v| numeric(Some(v))),
        };
        match meals::update_ingredient(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))? {
            Some(resp) => to_json(&resp),
            None => not_found("Ingredient", p.id),
        }
    }

    #[tool(description = "Remove an ingredient line from its meal")]
    fn remove_ingredient(&self, Parameters(p): Parameters<RemoveIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = meals::remove_ingredient(&self.database, p.id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Add a USDA or OpenFoodFacts search result to a meal. The record is normalized to grams and per-100g densities.")]
    fn add_ingredient_from_search(&self, Parameters(p): Parameters<AddIngredientFromSearchParams>) -> Result<CallToolResult, McpError> {
        let item: SearchResultItem = serde_json::from_value(p.item)
            .map_err(|e| McpError::invalid_params(format!("Invalid search result: {}", e), None))?;
        let result = meals::add_ingredient_from_search(&self.database, p.meal_id, item, p.grams)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Week Plan ---

    #[tool(description = "Get the Monday-to-Sunday week containing a date, with each day's meals and nutrient totals")]
    fn get_week(&self, Parameters(p): Parameters<GetWeekParams>) -> Result<CallToolResult, McpError> {
        let result = plans::get_week(&self.database, &p.date)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Copy a meal template onto a day. The copy can be edited without changing the template.")]
    fn assign_template_to_day(&self, Parameters(p): Parameters<AssignTemplateParams>) -> Result<CallToolResult, McpError> {
        match plans::assign_template_to_day(&self.database, &p.date, p.template_id).map_err(|e| McpError::internal_error(e, None))? {
            Some(resp) => to_json(&resp),
            None => not_found("Meal template", p.template_id),
        }
    }

    #[tool(description = "Put a new empty meal on a day")]
    fn add_quick_meal(&self, Parameters(p): Parameters<AddQuickMealParams>) -> Result<CallToolResult, McpError> {
        let result = plans::add_quick_meal(&self.database, &p.date, &p.name)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Take a meal off a day")]
    fn remove_meal_from_day(&self, Parameters(p): Parameters<RemoveMealFromDayParams>) -> Result<CallToolResult, McpError> {
        let result = plans::remove_meal_from_day(&self.database, p.assignment_id)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Shopping List ---

    #[tool(description = "Build the shopping list for the week containing week_of (or for every meal template when omitted). Replaces the current list; ticks are reset.")]
    async fn generate_shopping_list(&self, Parameters(p): Parameters<GenerateShoppingListParams>) -> Result<CallToolResult, McpError> {
        let scope = ShoppingScope::from_arg(p.week_of.as_deref())
            .map_err(|e| McpError::invalid_params(e, None))?;
        let mut state = self.shopping_list.lock().await;
        let result = shopping::generate_shopping_list(&self.database, &mut state, scope)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Tick or untick an item on the current shopping list")]
    async fn toggle_shopping_item(&self, Parameters(p): Parameters<ToggleShoppingItemParams>) -> Result<CallToolResult, McpError> {
        let mut state = self.shopping_list.lock().await;
        to_json(&shopping::toggle_shopping_item(&mut state, &p.id))
    }

    #[tool(description = "Remove every ticked item from the current shopping list")]
    async fn clear_checked_items(&self) -> Result<CallToolResult, McpError> {
        let mut state = self.shopping_list.lock().await;
        to_json(&shopping::clear_checked_items(&mut state))
    }

    #[tool(description = "Render the current shopping list as plain text or markdown")]
    async fn export_shopping_list(&self, Parameters(p): Parameters<ExportShoppingListParams>) -> Result<CallToolResult, McpError> {
        let state = self.shopping_list.lock().await;
        let result = shopping::export_shopping_list(&state, &p.format)
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for PlannerService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mealplan".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Weekly Meal Planner".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Weekly Meal Planner - meal templates, week plans, nutrient totals and shopping lists. \
                 IMPORTANT: Call planner_instructions before planning. \
                 Meals: create_meal_template/list_meal_templates/get_meal/rename_meal/duplicate_meal/delete_meal. \
                 Ingredients: add/update/remove_ingredient, add_ingredient_from_search (USDA or OpenFoodFacts record). \
                 Week: get_week, assign_template_to_day, add_quick_meal, remove_meal_from_day. \
                 Shopping: generate_shopping_list, toggle_shopping_item, clear_checked_items, export_shopping_list."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_accepts_numbers_and_strings() {
        assert_eq!(numeric(Some(json!(150))), NumericInput::Number(150.0));
        assert_eq!(numeric(Some(json!("52.5"))), NumericInput::Text("52.5".to_string()));
        assert_eq!(numeric(Some(json!(null))), NumericInput::Missing);
        assert_eq!(numeric(Some(json!([1, 2]))), NumericInput::Missing);
        assert_eq!(numeric(None), NumericInput::Missing);
    }

    #[test]
    fn test_ingredient_params_into_line() {
        let params: IngredientParams = serde_json::from_value(json!({
            "name": "Apple",
            "source": "usda",
            "grams": "150",
            "calories_100g": 52
        }))
        .unwrap();
        let line = params.into_line().unwrap();
        assert_eq!(line.source, Some(FoodSource::Usda));
        assert_eq!(line.grams.value(), 150.0);
        assert_eq!(line.fat_100g, NumericInput::Missing);
    }

    #[test]
    fn test_unknown_source_rejected() {
        assert!(parse_source(Some("fridge")).is_err());
        assert_eq!(parse_source(Some("  ")).unwrap(), None);
    }
}
