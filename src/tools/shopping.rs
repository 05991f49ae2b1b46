//! Shopping List MCP Tools
//!
//! Generates the shopping list for a week (or the whole meal library) and
//! keeps the current list so items can be ticked off between calls.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::models::{Meal, MealKind};
use crate::shopping::{
    aggregate, clear_checked, render_markdown, render_plain_text, toggle, ShoppingListItem,
};
use crate::tools::plans::week_meals;
use crate::week::{format_date, parse_date, week_start};

/// Which meals a shopping list is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShoppingScope {
    /// Every meal assigned in the week containing the date
    Week(NaiveDate),
    /// Every meal template
    Library,
}

impl ShoppingScope {
    /// Parse a tool argument: a date means that date's week, nothing means the library
    pub fn from_arg(week_of: Option<&str>) -> Result<Self, String> {
        match week_of.map(str::trim).filter(|s| !s.is_empty()) {
            Some(date) => Ok(ShoppingScope::Week(week_start(parse_date(date)?))),
            None => Ok(ShoppingScope::Library),
        }
    }

    pub fn title(&self) -> String {
        match self {
            ShoppingScope::Week(start) => format!("Shopping list: week of {}", format_date(*start)),
            ShoppingScope::Library => "Shopping list: meal library".to_string(),
        }
    }
}

/// The most recently generated list and its checked state
#[derive(Debug, Default)]
pub struct ShoppingListState {
    title: Option<String>,
    items: Vec<ShoppingListItem>,
}

impl ShoppingListState {
    pub fn items(&self) -> &[ShoppingListItem] {
        &self.items
    }
}

/// Response for generate / toggle / clear
#[derive(Debug, Serialize)]
pub struct ShoppingListResponse {
    pub title: String,
    pub items: Vec<ShoppingListItem>,
    pub item_count: usize,
    pub checked_count: usize,
    pub text: String,
}

impl ShoppingListResponse {
    fn from_state(state: &ShoppingListState) -> Self {
        Self {
            title: state.title.clone().unwrap_or_else(|| "Shopping list".to_string()),
            items: state.items.clone(),
            item_count: state.items.len(),
            checked_count: state.items.iter().filter(|i| i.checked).count(),
            text: render_plain_text(&state.items),
        }
    }
}

/// Response for toggle_shopping_item
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub id: String,
    pub checked: Option<bool>,
    pub list: ShoppingListResponse,
}

/// Response for clear_checked_items
#[derive(Debug, Serialize)]
pub struct ClearCheckedResponse {
    pub removed: usize,
    pub list: ShoppingListResponse,
}

/// Response for export_shopping_list
#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub format: String,
    pub content: String,
}

/// Load the meals a scope covers
pub fn meals_in_scope(db: &Database, scope: ShoppingScope) -> Result<Vec<Meal>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    match scope {
        ShoppingScope::Week(date) => week_meals(&conn, date),
        ShoppingScope::Library => Meal::list(&conn, MealKind::Template, None)
            .map_err(|e| format!("Failed to list meal templates: {}", e)),
    }
}

/// Rebuild the list from scratch; previous checked state is discarded
pub fn generate_shopping_list(
    db: &Database,
    state: &mut ShoppingListState,
    scope: ShoppingScope,
) -> Result<ShoppingListResponse, String> {
    let meals = meals_in_scope(db, scope)?;
    let items = aggregate(&meals);

    tracing::info!(meals = meals.len(), items = items.len(), "generated shopping list");

    state.title = Some(scope.title());
    state.items = items;
    Ok(ShoppingListResponse::from_state(state))
}

/// Tick or untick one item of the current list
pub fn toggle_shopping_item(state: &mut ShoppingListState, id: &str) -> ToggleResponse {
    let success = toggle(&mut state.items, id);
    let checked = state.items.iter().find(|i| i.id == id).map(|i| i.checked);

    ToggleResponse {
        success,
        id: id.to_string(),
        checked,
        list: ShoppingListResponse::from_state(state),
    }
}

/// Drop every checked item from the current list
pub fn clear_checked_items(state: &mut ShoppingListState) -> ClearCheckedResponse {
    let before = state.items.len();
    state.items = clear_checked(&state.items);

    ClearCheckedResponse {
        removed: before - state.items.len(),
        list: ShoppingListResponse::from_state(state),
    }
}

/// Render the current list as `text` or `markdown`
pub fn export_shopping_list(state: &ShoppingListState, format: &str) -> Result<ExportResponse, String> {
    let title = state.title.as_deref().unwrap_or("Shopping list");
    let content = match format.trim().to_lowercase().as_str() {
        "text" | "plain" | "txt" => render_plain_text(&state.items),
        "markdown" | "md" => render_markdown(&state.items, title),
        other => return Err(format!("Unknown export format '{}' (expected text or markdown)", other)),
    };

    Ok(ExportResponse {
        format: format.trim().to_lowercase(),
        content,
    })
}
