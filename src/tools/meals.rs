//! Meal MCP Tools
//!
//! Tools for managing the meal library and editing ingredient lines.

use serde::Serialize;

use crate::db::Database;
use crate::models::{
    FoodSource, Ingredient, IngredientLine, IngredientUpdate, Meal, MealCreate, MealKind,
    NutrientTotals, SearchResultItem,
};
use crate::nutrition::{line_totals, macro_split, meal_totals, MacroSplit, NumericInput};

/// Decimals used for every figure in tool responses
const RESPONSE_DECIMALS: u32 = 2;

/// Ingredient line with its computed contribution
#[derive(Debug, Serialize)]
pub struct IngredientDetail {
    pub id: i64,
    pub position: i64,
    pub name: String,
    pub source: Option<FoodSource>,
    pub grams: NumericInput,
    pub calories_100g: NumericInput,
    pub protein_100g: NumericInput,
    pub fat_100g: NumericInput,
    pub carbs_100g: NumericInput,
    pub totals: NutrientTotals,
}

impl From<Ingredient> for IngredientDetail {
    fn from(ingredient: Ingredient) -> Self {
        let totals = line_totals(&ingredient.line).rounded(RESPONSE_DECIMALS);
        let line = ingredient.line;
        Self {
            id: ingredient.id,
            position: ingredient.position,
            name: line.name,
            source: line.source,
            grams: line.grams,
            calories_100g: line.calories_100g,
            protein_100g: line.protein_100g,
            fat_100g: line.fat_100g,
            carbs_100g: line.carbs_100g,
            totals,
        }
    }
}

/// Full meal detail with ingredients and totals
#[derive(Debug, Serialize)]
pub struct MealDetail {
    pub id: i64,
    pub name: String,
    pub kind: MealKind,
    pub template_id: Option<i64>,
    pub ingredients: Vec<IngredientDetail>,
    pub totals: NutrientTotals,
    pub macro_split: MacroSplit,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Meal> for MealDetail {
    fn from(meal: Meal) -> Self {
        let totals = meal_totals(&meal);
        Self {
            id: meal.id,
            name: meal.name,
            kind: meal.kind,
            template_id: meal.template_id,
            ingredients: meal.ingredients.into_iter().map(IngredientDetail::from).collect(),
            totals: totals.rounded(RESPONSE_DECIMALS),
            macro_split: macro_split(&totals),
            created_at: meal.created_at,
            updated_at: meal.updated_at,
        }
    }
}

/// Meal summary for listing
#[derive(Debug, Serialize)]
pub struct MealSummary {
    pub id: i64,
    pub name: String,
    pub ingredient_count: usize,
    pub totals: NutrientTotals,
}

/// Response for list_meal_templates
#[derive(Debug, Serialize)]
pub struct ListMealTemplatesResponse {
    pub meals: Vec<MealSummary>,
    pub count: usize,
}

/// Response for successful delete
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for add_ingredient / update_ingredient
#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub meal_id: i64,
    pub ingredient: IngredientDetail,
    pub meal_totals: NutrientTotals,
}

fn validate_name(name: &str, what: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{} name cannot be empty", what));
    }
    Ok(())
}

fn ingredient_response(conn: &rusqlite::Connection, ingredient: Ingredient) -> Result<IngredientResponse, String> {
    let meal = Meal::get_by_id(conn, ingredient.meal_id)
        .map_err(|e| format!("Failed to get meal: {}", e))?
        .ok_or_else(|| format!("Meal not found with id: {}", ingredient.meal_id))?;

    Ok(IngredientResponse {
        meal_id: meal.id,
        meal_totals: meal_totals(&meal).rounded(RESPONSE_DECIMALS),
        ingredient: ingredient.into(),
    })
}

// ============================================================================
// Meal Tools
// ============================================================================

/// Create a new meal template, optionally with ingredient lines
pub fn create_meal_template(
    db: &Database,
    name: &str,
    ingredients: Vec<IngredientLine>,
) -> Result<MealDetail, String> {
    validate_name(name, "Meal")?;

    db.with_transaction(|tx| {
        let meal = Meal::create(
            tx,
            &MealCreate { name: name.to_string(), kind: MealKind::Template, template_id: None },
        )?;
        for line in &ingredients {
            Ingredient::create(tx, meal.id, line)?;
        }
        Meal::get_by_id(tx, meal.id)
    })
    .map_err(|e| format!("Failed to create meal template: {}", e))?
    .map(MealDetail::from)
    .ok_or_else(|| "Meal template vanished after creation".to_string())
}

/// List meal templates, optionally filtered by name
pub fn list_meal_templates(db: &Database, query: Option<&str>) -> Result<ListMealTemplatesResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let meals = Meal::list(&conn, MealKind::Template, query)
        .map_err(|e| format!("Failed to list meal templates: {}", e))?;

    let summaries: Vec<MealSummary> = meals
        .into_iter()
        .map(|meal| MealSummary {
            id: meal.id,
            ingredient_count: meal.ingredients.len(),
            totals: meal_totals(&meal).rounded(RESPONSE_DECIMALS),
            name: meal.name,
        })
        .collect();

    Ok(ListMealTemplatesResponse {
        count: summaries.len(),
        meals: summaries,
    })
}

/// Get a meal (template or instance) with full details
pub fn get_meal(db: &Database, id: i64) -> Result<Option<MealDetail>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let meal = Meal::get_by_id(&conn, id)
        .map_err(|e| format!("Failed to get meal: {}", e))?;

    Ok(meal.map(MealDetail::from))
}

/// Rename a meal; calendar entries pick up the new name
pub fn rename_meal(db: &Database, id: i64, name: &str) -> Result<Option<MealDetail>, String> {
    validate_name(name, "Meal")?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let meal = Meal::rename(&conn, id, name)
        .map_err(|e| format!("Failed to rename meal: {}", e))?;

    Ok(meal.map(MealDetail::from))
}

/// Copy a meal into a new template
pub fn duplicate_meal(db: &Database, id: i64, name: Option<&str>) -> Result<Option<MealDetail>, String> {
    if let Some(name) = name {
        validate_name(name, "Meal")?;
    }

    let meal = db
        .with_transaction(|tx| Meal::duplicate(tx, id, MealKind::Template, name))
        .map_err(|e| format!("Failed to duplicate meal: {}", e))?;

    Ok(meal.map(MealDetail::from))
}

/// Delete a meal with its ingredients and calendar entries
pub fn delete_meal(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Meal::delete(&conn, id)
        .map_err(|e| format!("Failed to delete meal: {}", e))?;

    if !deleted {
        return Err(format!("Meal not found with id: {}", id));
    }

    tracing::info!(meal_id = id, "deleted meal");
    Ok(DeleteResponse { success: true, deleted_id: id })
}

// ============================================================================
// Ingredient Tools
// ============================================================================

/// Append an ingredient line to a meal
pub fn add_ingredient(db: &Database, meal_id: i64, line: IngredientLine) -> Result<IngredientResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let meal = Meal::get_by_id(&conn, meal_id)
        .map_err(|e| format!("Failed to get meal: {}", e))?;
    if meal.is_none() {
        return Err(format!("Meal not found with id: {}", meal_id));
    }

    let ingredient = Ingredient::create(&conn, meal_id, &line)
        .map_err(|e| format!("Failed to add ingredient: {}", e))?;

    ingredient_response(&conn, ingredient)
}

/// Normalize a search result and append it to a meal
pub fn add_ingredient_from_search(
    db: &Database,
    meal_id: i64,
    item: SearchResultItem,
    grams: Option<f64>,
) -> Result<IngredientResponse, String> {
    let source = item.source();
    let mut line = item.into_ingredient_line();
    if let Some(grams) = grams {
        line.grams = NumericInput::Number(grams);
    }

    tracing::debug!(meal_id, source = source.as_str(), name = %line.name, "adding ingredient from search");
    add_ingredient(db, meal_id, line)
}

/// Update some fields of an ingredient line
pub fn update_ingredient(
    db: &Database,
    id: i64,
    data: IngredientUpdate,
) -> Result<Option<IngredientResponse>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let updated = Ingredient::update(&conn, id, &data)
        .map_err(|e| format!("Failed to update ingredient: {}", e))?;

    match updated {
        Some(ingredient) => ingredient_response(&conn, ingredient).map(Some),
        None => Ok(None),
    }
}

/// Remove an ingredient line from its meal
pub fn remove_ingredient(db: &Database, id: i64) -> Result<DeleteResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Ingredient::delete(&conn, id)
        .map_err(|e| format!("Failed to remove ingredient: {}", e))?;

    if !deleted {
        return Err(format!("Ingredient not found with id: {}", id));
    }

    Ok(DeleteResponse { success: true, deleted_id: id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UsdaFoodItem;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_migrated(dir.path().join("meals.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn test_create_template_with_lines() {
        let (_dir, db) = setup();
        let meal = create_meal_template(
            &db,
            "Snack",
            vec![IngredientLine::new("Apple", 150.0, 52.0, 0.3, 0.2, 14.0)],
        )
        .unwrap();

        assert_eq!(meal.kind, MealKind::Template);
        assert_eq!(meal.ingredients.len(), 1);
        assert_eq!(meal.totals.calories, 78.0);
        assert_eq!(meal.ingredients[0].totals.carbs, 21.0);
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let (_dir, db) = setup();
        assert!(create_meal_template(&db, "  ", Vec::new()).is_err());
    }

    #[test]
    fn test_ingredient_lifecycle() {
        let (_dir, db) = setup();
        let meal = create_meal_template(&db, "Porridge", Vec::new()).unwrap();

        let added = add_ingredient(&db, meal.id, IngredientLine::new("Oats", 100.0, 379.0, 13.2, 6.5, 67.7))
            .unwrap();
        assert_eq!(added.meal_totals.calories, 379.0);

        let update = IngredientUpdate { grams: Some(NumericInput::from("50")), ..Default::default() };
        let updated = update_ingredient(&db, added.ingredient.id, update).unwrap().unwrap();
        assert_eq!(updated.meal_totals.calories, 189.5);
        assert_eq!(updated.ingredient.grams, NumericInput::Text("50".to_string()));

        remove_ingredient(&db, added.ingredient.id).unwrap();
        assert!(get_meal(&db, meal.id).unwrap().unwrap().ingredients.is_empty());
        assert!(remove_ingredient(&db, added.ingredient.id).is_err());
    }

    #[test]
    fn test_add_ingredient_to_missing_meal() {
        let (_dir, db) = setup();
        let err = add_ingredient(&db, 99, IngredientLine::default()).unwrap_err();
        assert!(err.contains("not found"));
    }

    #[test]
    fn test_add_from_search_overrides_grams() {
        let (_dir, db) = setup();
        let meal = create_meal_template(&db, "Snack", Vec::new()).unwrap();
        let item = SearchResultItem::Usda(UsdaFoodItem {
            description: Some("Bananas, raw".to_string()),
            ..Default::default()
        });

        let added = add_ingredient_from_search(&db, meal.id, item, Some(120.0)).unwrap();
        assert_eq!(added.ingredient.name, "Bananas, raw");
        assert_eq!(added.ingredient.source, Some(FoodSource::Usda));
        assert_eq!(added.ingredient.grams, NumericInput::Number(120.0));
    }

    #[test]
    fn test_list_rename_duplicate_delete() {
        let (_dir, db) = setup();
        let meal = create_meal_template(&db, "Omelette", vec![IngredientLine::new("Egg", 120.0, 143.0, 12.6, 9.5, 0.7)])
            .unwrap();

        let renamed = rename_meal(&db, meal.id, "Cheese omelette").unwrap().unwrap();
        assert_eq!(renamed.name, "Cheese omelette");

        let copy = duplicate_meal(&db, meal.id, Some("Omelette (copy)")).unwrap().unwrap();
        assert_eq!(copy.ingredients.len(), 1);

        let listed = list_meal_templates(&db, None).unwrap();
        assert_eq!(listed.count, 2);
        assert_eq!(listed.meals[0].name, "Cheese omelette");

        delete_meal(&db, copy.id).unwrap();
        assert!(get_meal(&db, copy.id).unwrap().is_none());
        assert!(delete_meal(&db, copy.id).is_err());
    }
}
