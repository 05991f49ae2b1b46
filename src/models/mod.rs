//! Data models
//!
//! Rust structs representing database entities and provider records.

mod day_plan;
mod ingredient;
mod meal;
mod nutrition;
mod search_result;

pub use day_plan::{DayPlan, MealAssignment};
pub use ingredient::{FoodSource, Ingredient, IngredientLine, IngredientUpdate};
pub use meal::{Meal, MealCreate, MealKind};
pub use nutrition::NutrientTotals;
pub use search_result::{
    OpenFoodFactsItem, SearchResultItem, UsdaFoodItem, UsdaNutrient,
};
