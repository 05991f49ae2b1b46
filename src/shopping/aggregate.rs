//! Shopping list aggregation
//!
//! Walks every ingredient line of the meals in scope and merges lines that
//! name the same foodstuff into one item with summed grams.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{FoodSource, Meal};

/// Unit every aggregated quantity is expressed in
pub const GRAMS: &str = "g";

/// One line of the shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    /// Merge key
    pub id: String,
    pub ingredient_name: String,
    pub quantity: f64,
    pub unit: String,
    pub meal_names: Vec<String>,
    pub checked: bool,
    pub source: Option<FoodSource>,
}

/// Key deciding whether two lines are the same shopping-list entry.
///
/// The provider tag is not part of the key: "Oats" from USDA and "oats"
/// typed by hand end up on one line.
pub fn merge_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Sort key that orders names the way a reader would: accents are folded
/// onto their base letter and case is ignored, so "Éclair" files under E.
pub fn collation_key(name: &str) -> String {
    name.trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Build the shopping list for `meals`.
///
/// The first line seen for a key fixes the item's display name and source.
/// Lines with blank names are skipped. Items are sorted by [`collation_key`]
/// of the display name, then by merge key.
pub fn aggregate(meals: &[Meal]) -> Vec<ShoppingListItem> {
    let mut items: Vec<ShoppingListItem> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for meal in meals {
        for line in meal.lines() {
            if !line.has_name() {
                tracing::debug!(meal_id = meal.id, "skipping ingredient line with blank name");
                continue;
            }

            let key = merge_key(&line.name);
            let grams = line.grams.value();

            let slot = *index.entry(key.clone()).or_insert_with(|| {
                items.push(ShoppingListItem {
                    id: key,
                    ingredient_name: line.name.trim().to_string(),
                    quantity: 0.0,
                    unit: GRAMS.to_string(),
                    meal_names: Vec::new(),
                    checked: false,
                    source: line.source,
                });
                items.len() - 1
            });

            let item = &mut items[slot];
            item.quantity += grams;
            if !item.meal_names.iter().any(|n| n == &meal.name) {
                item.meal_names.push(meal.name.clone());
            }
        }
    }

    items.sort_by_cached_key(|item| (collation_key(&item.ingredient_name), item.id.clone()));
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IngredientLine;
    use crate::nutrition::NumericInput;

    fn line(name: &str, grams: f64) -> IngredientLine {
        IngredientLine::new(name, grams, 100.0, 1.0, 1.0, 1.0)
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_case_different_names_merge() {
        let meals = vec![
            Meal::from_lines(1, "Lunch", vec![line("chicken breast", 100.0)]),
            Meal::from_lines(2, "Dinner", vec![line("Chicken Breast", 150.0)]),
        ];
        let items = aggregate(&meals);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 250.0);
        assert_eq!(items[0].ingredient_name, "chicken breast");
        assert_eq!(items[0].meal_names, vec!["Lunch", "Dinner"]);
        assert_eq!(items[0].unit, "g");
    }

    #[test]
    fn test_meal_name_listed_once() {
        let meals = vec![Meal::from_lines(
            1,
            "Salad",
            vec![line("Tomato", 50.0), line(" tomato ", 70.0)],
        )];
        let items = aggregate(&meals);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 120.0);
        assert_eq!(items[0].meal_names, vec!["Salad"]);
    }

    #[test]
    fn test_blank_names_skipped() {
        let meals = vec![Meal::from_lines(
            1,
            "Mystery",
            vec![line("", 100.0), line("   ", 50.0), line("Rice", 80.0)],
        )];
        let items = aggregate(&meals);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].ingredient_name, "Rice");
        assert_eq!(items[0].quantity, 80.0);
    }

    #[test]
    fn test_sorted_case_insensitive() {
        let meals = vec![Meal::from_lines(
            1,
            "Fruit bowl",
            vec![line("Banana", 1.0), line("apple", 1.0), line("Carrot", 1.0)],
        )];
        let names: Vec<String> = aggregate(&meals).into_iter().map(|i| i.ingredient_name).collect();
        assert_eq!(names, vec!["apple", "Banana", "Carrot"]);
    }

    #[test]
    fn test_accented_names_sort_with_base_letter() {
        let meals = vec![Meal::from_lines(
            1,
            "Brunch",
            vec![
                line("Zucchini", 1.0),
                line("Crumpets", 1.0),
                line("Crème fraîche", 1.0),
                line("Éclair", 1.0),
                line("apple", 1.0),
            ],
        )];
        let names: Vec<String> = aggregate(&meals).into_iter().map(|i| i.ingredient_name).collect();
        assert_eq!(names, vec!["apple", "Crème fraîche", "Crumpets", "Éclair", "Zucchini"]);
    }

    #[test]
    fn test_collation_key_folds_accents_and_case() {
        assert_eq!(collation_key(" Crème Fraîche "), "creme fraiche");
        assert_eq!(collation_key("ÉCLAIR"), "eclair");
    }

    #[test]
    fn test_idempotent_and_unchecked() {
        let meals = vec![
            Meal::from_lines(1, "A", vec![line("Oats", 80.0), line("Milk", 200.0)]),
            Meal::from_lines(2, "B", vec![line("oats", 40.0)]),
        ];
        let first = aggregate(&meals);
        let second = aggregate(&meals);
        assert_eq!(first, second);
        assert!(first.iter().all(|i| !i.checked));
    }

    #[test]
    fn test_non_numeric_grams_add_nothing() {
        let mut bad = line("Butter", 0.0);
        bad.grams = NumericInput::from("a knob");
        let meals = vec![
            Meal::from_lines(1, "Toast", vec![bad]),
            Meal::from_lines(2, "Eggs", vec![line("butter", 10.0)]),
        ];
        let items = aggregate(&meals);
        assert_eq!(items[0].quantity, 10.0);
        assert_eq!(items[0].meal_names, vec!["Toast", "Eggs"]);
    }

    #[test]
    fn test_source_does_not_split_key() {
        let meals = vec![Meal::from_lines(
            1,
            "Porridge",
            vec![
                line("Oats", 80.0).with_source(FoodSource::Usda),
                line("oats", 20.0).with_source(FoodSource::OpenFoodFacts),
                line("OATS", 10.0),
            ],
        )];
        let items = aggregate(&meals);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 110.0);
        assert_eq!(items[0].source, Some(FoodSource::Usda));
    }
}
