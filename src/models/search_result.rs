//! Nutrition-database search results
//!
//! Records from USDA FoodData Central and OpenFoodFacts, as supplied by a
//! search provider, and their conversion into ingredient lines.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::nutrition::{kj_to_kcal, round_to, serving_grams_or_default, NumericInput};
use super::{FoodSource, IngredientLine};

/// A candidate ingredient from either provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source")]
pub enum SearchResultItem {
    #[serde(rename = "USDA")]
    Usda(UsdaFoodItem),
    OpenFoodFacts(OpenFoodFactsItem),
}

/// USDA food record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdaFoodItem {
    #[serde(default)]
    pub fdc_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub food_nutrients: Vec<UsdaNutrient>,
}

/// One nutrient of a USDA record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdaNutrient {
    #[serde(default)]
    pub nutrient_id: Option<i64>,
    #[serde(default)]
    pub nutrient_number: Option<String>,
    #[serde(default)]
    pub nutrient_name: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

/// OpenFoodFacts product record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenFoodFactsItem {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_name_en: Option<String>,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub generic_name_en: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub serving_size: Option<String>,
    #[serde(default)]
    pub nutriments: HashMap<String, NumericInput>,
}

// (nutrient id, legacy nutrient number)
const USDA_ENERGY: (i64, Option<&str>) = (1008, Some("208"));
// Atwater general-factor energy is matched by id only
const USDA_ENERGY_ATWATER: (i64, Option<&str>) = (2047, None);
const USDA_PROTEIN: (i64, Option<&str>) = (1003, Some("203"));
const USDA_FAT: (i64, Option<&str>) = (1004, Some("204"));
const USDA_CARBS: (i64, Option<&str>) = (1005, Some("205"));

impl UsdaFoodItem {
    fn nutrient(&self, (id, number): (i64, Option<&str>)) -> Option<f64> {
        self.food_nutrients
            .iter()
            .find(|n| {
                n.nutrient_id == Some(id)
                    || (number.is_some() && n.nutrient_number.as_deref() == number)
            })
            .and_then(|n| n.value)
    }

    pub fn display_name(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => "Unknown USDA Product".to_string(),
        }
    }

    pub fn to_ingredient_line(&self) -> IngredientLine {
        let calories = self
            .nutrient(USDA_ENERGY)
            .or_else(|| self.nutrient(USDA_ENERGY_ATWATER))
            .unwrap_or(0.0);

        IngredientLine::new(
            self.display_name(),
            100.0,
            round_to(calories, 2),
            round_to(self.nutrient(USDA_PROTEIN).unwrap_or(0.0), 2),
            round_to(self.nutrient(USDA_FAT).unwrap_or(0.0), 2),
            round_to(self.nutrient(USDA_CARBS).unwrap_or(0.0), 2),
        )
        .with_source(FoodSource::Usda)
    }
}

impl OpenFoodFactsItem {
    fn nutriment(&self, key: &str) -> Option<f64> {
        self.nutriments
            .get(key)
            .filter(|v| v.is_numeric())
            .map(NumericInput::value)
    }

    pub fn display_name(&self) -> String {
        let base = [
            &self.product_name_en,
            &self.product_name,
            &self.generic_name_en,
            &self.generic_name,
        ]
        .into_iter()
        .filter_map(|n| n.as_deref().map(str::trim))
        .find(|n| !n.is_empty())
        .unwrap_or("Unknown Product");

        match self.brands.as_deref().map(str::trim) {
            Some(brands) if !brands.is_empty() => format!("{} - {}", base, brands),
            _ => base.to_string(),
        }
    }

    pub fn to_ingredient_line(&self) -> IngredientLine {
        let calories = self
            .nutriment("energy-kcal_100g")
            .or_else(|| self.nutriment("energy_100g").map(kj_to_kcal))
            .unwrap_or(0.0);

        IngredientLine::new(
            self.display_name(),
            serving_grams_or_default(self.serving_size.as_deref()),
            round_to(calories, 2),
            round_to(self.nutriment("proteins_100g").unwrap_or(0.0), 2),
            round_to(self.nutriment("fat_100g").unwrap_or(0.0), 2),
            round_to(self.nutriment("carbohydrates_100g").unwrap_or(0.0), 2),
        )
        .with_source(FoodSource::OpenFoodFacts)
    }
}

impl SearchResultItem {
    pub fn source(&self) -> FoodSource {
        match self {
            SearchResultItem::Usda(_) => FoodSource::Usda,
            SearchResultItem::OpenFoodFacts(_) => FoodSource::OpenFoodFacts,
        }
    }

    /// Normalize into an ingredient line tagged with its provider
    pub fn into_ingredient_line(self) -> IngredientLine {
        match self {
            SearchResultItem::Usda(item) => item.to_ingredient_line(),
            SearchResultItem::OpenFoodFacts(item) => item.to_ingredient_line(),
        }
    }
}
