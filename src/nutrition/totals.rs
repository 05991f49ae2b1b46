//! Nutrient totals
//!
//! Totals are raw sums of `(density / 100) * grams` over ingredient lines.
//! Nothing here rounds; callers pick the precision they display.

use serde::{Deserialize, Serialize};

use crate::models::{DayPlan, IngredientLine, Meal, NutrientTotals};
use super::round_to;

/// Contribution of a single ingredient line
pub fn line_totals(line: &IngredientLine) -> NutrientTotals {
    let multiplier = line.grams.value() / 100.0;

    NutrientTotals {
        calories: line.calories_100g.value() * multiplier,
        protein: line.protein_100g.value() * multiplier,
        fat: line.fat_100g.value() * multiplier,
        carbs: line.carbs_100g.value() * multiplier,
    }
}

/// Sum the contributions of every line; an empty input gives all zeros
pub fn compute_totals<'a, I>(lines: I) -> NutrientTotals
where
    I: IntoIterator<Item = &'a IngredientLine>,
{
    lines.into_iter().map(line_totals).sum()
}

/// Totals for one meal
pub fn meal_totals(meal: &Meal) -> NutrientTotals {
    compute_totals(meal.lines())
}

/// Totals for every meal assigned to a day.
///
/// Assignments pointing at meals not present in `meals` contribute nothing.
pub fn day_totals(day: &DayPlan, meals: &[Meal]) -> NutrientTotals {
    day.assignments
        .iter()
        .filter_map(|a| meals.iter().find(|m| m.id == a.meal_id))
        .map(meal_totals)
        .sum()
}

/// Share of each macronutrient in total macro grams, as percentages
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein_pct: f64,
    pub carbs_pct: f64,
    pub fat_pct: f64,
}

/// Percentages rounded to 1 decimal; all zero when there are no macro grams
pub fn macro_split(totals: &NutrientTotals) -> MacroSplit {
    let total = totals.macro_grams();
    if total <= 0.0 || !total.is_finite() {
        return MacroSplit::default();
    }

    MacroSplit {
        protein_pct: round_to(totals.protein / total * 100.0, 1),
        carbs_pct: round_to(totals.carbs / total * 100.0, 1),
        fat_pct: round_to(totals.fat / total * 100.0, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealAssignment;
    use crate::nutrition::NumericInput;
    use chrono::NaiveDate;

    fn apple(grams: f64) -> IngredientLine {
        IngredientLine::new("Apple", grams, 52.0, 0.3, 0.2, 14.0)
    }

    #[test]
    fn test_empty_totals_are_zero() {
        let lines: Vec<IngredientLine> = Vec::new();
        assert_eq!(compute_totals(&lines), NutrientTotals::zero());
    }

    #[test]
    fn test_apple_150g() {
        let totals = compute_totals(&[apple(150.0)]);
        assert_eq!(round_to(totals.calories, 0), 78.0);
        assert_eq!(totals.rounded(2).carbs, 21.0);
    }

    #[test]
    fn test_zero_grams_contribute_nothing() {
        let totals = compute_totals(&[apple(150.0), apple(0.0)]);
        assert_eq!(totals, compute_totals(&[apple(150.0)]));
    }

    #[test]
    fn test_non_numeric_grams_count_as_zero() {
        let mut bad = apple(0.0);
        bad.grams = NumericInput::from("a handful");
        assert_eq!(line_totals(&bad), NutrientTotals::zero());

        let mut empty = apple(0.0);
        empty.calories_100g = NumericInput::Missing;
        empty.grams = NumericInput::from("100");
        assert_eq!(line_totals(&empty).calories, 0.0);
        assert_eq!(line_totals(&empty).carbs, 14.0);
    }

    #[test]
    fn test_day_totals_skip_unknown_meals() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let meal = Meal::from_lines(7, "Snack", vec![apple(100.0)]);
        let day = DayPlan {
            date,
            assignments: vec![
                MealAssignment { id: 1, date, meal_id: 7, meal_name: "Snack".into(), position: 0 },
                MealAssignment { id: 2, date, meal_id: 99, meal_name: "Gone".into(), position: 1 },
            ],
        };
        assert_eq!(day_totals(&day, &[meal]).calories, 52.0);
    }

    #[test]
    fn test_macro_split() {
        let totals = NutrientTotals { calories: 0.0, protein: 25.0, fat: 25.0, carbs: 50.0 };
        let split = macro_split(&totals);
        assert_eq!(split.protein_pct, 25.0);
        assert_eq!(split.carbs_pct, 50.0);
        assert_eq!(macro_split(&NutrientTotals::zero()), MacroSplit::default());
    }
}
