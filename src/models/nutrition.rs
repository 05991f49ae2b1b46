//! Shared nutrient totals structure
//!
//! Used for ingredient lines, meals and days.

use serde::{Deserialize, Serialize};

use crate::nutrition::round_to;

/// Calories and macronutrients
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein: f64, // grams
    pub fat: f64,     // grams
    pub carbs: f64,   // grams
}

impl NutrientTotals {
    /// All-zero totals
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale every value by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            fat: self.fat * multiplier,
            carbs: self.carbs * multiplier,
        }
    }

    /// Add another set of totals to this one
    pub fn add(&self, other: &NutrientTotals) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            fat: self.fat + other.fat,
            carbs: self.carbs + other.carbs,
        }
    }

    /// Round every value to `decimals` places
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            calories: round_to(self.calories, decimals),
            protein: round_to(self.protein, decimals),
            fat: round_to(self.fat, decimals),
            carbs: round_to(self.carbs, decimals),
        }
    }

    /// Total grams of protein, fat and carbs
    pub fn macro_grams(&self) -> f64 {
        self.protein + self.fat + self.carbs
    }
}

impl std::ops::Add for NutrientTotals {
    type Output = NutrientTotals;

    fn add(self, other: NutrientTotals) -> NutrientTotals {
        NutrientTotals::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for NutrientTotals {
    type Output = NutrientTotals;

    fn mul(self, multiplier: f64) -> NutrientTotals {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for NutrientTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutrientTotals::zero(), |acc, n| acc + n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_and_scale() {
        let a = NutrientTotals { calories: 100.0, protein: 10.0, fat: 5.0, carbs: 1.0 };
        let b = NutrientTotals { calories: 50.0, protein: 2.0, fat: 1.0, carbs: 9.0 };
        let total: NutrientTotals = vec![a, b].into_iter().sum();
        assert_eq!(total.calories, 150.0);
        assert_eq!(total.macro_grams(), 28.0);
        assert_eq!((a * 2.0).protein, 20.0);
    }

    #[test]
    fn test_rounded() {
        let t = NutrientTotals { calories: 77.96, protein: 1.005, fat: 0.0, carbs: 2.449 };
        let r = t.rounded(2);
        assert_eq!(r.calories, 77.96);
        assert_eq!(r.protein, 1.01);
        assert_eq!(r.carbs, 2.45);
        assert_eq!(t.rounded(0).calories, 78.0);
    }
}
