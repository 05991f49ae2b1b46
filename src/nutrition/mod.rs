//! Nutrition calculation module
//!
//! Numeric coercion, rounding, totals and provider conversions.

pub mod converter;
pub mod numeric;
pub mod rounding;
pub mod totals;

pub use converter::{kj_to_kcal, parse_serving_grams, serving_grams_or_default};
pub use numeric::{parse_leading_float, NumericInput};
pub use rounding::{format_number, round_to};
pub use totals::{compute_totals, day_totals, line_totals, macro_split, meal_totals, MacroSplit};
