//! Planner Status Tool
//!
//! Provides runtime status information and usage instructions for the
//! meal planner service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Meal planning instructions for AI assistants
pub const PLANNER_INSTRUCTIONS: &str = r#"
# Weekly Meal Planner Instructions

This guide explains how to plan a week of meals and build a shopping list.

## Overview

1. **Meal templates** - Reusable meals in the library, each an ordered list of ingredient lines
2. **Week plan** - Copies of templates (meal instances) placed on calendar days
3. **Shopping list** - Every ingredient of the planned meals, merged by name with grams summed

---

## Ingredient Lines

Each line has a name, a gram quantity and nutrient densities **per 100g**:
`calories_100g`, `protein_100g`, `fat_100g`, `carbs_100g`.

- Values may be numbers or strings; anything that is not a number counts as 0
- A line's contribution is `density / 100 * grams`
- Lines with an empty name are kept on the meal but never appear on a shopping list

**Tools:** `add_ingredient`, `update_ingredient`, `remove_ingredient`

### From a nutrition database

`add_ingredient_from_search` accepts a raw USDA or OpenFoodFacts record with a
`source` field (`"USDA"` or `"OpenFoodFacts"`):

- USDA records are taken per 100g
- OpenFoodFacts records use the grams in `serving_size` (e.g. `"1 bowl (45 g)"`), else 100g
- Energy in kJ is converted to kcal
- Pass `grams` to override the quantity

---

## Building a Week

Dates use ISO format: YYYY-MM-DD. Weeks run Monday to Sunday; any date picks
the week containing it.

1. `list_meal_templates` to see the library (or `create_meal_template`)
2. `assign_template_to_day` copies a template onto a day. Editing that copy
   (via `get_meal` on the returned `meal_id`) never changes the template.
3. `add_quick_meal` puts an empty meal on a day
4. `get_week` shows each day's meals with calorie and macro totals
5. `remove_meal_from_day` takes a meal off a day

Renaming a meal with `rename_meal` also updates its name on the calendar.

---

## Shopping List

1. `generate_shopping_list` with `week_of` (any date in the week), or without it
   to use the whole template library
2. `toggle_shopping_item` with an item `id` to tick it off
3. `clear_checked_items` removes ticked items
4. `export_shopping_list` with `format` = `text` or `markdown`

Notes:
- Items merge by name, ignoring case and surrounding spaces
- Quantities are in grams; a zero total shows as "as needed"
- Generating a new list resets every tick
"#;

/// Runtime status of the planner service
#[derive(Debug, Clone, Serialize)]
pub struct PlannerStatus {
    /// Build information
    #[serde(flatten)]
    pub build: BuildInfo,
    pub build_label: String,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,

    /// Items on the current shopping list
    pub shopping_list_items: usize,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
        }
    }

    /// Get the current status
    pub fn get_status(&self, shopping_list_items: usize) -> PlannerStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        PlannerStatus {
            build_label: build_info.label(),
            build: build_info,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
            shopping_list_items,
        }
    }
}
