//! Week Plan MCP Tools
//!
//! Tools for placing meals on calendar days and reading a week back.

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::models::{DayPlan, Meal, MealAssignment, NutrientTotals};
use crate::nutrition::meal_totals;
use crate::week::{parse_date, week_dates};

const RESPONSE_DECIMALS: u32 = 2;

/// A meal as it appears on a day
#[derive(Debug, Serialize)]
pub struct PlannedMeal {
    pub assignment_id: i64,
    pub meal_id: i64,
    pub meal_name: String,
    pub ingredient_count: usize,
    pub totals: NutrientTotals,
}

/// One day of the week view
#[derive(Debug, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub weekday: String,
    pub meals: Vec<PlannedMeal>,
    pub totals: NutrientTotals,
}

/// Response for get_week
#[derive(Debug, Serialize)]
pub struct WeekResponse {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub days: Vec<DayDetail>,
    pub totals: NutrientTotals,
}

/// Response for assign_template_to_day / add_quick_meal
#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub assignment_id: i64,
    pub date: NaiveDate,
    pub meal_id: i64,
    pub meal_name: String,
    pub position: i64,
}

impl From<MealAssignment> for AssignmentResponse {
    fn from(a: MealAssignment) -> Self {
        Self {
            assignment_id: a.id,
            date: a.date,
            meal_id: a.meal_id,
            meal_name: a.meal_name,
            position: a.position,
        }
    }
}

/// Response for remove_meal_from_day
#[derive(Debug, Serialize)]
pub struct RemoveAssignmentResponse {
    pub success: bool,
    pub removed_assignment_id: i64,
}

/// Meals of every assignment in the week containing `date`, in calendar order
pub fn week_meals(conn: &rusqlite::Connection, date: NaiveDate) -> Result<Vec<Meal>, String> {
    let mut meals = Vec::new();
    for day in week_dates(date) {
        let plan = DayPlan::get_for_date(conn, day)
            .map_err(|e| format!("Failed to get day plan: {}", e))?;
        let day_meals = Meal::get_many(conn, &plan.meal_ids())
            .map_err(|e| format!("Failed to get meals: {}", e))?;
        meals.extend(day_meals);
    }
    Ok(meals)
}

/// Get the Monday-to-Sunday week containing `date` with per-day totals
pub fn get_week(db: &Database, date: &str) -> Result<WeekResponse, String> {
    let date = parse_date(date)?;
    let dates = week_dates(date);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let mut days = Vec::with_capacity(dates.len());
    let mut week_totals = NutrientTotals::zero();

    for day in dates {
        let plan = DayPlan::get_for_date(&conn, day)
            .map_err(|e| format!("Failed to get day plan: {}", e))?;

        let mut meals = Vec::with_capacity(plan.assignments.len());
        let mut day_totals = NutrientTotals::zero();

        for assignment in plan.assignments {
            let meal = Meal::get_by_id(&conn, assignment.meal_id)
                .map_err(|e| format!("Failed to get meal: {}", e))?;
            let (ingredient_count, totals) = match &meal {
                Some(meal) => (meal.ingredients.len(), meal_totals(meal)),
                None => (0, NutrientTotals::zero()),
            };
            day_totals = day_totals + totals;

            meals.push(PlannedMeal {
                assignment_id: assignment.id,
                meal_id: assignment.meal_id,
                meal_name: assignment.meal_name,
                ingredient_count,
                totals: totals.rounded(RESPONSE_DECIMALS),
            });
        }

        week_totals = week_totals + day_totals;
        days.push(DayDetail {
            date: day,
            weekday: day.format("%A").to_string(),
            meals,
            totals: day_totals.rounded(RESPONSE_DECIMALS),
        });
    }

    Ok(WeekResponse {
        week_start: dates[0],
        week_end: dates[6],
        days,
        totals: week_totals.rounded(RESPONSE_DECIMALS),
    })
}

/// Copy a template onto a day as a new meal instance
pub fn assign_template_to_day(
    db: &Database,
    date: &str,
    template_id: i64,
) -> Result<Option<AssignmentResponse>, String> {
    let date = parse_date(date)?;

    let assignment = db
        .with_transaction(|tx| DayPlan::assign_template(tx, date, template_id))
        .map_err(|e| format!("Failed to assign meal: {}", e))?;

    Ok(assignment.map(AssignmentResponse::from))
}

/// Put a new empty meal on a day
pub fn add_quick_meal(db: &Database, date: &str, name: &str) -> Result<AssignmentResponse, String> {
    let date = parse_date(date)?;
    if name.trim().is_empty() {
        return Err("Meal name cannot be empty".to_string());
    }

    let assignment = db
        .with_transaction(|tx| DayPlan::add_quick_meal(tx, date, name))
        .map_err(|e| format!("Failed to add meal: {}", e))?;

    Ok(assignment.into())
}

/// Take a meal off a day
pub fn remove_meal_from_day(db: &Database, assignment_id: i64) -> Result<RemoveAssignmentResponse, String> {
    let removed = db
        .with_transaction(|tx| DayPlan::remove_assignment(tx, assignment_id))
        .map_err(|e| format!("Failed to remove meal from day: {}", e))?;

    if !removed {
        return Err(format!("Meal assignment not found with id: {}", assignment_id));
    }

    Ok(RemoveAssignmentResponse {
        success: true,
        removed_assignment_id: assignment_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IngredientLine;
    use crate::tools::meals::create_meal_template;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_migrated(dir.path().join("plans.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn test_get_week_shape() {
        let (_dir, db) = setup();
        let week = get_week(&db, "2024-06-05").unwrap();
        assert_eq!(week.week_start.to_string(), "2024-06-03");
        assert_eq!(week.week_end.to_string(), "2024-06-09");
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.days[0].weekday, "Monday");
        assert_eq!(week.totals, NutrientTotals::zero());
    }

    #[test]
    fn test_assign_and_totals() {
        let (_dir, db) = setup();
        let snack = create_meal_template(
            &db,
            "Snack",
            vec![IngredientLine::new("Apple", 150.0, 52.0, 0.3, 0.2, 14.0)],
        )
        .unwrap();

        assign_template_to_day(&db, "2024-06-03", snack.id).unwrap().unwrap();
        assign_template_to_day(&db, "2024-06-04", snack.id).unwrap().unwrap();
        add_quick_meal(&db, "2024-06-04", "Leftovers").unwrap();

        let week = get_week(&db, "2024-06-09").unwrap();
        assert_eq!(week.days[0].totals.calories, 78.0);
        assert_eq!(week.days[1].meals.len(), 2);
        assert_eq!(week.totals.calories, 156.0);
    }

    #[test]
    fn test_assign_unknown_template() {
        let (_dir, db) = setup();
        assert!(assign_template_to_day(&db, "2024-06-03", 12).unwrap().is_none());
        assert!(assign_template_to_day(&db, "June 3rd", 12).is_err());
    }

    #[test]
    fn test_remove_meal_from_day() {
        let (_dir, db) = setup();
        let quick = add_quick_meal(&db, "2024-06-03", "Soup").unwrap();
        remove_meal_from_day(&db, quick.assignment_id).unwrap();
        assert!(get_week(&db, "2024-06-03").unwrap().days[0].meals.is_empty());
        assert!(remove_meal_from_day(&db, quick.assignment_id).is_err());
    }
}
