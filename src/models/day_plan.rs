//! Day plan model
//!
//! Meal instances placed on calendar days.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::week::{format_date, DATE_FORMAT};
use super::{Meal, MealCreate, MealKind};

/// One meal placed on a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealAssignment {
    pub id: i64,
    pub date: NaiveDate,
    pub meal_id: i64,
    pub meal_name: String,
    pub position: i64,
}

/// All meals assigned to one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub assignments: Vec<MealAssignment>,
}

impl MealAssignment {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let date: String = row.get("date")?;
        let date = NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Self {
            id: row.get("id")?,
            date,
            meal_id: row.get("meal_id")?,
            meal_name: row.get("meal_name")?,
            position: row.get("position")?,
        })
    }

    /// Get an assignment by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meal_assignments WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(assignment) => Ok(Some(assignment)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Append an existing meal to the end of a day
    pub fn create(conn: &Connection, date: NaiveDate, meal: &Meal) -> DbResult<Self> {
        let date_str = format_date(date);
        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM meal_assignments WHERE date = ?1",
            [&date_str],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO meal_assignments (date, meal_id, meal_name, position) VALUES (?1, ?2, ?3, ?4)",
            params![date_str, meal.id, meal.name, position],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Meal assignment {}", id)))
    }
}

impl DayPlan {
    /// Assignments for one date, in display order
    pub fn get_for_date(conn: &Connection, date: NaiveDate) -> DbResult<Self> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meal_assignments WHERE date = ?1 ORDER BY position ASC, id ASC",
        )?;

        let assignments = stmt
            .query_map([format_date(date)], MealAssignment::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { date, assignments })
    }

    /// One plan per date from `start` to `end` inclusive, empty days included
    pub fn list_range(conn: &Connection, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<Self>> {
        let mut plans = Vec::new();
        for date in start.iter_days().take_while(|d| *d <= end) {
            plans.push(Self::get_for_date(conn, date)?);
        }
        Ok(plans)
    }

    /// Copy a template into a new instance and place it on `date`
    pub fn assign_template(
        conn: &Connection,
        date: NaiveDate,
        template_id: i64,
    ) -> DbResult<Option<MealAssignment>> {
        let template = match Meal::get_by_id(conn, template_id)? {
            Some(meal) if meal.kind == MealKind::Template => meal,
            _ => return Ok(None),
        };

        let instance = Meal::duplicate(conn, template.id, MealKind::Instance, None)?
            .ok_or_else(|| DbError::NotFound(format!("Meal {}", template.id)))?;

        tracing::debug!(template_id, instance_id = instance.id, %date, "assigned template");
        MealAssignment::create(conn, date, &instance).map(Some)
    }

    /// Place a new, empty instance on `date`
    pub fn add_quick_meal(conn: &Connection, date: NaiveDate, name: &str) -> DbResult<MealAssignment> {
        let instance = Meal::create(
            conn,
            &MealCreate {
                name: name.to_string(),
                kind: MealKind::Instance,
                template_id: None,
            },
        )?;
        MealAssignment::create(conn, date, &instance)
    }

    /// Remove an assignment; the instance goes too once nothing references it
    pub fn remove_assignment(conn: &Connection, assignment_id: i64) -> DbResult<bool> {
        let assignment = match MealAssignment::get_by_id(conn, assignment_id)? {
            Some(assignment) => assignment,
            None => return Ok(false),
        };

        conn.execute("DELETE FROM meal_assignments WHERE id = ?1", [assignment_id])?;

        if Meal::assignment_count(conn, assignment.meal_id)? == 0 {
            conn.execute(
                "DELETE FROM meals WHERE id = ?1 AND kind = 'instance'",
                [assignment.meal_id],
            )?;
        }

        Ok(true)
    }

    /// IDs of the meals assigned on this day, in order
    pub fn meal_ids(&self) -> Vec<i64> {
        self.assignments.iter().map(|a| a.meal_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{Ingredient, IngredientLine};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn porridge(conn: &Connection) -> Meal {
        let meal = Meal::create(
            conn,
            &MealCreate { name: "Porridge".into(), kind: MealKind::Template, template_id: None },
        )
        .unwrap();
        Ingredient::create(conn, meal.id, &IngredientLine::new("Oats", 80.0, 379.0, 13.2, 6.5, 67.7))
            .unwrap();
        meal
    }

    #[test]
    fn test_assign_template_copies_into_instance() {
        let conn = setup();
        let template = porridge(&conn);

        let assignment = DayPlan::assign_template(&conn, monday(), template.id).unwrap().unwrap();
        assert_ne!(assignment.meal_id, template.id);
        assert_eq!(assignment.meal_name, "Porridge");

        let instance = Meal::get_by_id(&conn, assignment.meal_id).unwrap().unwrap();
        assert_eq!(instance.kind, MealKind::Instance);
        assert_eq!(instance.template_id, Some(template.id));
        assert_eq!(instance.ingredients.len(), 1);

        // Editing the instance leaves the template alone
        Ingredient::delete(&conn, instance.ingredients[0].id).unwrap();
        assert_eq!(Meal::get_by_id(&conn, template.id).unwrap().unwrap().ingredients.len(), 1);
    }

    #[test]
    fn test_assign_non_template_is_none() {
        let conn = setup();
        let quick = DayPlan::add_quick_meal(&conn, monday(), "Leftovers").unwrap();
        assert!(DayPlan::assign_template(&conn, monday(), quick.meal_id).unwrap().is_none());
        assert!(DayPlan::assign_template(&conn, monday(), 404).unwrap().is_none());
    }

    #[test]
    fn test_day_order_and_range() {
        let conn = setup();
        let template = porridge(&conn);
        DayPlan::assign_template(&conn, monday(), template.id).unwrap();
        DayPlan::add_quick_meal(&conn, monday(), "Snack").unwrap();

        let day = DayPlan::get_for_date(&conn, monday()).unwrap();
        let names: Vec<&str> = day.assignments.iter().map(|a| a.meal_name.as_str()).collect();
        assert_eq!(names, vec!["Porridge", "Snack"]);

        let week = DayPlan::list_range(&conn, monday(), monday() + chrono::Duration::days(6)).unwrap();
        assert_eq!(week.len(), 7);
        assert!(week[1].assignments.is_empty());
    }

    #[test]
    fn test_rename_refreshes_assignment_name() {
        let conn = setup();
        let quick = DayPlan::add_quick_meal(&conn, monday(), "Snack").unwrap();
        Meal::rename(&conn, quick.meal_id, "Afternoon snack").unwrap();
        let day = DayPlan::get_for_date(&conn, monday()).unwrap();
        assert_eq!(day.assignments[0].meal_name, "Afternoon snack");
    }

    #[test]
    fn test_remove_assignment_deletes_orphan_instance() {
        let conn = setup();
        let template = porridge(&conn);
        let assignment = DayPlan::assign_template(&conn, monday(), template.id).unwrap().unwrap();

        assert!(DayPlan::remove_assignment(&conn, assignment.id).unwrap());
        assert!(Meal::get_by_id(&conn, assignment.meal_id).unwrap().is_none());
        assert!(Meal::get_by_id(&conn, template.id).unwrap().is_some());
        assert!(!DayPlan::remove_assignment(&conn, assignment.id).unwrap());
    }
}
