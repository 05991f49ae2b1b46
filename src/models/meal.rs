//! Meal model
//!
//! A meal is a named, ordered list of ingredient lines. Templates live in the
//! meal library; instances are copies placed on a particular day.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::{Ingredient, IngredientLine};

/// Meal kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealKind {
    Template,
    Instance,
}

impl MealKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealKind::Template => "template",
            MealKind::Instance => "instance",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "instance" => MealKind::Instance,
            _ => MealKind::Template,
        }
    }
}

/// A meal with its ingredient lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub name: String,
    pub kind: MealKind,
    pub template_id: Option<i64>,
    pub ingredients: Vec<Ingredient>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealCreate {
    pub name: String,
    pub kind: MealKind,
    pub template_id: Option<i64>,
}

impl Meal {
    /// An unsaved meal built from plain ingredient lines
    pub fn from_lines(id: i64, name: impl Into<String>, lines: Vec<IngredientLine>) -> Self {
        let ingredients = lines
            .into_iter()
            .enumerate()
            .map(|(position, line)| Ingredient {
                id: 0,
                meal_id: id,
                position: position as i64,
                line,
                created_at: String::new(),
                updated_at: String::new(),
            })
            .collect();

        Self {
            id,
            name: name.into(),
            kind: MealKind::Instance,
            template_id: None,
            ingredients,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    /// Iterate the meal's ingredient lines in order
    pub fn lines(&self) -> impl Iterator<Item = &IngredientLine> + '_ {
        self.ingredients.iter().map(|i| &i.line)
    }

    /// Build a Meal (without ingredients) from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            kind: MealKind::from_str(&row.get::<_, String>("kind")?),
            template_id: row.get("template_id")?,
            ingredients: Vec::new(),
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn load_ingredients(conn: &Connection, mut meal: Self) -> DbResult<Self> {
        meal.ingredients = Ingredient::get_for_meal(conn, meal.id)?;
        Ok(meal)
    }

    /// Insert a new meal
    pub fn create(conn: &Connection, data: &MealCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO meals (name, kind, template_id) VALUES (?1, ?2, ?3)",
            params![data.name.trim(), data.kind.as_str(), data.template_id],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Meal {}", id)))
    }

    /// Get a meal with its ingredients
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(meal) => Ok(Some(Self::load_ingredients(conn, meal)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get several meals, skipping IDs that no longer exist
    pub fn get_many(conn: &Connection, ids: &[i64]) -> DbResult<Vec<Self>> {
        let mut meals = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(meal) = Self::get_by_id(conn, id)? {
                meals.push(meal);
            }
        }
        Ok(meals)
    }

    /// List meals of a kind, optionally filtered by name
    pub fn list(conn: &Connection, kind: MealKind, query: Option<&str>) -> DbResult<Vec<Self>> {
        let meals = match query {
            Some(q) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM meals WHERE kind = ?1 AND name LIKE ?2 ESCAPE '\\' ORDER BY name COLLATE NOCASE ASC, id ASC",
                )?;
                let pattern = format!("%{}%", escape_like(q));
                let rows = stmt
                    .query_map(params![kind.as_str(), pattern], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM meals WHERE kind = ?1 ORDER BY name COLLATE NOCASE ASC, id ASC",
                )?;
                let rows = stmt
                    .query_map([kind.as_str()], Self::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        meals
            .into_iter()
            .map(|meal| Self::load_ingredients(conn, meal))
            .collect()
    }

    /// Rename a meal and refresh the calendar's copy of the name
    pub fn rename(conn: &Connection, id: i64, name: &str) -> DbResult<Option<Self>> {
        let name = name.trim();
        let rows = conn.execute(
            "UPDATE meals SET name = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![name, id],
        )?;
        if rows == 0 {
            return Ok(None);
        }

        conn.execute(
            "UPDATE meal_assignments SET meal_name = ?1 WHERE meal_id = ?2",
            params![name, id],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Copy a meal and its ingredients into a new meal
    pub fn duplicate(
        conn: &Connection,
        id: i64,
        kind: MealKind,
        name: Option<&str>,
    ) -> DbResult<Option<Self>> {
        let source = match Self::get_by_id(conn, id)? {
            Some(source) => source,
            None => return Ok(None),
        };

        let template_id = match (kind, source.kind) {
            (MealKind::Instance, MealKind::Template) => Some(source.id),
            (MealKind::Instance, MealKind::Instance) => source.template_id,
            (MealKind::Template, _) => None,
        };

        let copy = Self::create(
            conn,
            &MealCreate {
                name: name.map(str::to_string).unwrap_or(source.name),
                kind,
                template_id,
            },
        )?;
        Ingredient::copy_all(conn, id, copy.id)?;

        Self::get_by_id(conn, copy.id)
    }

    /// Number of calendar assignments referencing a meal
    pub fn assignment_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meal_assignments WHERE meal_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a meal; ingredients and assignments cascade
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

/// Escape LIKE wildcards so a search matches them literally
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
