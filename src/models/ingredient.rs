//! Ingredient model
//!
//! An ingredient line is one foodstuff within a meal: a gram quantity plus
//! nutrient densities per 100g, all kept exactly as entered.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::NumericInput;

/// Where an ingredient's nutrient data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodSource {
    #[serde(rename = "USDA")]
    Usda,
    OpenFoodFacts,
}

impl FoodSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodSource::Usda => "USDA",
            FoodSource::OpenFoodFacts => "OpenFoodFacts",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "usda" => Some(FoodSource::Usda),
            "openfoodfacts" | "off" => Some(FoodSource::OpenFoodFacts),
            _ => None,
        }
    }
}

/// One ingredient line as the engine sees it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source: Option<FoodSource>,
    #[serde(default)]
    pub grams: NumericInput,
    #[serde(default)]
    pub calories_100g: NumericInput,
    #[serde(default)]
    pub protein_100g: NumericInput,
    #[serde(default)]
    pub fat_100g: NumericInput,
    #[serde(default)]
    pub carbs_100g: NumericInput,
}

impl IngredientLine {
    /// Build a line from plain numbers
    pub fn new(
        name: impl Into<String>,
        grams: f64,
        calories_100g: f64,
        protein_100g: f64,
        fat_100g: f64,
        carbs_100g: f64,
    ) -> Self {
        Self {
            name: name.into(),
            source: None,
            grams: grams.into(),
            calories_100g: calories_100g.into(),
            protein_100g: protein_100g.into(),
            fat_100g: fat_100g.into(),
            carbs_100g: carbs_100g.into(),
        }
    }

    pub fn with_source(mut self, source: FoodSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Whether the line has a usable name
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// A stored ingredient line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub meal_id: i64,
    pub position: i64,
    #[serde(flatten)]
    pub line: IngredientLine,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial update for an ingredient line; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientUpdate {
    pub name: Option<String>,
    pub source: Option<FoodSource>,
    pub grams: Option<NumericInput>,
    pub calories_100g: Option<NumericInput>,
    pub protein_100g: Option<NumericInput>,
    pub fat_100g: Option<NumericInput>,
    pub carbs_100g: Option<NumericInput>,
}

impl Ingredient {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let source: Option<String> = row.get("source")?;
        Ok(Self {
            id: row.get("id")?,
            meal_id: row.get("meal_id")?,
            position: row.get("position")?,
            line: IngredientLine {
                name: row.get("name")?,
                source: source.as_deref().and_then(FoodSource::from_str),
                grams: row.get("grams")?,
                calories_100g: row.get("calories_100g")?,
                protein_100g: row.get("protein_100g")?,
                fat_100g: row.get("fat_100g")?,
                carbs_100g: row.get("carbs_100g")?,
            },
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Append an ingredient line to the end of a meal
    pub fn create(conn: &Connection, meal_id: i64, line: &IngredientLine) -> DbResult<Self> {
        let position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM ingredients WHERE meal_id = ?1",
            [meal_id],
            |row| row.get(0),
        )?;

        conn.execute(
            r#"
            INSERT INTO ingredients (
                meal_id, position, name, source,
                grams, calories_100g, protein_100g, fat_100g, carbs_100g
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                meal_id,
                position,
                line.name,
                line.source.map(|s| s.as_str()),
                line.grams,
                line.calories_100g,
                line.protein_100g,
                line.fat_100g,
                line.carbs_100g,
            ],
        )?;

        let id = conn.last_insert_rowid();
        touch_meal(conn, meal_id)?;

        Self::get_by_id(conn, id)?.ok_or_else(|| DbError::NotFound(format!("Ingredient {}", id)))
    }

    /// Get an ingredient by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(ingredient) => Ok(Some(ingredient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All ingredient lines of a meal in display order
    pub fn get_for_meal(conn: &Connection, meal_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM ingredients WHERE meal_id = ?1 ORDER BY position ASC, id ASC",
        )?;

        let ingredients = stmt
            .query_map([meal_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ingredients)
    }

    /// Update an ingredient line
    pub fn update(conn: &Connection, id: i64, data: &IngredientUpdate) -> DbResult<Option<Self>> {
        let existing = match Self::get_by_id(conn, id)? {
            Some(existing) => existing,
            None => return Ok(None),
        };

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($field:ident) => {
                if let Some(ref val) = data.$field {
                    updates.push(format!("{} = ?{}", stringify!($field), params_vec.len() + 1));
                    params_vec.push(Box::new(val.clone()));
                }
            };
        }

        add_update!(name);
        add_update!(grams);
        add_update!(calories_100g);
        add_update!(protein_100g);
        add_update!(fat_100g);
        add_update!(carbs_100g);

        if let Some(source) = data.source {
            updates.push(format!("source = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(source.as_str()));
        }

        if updates.is_empty() {
            return Ok(Some(existing));
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE ingredients SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;
        touch_meal(conn, existing.meal_id)?;

        Self::get_by_id(conn, id)
    }

    /// Delete an ingredient line
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let existing = Self::get_by_id(conn, id)?;
        let rows = conn.execute("DELETE FROM ingredients WHERE id = ?1", [id])?;
        if let Some(existing) = existing {
            touch_meal(conn, existing.meal_id)?;
        }
        Ok(rows > 0)
    }

    /// Copy every ingredient line of one meal onto the end of another
    pub fn copy_all(conn: &Connection, from_meal_id: i64, to_meal_id: i64) -> DbResult<usize> {
        let lines = Self::get_for_meal(conn, from_meal_id)?;
        for ingredient in &lines {
            Self::create(conn, to_meal_id, &ingredient.line)?;
        }
        Ok(lines.len())
    }
}

fn touch_meal(conn: &Connection, meal_id: i64) -> DbResult<()> {
    conn.execute(
        "UPDATE meals SET updated_at = datetime('now') WHERE id = ?1",
        [meal_id],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn.execute("INSERT INTO meals (name, kind) VALUES ('Breakfast', 'template')", [])
            .unwrap();
        conn
    }

    #[test]
    fn test_food_source_parsing() {
        assert_eq!(FoodSource::from_str("USDA"), Some(FoodSource::Usda));
        assert_eq!(FoodSource::from_str("openfoodfacts"), Some(FoodSource::OpenFoodFacts));
        assert_eq!(FoodSource::from_str("manual"), None);
        assert_eq!(serde_json::to_string(&FoodSource::Usda).unwrap(), r#""USDA""#);
    }

    #[test]
    fn test_create_keeps_raw_values_and_order() {
        let conn = setup();
        let mut oats = IngredientLine::new("Oats", 80.0, 379.0, 13.2, 6.5, 67.7);
        oats.grams = NumericInput::from("80");
        let first = Ingredient::create(&conn, 1, &oats).unwrap();
        let second = Ingredient::create(&conn, 1, &IngredientLine::new("Milk", 200.0, 42.0, 3.4, 1.0, 5.0))
            .unwrap();

        assert_eq!(first.position, 0);
        assert_eq!(second.position, 1);
        assert_eq!(first.line.grams, NumericInput::Text("80".to_string()));

        let lines = Ingredient::get_for_meal(&conn, 1).unwrap();
        let names: Vec<&str> = lines.iter().map(|i| i.line.name.as_str()).collect();
        assert_eq!(names, vec!["Oats", "Milk"]);
    }

    #[test]
    fn test_partial_update() {
        let conn = setup();
        let created = Ingredient::create(&conn, 1, &IngredientLine::new("Oats", 80.0, 379.0, 13.2, 6.5, 67.7))
            .unwrap();

        let update = IngredientUpdate {
            grams: Some(NumericInput::Number(120.0)),
            source: Some(FoodSource::Usda),
            ..Default::default()
        };
        let updated = Ingredient::update(&conn, created.id, &update).unwrap().unwrap();

        assert_eq!(updated.line.grams.value(), 120.0);
        assert_eq!(updated.line.source, Some(FoodSource::Usda));
        assert_eq!(updated.line.name, "Oats");
        assert!(Ingredient::update(&conn, 999, &update).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let conn = setup();
        let created = Ingredient::create(&conn, 1, &IngredientLine::new("Oats", 80.0, 0.0, 0.0, 0.0, 0.0))
            .unwrap();
        assert!(Ingredient::delete(&conn, created.id).unwrap());
        assert!(!Ingredient::delete(&conn, created.id).unwrap());
        assert!(Ingredient::get_for_meal(&conn, 1).unwrap().is_empty());
    }
}
