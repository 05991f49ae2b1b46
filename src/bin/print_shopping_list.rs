//! Print the shopping list for a week
//!
//! Usage: print_shopping_list [YYYY-MM-DD] [--markdown]
//!
//! The date picks the week containing it (default: today).

use tracing_subscriber::EnvFilter;

use mealplan::config::{Config, DEFAULT_LOG_DIRECTIVE};
use mealplan::db::Database;
use mealplan::nutrition::{compute_totals, format_number};
use mealplan::shopping::{aggregate, render_markdown, render_plain_text};
use mealplan::tools::shopping::{meals_in_scope, ShoppingScope};
use mealplan::week::{parse_date, week_start};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(DEFAULT_LOG_DIRECTIVE.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let mut markdown = false;
    let mut date = chrono::Local::now().date_naive();
    for arg in std::env::args().skip(1) {
        if arg == "--markdown" {
            markdown = true;
        } else {
            date = parse_date(&arg)?;
        }
    }

    let config = Config::from_env();
    let database = Database::open_migrated(&config.database_path)?;

    let scope = ShoppingScope::Week(week_start(date));
    let meals = meals_in_scope(&database, scope)?;
    let items = aggregate(&meals);
    let title = scope.title();

    if markdown {
        print!("{}", render_markdown(&items, &title));
        return Ok(());
    }

    println!("{}", title);
    println!();
    if items.is_empty() {
        println!("No meals planned this week.");
        return Ok(());
    }
    println!("{}", render_plain_text(&items));

    let totals = compute_totals(meals.iter().flat_map(|m| m.lines()));
    println!();
    println!(
        "Week totals: {} kcal | protein {}g | fat {}g | carbs {}g",
        format_number(totals.calories, 0),
        format_number(totals.protein, 0),
        format_number(totals.fat, 0),
        format_number(totals.carbs, 0),
    );

    Ok(())
}
