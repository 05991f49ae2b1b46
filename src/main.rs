//! Weekly Meal Planner
//!
//! An MCP server for meal planning, nutrient totals and shopping lists.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use mealplan::build_info;
use mealplan::config::{Config, DEFAULT_LOG_DIRECTIVE};
use mealplan::db::Database;
use mealplan::mcp::PlannerService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(DEFAULT_LOG_DIRECTIVE.parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env();
    eprintln!("Database path: {}", config.database_path.display());
    config.ensure_data_dir()?;

    let database = Database::open_migrated(&config.database_path)?;

    let service = PlannerService::new(config.database_path, database);

    // Create stdio transport
    let transport = (stdin(), stdout());

    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
