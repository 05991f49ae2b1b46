//! Weekly Meal Planner Library
//!
//! Nutrient totals, shopping-list aggregation, and the store and tools
//! around them.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod shopping;
pub mod tools;
pub mod week;
