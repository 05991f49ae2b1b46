//! Planner Tools module
//!
//! Tool implementations behind the MCP server: plain functions over the
//! database returning serializable responses.

pub mod meals;
pub mod plans;
pub mod shopping;
pub mod status;
