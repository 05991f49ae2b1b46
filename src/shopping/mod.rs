//! Shopping list module
//!
//! Aggregation of meal ingredients into a checklist, and its renderings.

pub mod aggregate;
pub mod checklist;
pub mod render;

pub use aggregate::{aggregate, collation_key, merge_key, ShoppingListItem, GRAMS};
pub use checklist::{clear_checked, toggle};
pub use render::{escape_markdown, format_quantity, render_markdown, render_markdown_at, render_plain_text, AS_NEEDED};
