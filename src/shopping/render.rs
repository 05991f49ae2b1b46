//! Shopping list rendering
//!
//! Plain text for terminals and markdown for sharing.

use chrono::{DateTime, Utc};

use crate::nutrition::{format_number, round_to};
use super::ShoppingListItem;

/// Shown instead of a zero or negative quantity
pub const AS_NEEDED: &str = "as needed";

/// Quantity rounded to 1 decimal with its unit, e.g. `250g` or `12.5g`
pub fn format_quantity(quantity: f64, unit: &str) -> String {
    let rounded = round_to(quantity, 1);
    if rounded <= 0.0 || !rounded.is_finite() {
        return AS_NEEDED.to_string();
    }
    format!("{}{}", format_number(rounded, 1), unit)
}

/// One line per item: `[x] Oats — 160g (For: Porridge, Muesli)`
pub fn render_plain_text(items: &[ShoppingListItem]) -> String {
    items
        .iter()
        .map(|item| {
            format!(
                "[{}] {} — {} (For: {})",
                if item.checked { "x" } else { " " },
                item.ingredient_name,
                format_quantity(item.quantity, &item.unit),
                item.meal_names.join(", "),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Backslash-escape characters that markdown would read as inline formatting
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '~' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Markdown checklist stamped with the current time
pub fn render_markdown(items: &[ShoppingListItem], title: &str) -> String {
    render_markdown_at(items, title, Utc::now())
}

/// Markdown checklist; checked items are struck through
pub fn render_markdown_at(
    items: &[ShoppingListItem],
    title: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = format!("# {}\n\n", title);

    if items.is_empty() {
        out.push_str("_No ingredients._\n");
    }

    for item in items {
        let name = escape_markdown(&item.ingredient_name);
        let quantity = format_quantity(item.quantity, &item.unit);
        let meals = item
            .meal_names
            .iter()
            .map(|meal| escape_markdown(meal))
            .collect::<Vec<_>>()
            .join(", ");
        if item.checked {
            out.push_str(&format!(
                "- [x] ~~{}~~ {} _(For: {})_\n",
                name, quantity, meals
            ));
        } else {
            out.push_str(&format!(
                "- [ ] **{}** {} _(For: {})_\n",
                name, quantity, meals
            ));
        }
    }

    out.push_str(&format!(
        "\n_{} items, generated {}_\n",
        items.len(),
        generated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    out
}
