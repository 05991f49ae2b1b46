//! Checklist operations on an aggregated shopping list

use super::ShoppingListItem;

/// Flip `checked` on the item with `id`; returns false if no item matches
pub fn toggle(items: &mut [ShoppingListItem], id: &str) -> bool {
    match items.iter_mut().find(|item| item.id == id) {
        Some(item) => {
            item.checked = !item.checked;
            true
        }
        None => false,
    }
}

/// The unchecked items, in their original order
pub fn clear_checked(items: &[ShoppingListItem]) -> Vec<ShoppingListItem> {
    items.iter().filter(|item| !item.checked).cloned().collect()
}
