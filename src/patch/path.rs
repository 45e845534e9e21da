//! Dotted-path access into TOML documents
//!
//! Paths address nested keys as `model.dropout`. Reads walk table-like
//! items (standard and inline tables); writes create intermediate tables
//! as needed.

use toml_edit::{DocumentMut, Item, Table, TableLike, Value};

/// Look up the item at a dot-separated path, or `None` if any component
/// is missing or a non-table item is traversed.
pub fn get_nested_value<'a>(doc: &'a DocumentMut, path: &str) -> Option<&'a Item> {
    let mut table: &'a dyn TableLike = doc.as_table();
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        let item = table.get(part)?;
        if parts.peek().is_none() {
            return Some(item);
        }
        table = item.as_table_like()?;
    }
    None
}

/// Set the value at a dot-separated path, creating intermediate tables.
///
/// A non-table item occupying an intermediate component is replaced by a
/// table.
pub fn set_nested_value(doc: &mut DocumentMut, path: &str, value: Value) {
    let parts: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return;
    };

    let mut table: &mut dyn TableLike = doc.as_table_mut();
    for part in parents {
        let is_table = table
            .get(part)
            .map_or(false, |item| item.as_table_like().is_some());
        if !is_table {
            table.insert(part, Item::Table(Table::new()));
        }
        table = match table.get_mut(part).and_then(Item::as_table_like_mut) {
            Some(sub) => sub,
            None => return,
        };
    }
    // Replace in place where the key exists so its key decor (leading
    // comments) survives the write.
    if let Some(existing) = table.get_mut(last) {
        *existing = Item::Value(value);
    } else {
        table.insert(last, Item::Value(value));
    }
}
