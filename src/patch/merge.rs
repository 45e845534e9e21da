//! Patch merge logic
//!
//! Implements the recursive deep merge with:
//! - Grid-tagged keys: diverted into the grid table, default applied
//! - Tables (standard or inline): deep-merge by key
//! - Scalars and arrays: override (overlay wins)

use indexmap::IndexMap;
use toml_edit::{DocumentMut, Item, Table, TableLike, Value};

use crate::error::PatchError;

/// Grid parameters keyed by dotted path, in discovery order.
///
/// Discovery order drives combination order during expansion, so this must
/// stay insertion-ordered.
pub type GridParams = IndexMap<String, Vec<Value>>;

/// Deep-merge `overlay` into a copy of `base`, extracting grid parameters.
///
/// Keys ending in one of `grid_suffixes` are not merged directly: the
/// suffix is stripped, the value (which must be a non-empty array) is
/// recorded in the grid table under the stripped dotted path, and the
/// merged document receives the array's first element at that path.
///
/// Suffix detection takes precedence over table recursion, so a grid key
/// is never treated as a nested table. `base` is never mutated.
pub fn apply_patch(
    base: &DocumentMut,
    overlay: &DocumentMut,
    grid_suffixes: &[String],
) -> Result<(DocumentMut, GridParams), PatchError> {
    let mut merged = base.clone();
    let mut grid = GridParams::new();
    merge_into(
        merged.as_table_mut(),
        overlay.as_table(),
        "",
        grid_suffixes,
        &mut grid,
    )?;
    Ok((merged, grid))
}

/// Extract grid parameters embedded in a single document.
///
/// Same suffix convention as [`apply_patch`], but scanning one complete
/// document: each grid-tagged key is removed from the result and replaced
/// by its stripped key holding the first candidate value.
pub fn extract_grids(
    doc: &DocumentMut,
    grid_suffixes: &[String],
) -> Result<(DocumentMut, GridParams), PatchError> {
    let mut result = doc.clone();
    let mut grid = GridParams::new();
    walk_extract(result.as_table_mut(), "", grid_suffixes, &mut grid)?;
    Ok((result, grid))
}

fn merge_into(
    target: &mut dyn TableLike,
    updates: &dyn TableLike,
    path: &str,
    suffixes: &[String],
    grid: &mut GridParams,
) -> Result<(), PatchError> {
    for (key, item) in updates.iter() {
        if let Some(actual_key) = strip_grid_suffix(key, suffixes) {
            let dotted = join_path(path, actual_key);
            let values = grid_list(item).ok_or_else(|| PatchError::InvalidGridValue {
                path: format!("{dotted}{}", &key[actual_key.len()..]),
            })?;
            set_item(target, actual_key, Item::Value(values[0].clone()));
            grid.insert(dotted, values);
        } else if let Some(sub) = item.as_table_like() {
            let next = join_path(path, key);
            ensure_table(target, key);
            if let Some(dst) = target.get_mut(key).and_then(Item::as_table_like_mut) {
                merge_into(dst, sub, &next, suffixes, grid)?;
            }
        } else {
            set_item(target, key, item.clone());
        }
    }
    Ok(())
}

fn walk_extract(
    table: &mut dyn TableLike,
    path: &str,
    suffixes: &[String],
    grid: &mut GridParams,
) -> Result<(), PatchError> {
    // Keys are collected up front since extraction mutates the table.
    let keys: Vec<String> = table.iter().map(|(key, _)| key.to_owned()).collect();

    for key in keys {
        if let Some(actual_key) = strip_grid_suffix(&key, suffixes) {
            let dotted = join_path(path, actual_key);
            let values = table.get(&key).and_then(grid_list).ok_or_else(|| {
                PatchError::InvalidGridValue {
                    path: format!("{dotted}{}", &key[actual_key.len()..]),
                }
            })?;

            // A comment above the marker key lives in its key decor;
            // carry it over to the stripped key unless that key already
            // exists with decor of its own.
            let marker_prefix = table.key_decor(&key).and_then(|decor| decor.prefix().cloned());
            let existed = table.get(actual_key).is_some();

            table.remove(&key);
            set_item(table, actual_key, Item::Value(values[0].clone()));
            if !existed {
                if let (Some(prefix), Some(decor)) =
                    (marker_prefix, table.key_decor_mut(actual_key))
                {
                    decor.set_prefix(prefix);
                }
            }
            grid.insert(dotted, values);
        } else {
            let is_table = table
                .get(&key)
                .map_or(false, |item| item.as_table_like().is_some());
            if is_table {
                let next = join_path(path, &key);
                if let Some(sub) = table.get_mut(&key).and_then(Item::as_table_like_mut) {
                    walk_extract(sub, &next, suffixes, grid)?;
                }
            }
        }
    }
    Ok(())
}

/// Strip the first matching grid suffix from a key, if any.
fn strip_grid_suffix<'a>(key: &'a str, suffixes: &[String]) -> Option<&'a str> {
    suffixes
        .iter()
        .find_map(|suffix| key.strip_suffix(suffix.as_str()))
}

/// Interpret a grid item as a non-empty candidate list.
fn grid_list(item: &Item) -> Option<Vec<Value>> {
    let array = item.as_array()?;
    if array.is_empty() {
        return None;
    }
    Some(array.iter().map(detached).collect())
}

/// Clone a value without its surrounding whitespace/comment decor, so it
/// can be re-inserted as a plain scalar.
fn detached(value: &Value) -> Value {
    let mut value = value.clone();
    value.decor_mut().clear();
    value
}

/// Write an item at `key`, replacing in place when the key exists.
///
/// `TableLike::insert` would replace the key entry itself and with it the
/// key decor, which is where leading comments are stored.
fn set_item(target: &mut dyn TableLike, key: &str, item: Item) {
    if let Some(existing) = target.get_mut(key) {
        *existing = item;
    } else {
        target.insert(key, item);
    }
}

fn ensure_table(target: &mut dyn TableLike, key: &str) {
    let is_table = target
        .get(key)
        .map_or(false, |item| item.as_table_like().is_some());
    if !is_table {
        set_item(target, key, Item::Table(Table::new()));
    }
}

fn join_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
