//! Grid expansion
//!
//! Materializes the Cartesian product of all grid parameters: one document
//! per combination, each paired with a deterministic, collision-safe
//! filename. Writing the documents is the caller's job.

mod filename;

pub use filename::{
    diff_tokens, make_config_name, sanitize_for_filename, shorten_param_name,
    truncate_to_bytes, value_token,
};

use std::collections::HashSet;

use indexmap::IndexMap;
use toml_edit::{DocumentMut, Item, Value};

use crate::patch::{get_nested_value, set_nested_value, GridParams};

/// Expand a merged document over its grid parameters.
///
/// With an empty grid this is a passthrough producing `{base_stem}.toml`.
/// Otherwise combinations are enumerated in grid-table order with the first
/// parameter outermost, so repeated runs over identical inputs yield an
/// identical sequence. Filenames are unique within the returned set: a
/// repeated rendered name gets the content-hash suffix, then an index.
///
/// Memory and time scale with the product of all candidate list lengths;
/// the full output set is built before anything is written.
///
/// A parameter with an empty candidate list makes the product empty, so
/// no documents are produced. [`apply_patch`](crate::apply_patch) and
/// [`extract_grids`](crate::extract_grids) never emit such a table.
pub fn expand(
    merged: &DocumentMut,
    grid: &GridParams,
    base_stem: &str,
    short_names: bool,
) -> Vec<(String, DocumentMut)> {
    if grid.is_empty() {
        return vec![(format!("{base_stem}.toml"), merged.clone())];
    }
    if grid.values().any(|candidates| candidates.is_empty()) {
        return Vec::new();
    }

    // Default slots in the merged document, used for diff-based naming.
    let base_values: IndexMap<String, Option<Value>> = grid
        .keys()
        .map(|path| {
            let value = get_nested_value(merged, path)
                .and_then(Item::as_value)
                .cloned();
            (path.clone(), value)
        })
        .collect();

    let paths: Vec<&str> = grid.keys().map(String::as_str).collect();
    let lists: Vec<&[Value]> = grid.values().map(Vec::as_slice).collect();

    let mut outputs = Vec::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut indices = vec![0usize; lists.len()];

    'combinations: loop {
        let params: Vec<(&str, &Value)> = (0..paths.len())
            .map(|i| (paths[i], &lists[i][indices[i]]))
            .collect();

        let mut doc = merged.clone();
        for (path, value) in &params {
            set_nested_value(&mut doc, path, (*value).clone());
        }

        let name = unique_name(&params, base_stem, &base_values, short_names, &used);
        used.insert(name.clone());
        outputs.push((name, doc));

        // Advance the odometer; the last parameter varies fastest.
        let mut position = indices.len();
        loop {
            if position == 0 {
                break 'combinations;
            }
            position -= 1;
            indices[position] += 1;
            if indices[position] < lists[position].len() {
                break;
            }
            indices[position] = 0;
        }
    }

    outputs
}

/// Pick a filename not yet used in this run.
///
/// Distinct combinations can render identically after sanitization, so the
/// plain name is followed by a hash-suffixed one, then indexed fallbacks.
fn unique_name(
    params: &[(&str, &Value)],
    base_stem: &str,
    base_values: &IndexMap<String, Option<Value>>,
    short_names: bool,
    used: &HashSet<String>,
) -> String {
    let plain = filename::config_name(params, base_stem, base_values, short_names, false);
    if !used.contains(&plain) {
        return plain;
    }

    let hashed = filename::config_name(params, base_stem, base_values, short_names, true);
    if !used.contains(&hashed) {
        return hashed;
    }

    let stem = hashed.strip_suffix(".toml").unwrap_or(&hashed);
    let mut index = 2;
    loop {
        let candidate = format!("{stem}_{index}.toml");
        if !used.contains(&candidate) {
            return candidate;
        }
        index += 1;
    }
}
