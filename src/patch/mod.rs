//! Patch application and grid extraction
//!
//! Merges an overlay document into a base document, diverting keys that
//! carry a grid suffix (e.g. `dropout__grid`) into a side table of grid
//! parameters instead of writing them through.

mod merge;
mod path;

pub use merge::{apply_patch, extract_grids, GridParams};
pub use path::{get_nested_value, set_nested_value};
