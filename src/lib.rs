//! gridpatch - TOML config patching with grid-search expansion
//!
//! Merges an overlay TOML document into a base document, collects keys
//! marked with a grid suffix (default `__grid`) into a parameter table,
//! and expands the Cartesian product of all parameter values into one
//! output document per combination. Comments and key order of untouched
//! parts of the base survive the round trip.

pub mod error;
pub mod expand;
pub mod patch;

pub use error::PatchError;
pub use expand::{expand, make_config_name};
pub use patch::{apply_patch, extract_grids, get_nested_value, set_nested_value, GridParams};
