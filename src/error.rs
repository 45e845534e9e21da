//! Error types for patching and expansion

use std::path::PathBuf;

/// Errors raised while merging patches or expanding grids
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    /// A grid-tagged key whose value is not a non-empty array
    #[error("{path} must be a non-empty array")]
    InvalidGridValue { path: String },

    /// An input path that does not exist
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Input text that is not valid TOML
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml_edit::TomlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
