//! gridpatch CLI
//!
//! Entry point for the `gridpatch` command-line tool.

use clap::{Parser, Subcommand};
use gridpatch::{apply_patch, expand, extract_grids, GridParams, PatchError};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use toml_edit::DocumentMut;

#[derive(Parser)]
#[command(name = "gridpatch")]
#[command(about = "Apply TOML patches with grid-search expansion", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge an overlay into a base config and expand grid parameters
    Patch {
        /// Base TOML config
        base: PathBuf,

        /// Overlay TOML config; keys may carry a grid suffix
        overlay: PathBuf,

        /// Directory to write generated configs into
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Use only the last path component in generated filenames
        #[arg(long)]
        short_names: bool,

        /// Suffix marking a key as a grid value list (repeatable)
        #[arg(long = "grid-tag", default_value = "__grid")]
        grid_tags: Vec<String>,
    },

    /// Expand grid parameters embedded in a single config
    Expand {
        /// TOML config containing grid-suffixed keys
        config: PathBuf,

        /// Directory to write generated configs into
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Use only the last path component in generated filenames
        #[arg(long)]
        short_names: bool,

        /// Suffix marking a key as a grid value list (repeatable)
        #[arg(long = "grid-tag", default_value = "__grid")]
        grid_tags: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Patch {
            base,
            overlay,
            output,
            short_names,
            grid_tags,
        } => run_patch(&base, &overlay, &output, short_names, &grid_tags),
        Commands::Expand {
            config,
            output,
            short_names,
            grid_tags,
        } => run_expand(&config, &output, short_names, &grid_tags),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_patch(
    base: &Path,
    overlay: &Path,
    output: &Path,
    short_names: bool,
    grid_tags: &[String],
) -> Result<(), PatchError> {
    let base_doc = read_document(base)?;
    let overlay_doc = read_document(overlay)?;
    let (merged, grid) = apply_patch(&base_doc, &overlay_doc, grid_tags)?;
    write_outputs(&merged, &grid, base, output, short_names)
}

fn run_expand(
    config: &Path,
    output: &Path,
    short_names: bool,
    grid_tags: &[String],
) -> Result<(), PatchError> {
    let config_doc = read_document(config)?;
    let (merged, grid) = extract_grids(&config_doc, grid_tags)?;
    write_outputs(&merged, &grid, config, output, short_names)
}

fn read_document(path: &Path) -> Result<DocumentMut, PatchError> {
    if !path.exists() {
        return Err(PatchError::MissingInput(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path)?;
    Ok(contents.parse::<DocumentMut>()?)
}

/// Expand the merged document fully in memory, then write one file per
/// combination and print the resulting names as a brace list.
fn write_outputs(
    merged: &DocumentMut,
    grid: &GridParams,
    input: &Path,
    output: &Path,
    short_names: bool,
) -> Result<(), PatchError> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());

    let outputs = expand(merged, grid, &stem, short_names);

    fs::create_dir_all(output)?;
    let mut names = Vec::with_capacity(outputs.len());
    for (name, doc) in &outputs {
        fs::write(output.join(name), doc.to_string())?;
        names.push(name.as_str());
    }

    println!("{{{}}}", names.join(","));
    Ok(())
}
