//! Input handling for file reading and stdin support.

use anyhow::{Context, Result};
use mcql_core::TableMetadata;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// A named SQL source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

/// Read SQL input from files or stdin.
///
/// If no files are provided, reads from stdin.
pub fn read_input(files: &[PathBuf]) -> Result<Vec<SourceFile>> {
    if files.is_empty() {
        Ok(vec![read_from_stdin()?])
    } else {
        read_from_files(files)
    }
}

/// Read a single source, from `path` or from stdin.
pub fn read_single(path: Option<&Path>) -> Result<SourceFile> {
    match path {
        Some(path) => read_file(path),
        None => read_from_stdin(),
    }
}

/// Load Data Extension metadata from a JSON array of tables.
pub fn load_metadata(path: Option<&Path>) -> Result<Vec<TableMetadata>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read metadata file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid metadata JSON in {}", path.display()))
}

/// Read SQL from stdin
fn read_from_stdin() -> Result<SourceFile> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read from stdin")?;

    Ok(SourceFile {
        name: "<stdin>".to_string(),
        content,
    })
}

/// Read SQL from multiple files
fn read_from_files(files: &[PathBuf]) -> Result<Vec<SourceFile>> {
    files.iter().map(|path| read_file(path)).collect()
}

fn read_file(path: &Path) -> Result<SourceFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    Ok(SourceFile {
        name: path.display().to_string(),
        content,
    })
}
