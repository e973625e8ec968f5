use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Parses Rust sources into `syn` syntax trees for the metadata reader and the type
/// resolver.
///
/// # Example
///
/// ```no_run
/// use resource_openapi::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/resources.rs")).unwrap();
/// println!("Parsed {} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A parsed Rust file.
#[derive(Debug)]
pub struct ParsedFile {
    /// Where the source came from; used in diagnostics only
    pub path: PathBuf,
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Reads and parses one file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid Rust.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Self::parse_source(path, &content)
    }

    /// Parses Rust source text that did not come from disk.
    ///
    /// `path` is only recorded for diagnostics.
    pub fn parse_source(path: impl AsRef<Path>, content: &str) -> Result<ParsedFile> {
        let path = path.as_ref();
        let syntax_tree = syn::parse_file(content)
            .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses every file, keeping one result per path so a broken file does not stop the
    /// others from being documented.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).inspect_err(|e| {
                    warn!("Failed to parse {}: {:#}", path.display(), e);
                })
            })
            .collect();

        let failures = results.iter().filter(|r| r.is_err()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            results.len() - failures,
            failures
        );

        results
    }
}
