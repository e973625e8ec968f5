use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories that never hold resource sources.
const SKIPPED_DIRECTORIES: &[&str] = &["target"];

/// Collects the Rust sources of a project that declares resources.
///
/// Build output (`target`) and hidden directories are skipped. Files come back sorted by
/// path so that documents built from the same tree are identical between runs.
///
/// # Example
///
/// ```no_run
/// use resource_openapi::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./pet-store"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Files found by a scan.
pub struct ScanResult {
    /// Sorted paths of every discovered `.rs` file
    pub rust_files: Vec<PathBuf>,
    /// Entries that could not be read; the scan continues past them
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Walks the tree below the root path.
    ///
    /// # Errors
    ///
    /// Fails when the root itself is missing or is not a directory. Unreadable entries
    /// below it are reported as warnings instead.
    pub fn scan(&self) -> Result<ScanResult> {
        let metadata = std::fs::metadata(&self.root_path)
            .with_context(|| format!("Cannot read project directory {}", self.root_path.display()))?;
        if !metadata.is_dir() {
            anyhow::bail!("Not a directory: {}", self.root_path.display());
        }

        let mut rust_files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry));
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_rust_source(entry.path()) => {
                    rust_files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        rust_files.sort();
        debug!("Scanned {}: {} Rust files", self.root_path.display(), rust_files.len());

        Ok(ScanResult {
            rust_files,
            warnings,
        })
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.file_type().is_dir() && SKIPPED_DIRECTORIES.contains(&name.as_ref()))
}

fn is_rust_source(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("rs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn relative(result: &ScanResult, root: &Path) -> Vec<String> {
        result
            .rust_files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_scan_returns_sorted_sources() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/resources")).unwrap();
        fs::write(root.join("src/resources/zoo.rs"), "pub struct Zoo;").unwrap();
        fs::write(root.join("src/resources/animals.rs"), "pub struct Animals;").unwrap();
        fs::write(root.join("src/lib.rs"), "pub mod resources;").unwrap();
        fs::write(root.join("README.md"), "# Zoo").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(
            relative(&result, root),
            vec!["src/lib.rs", "src/resources/animals.rs", "src/resources/zoo.rs"]
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileScanner::new(temp_dir.path().to_path_buf()).scan().unwrap();
        assert!(result.rust_files.is_empty());
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("target/debug")).unwrap();
        fs::write(root.join("target/debug/build.rs"), "fn main() {}").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/hook.rs"), "// hook").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(relative(&result, root), vec!["main.rs"]);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nowhere");
        assert!(FileScanner::new(missing).scan().is_err());
    }

    #[test]
    fn test_scan_file_root_fails() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("main.rs");
        fs::write(&file, "fn main() {}").unwrap();
        assert!(FileScanner::new(file).scan().is_err());
    }
}
