use crate::extension::Convention;
use crate::parser::ParsedFile;
use log::debug;
use std::collections::BTreeSet;
use syn::{Item, UseTree};

/// Extractor-based web frameworks recognized by their crate name in `use` statements.
const EXTRACTOR_FRAMEWORKS: &[&str] = &["actix_web", "axum"];

/// Convention detector for projects that do not say how their parameters are declared.
///
/// Resources importing an extractor-based framework (`use axum::...`,
/// `use actix_web::...`) are read with [`Convention::Extractors`]; anything else with
/// [`Convention::Attributes`].
pub struct ConventionDetector;

/// Result of convention detection.
pub struct DetectionResult {
    /// Framework crates found in `use` statements
    pub frameworks: BTreeSet<String>,
    /// The convention to read the project with
    pub convention: Convention,
}

impl ConventionDetector {
    /// Detects the parameter convention of the provided parsed files.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use resource_openapi::detector::ConventionDetector;
    /// use resource_openapi::parser::AstParser;
    /// use std::path::Path;
    ///
    /// let parsed = AstParser::parse_file(Path::new("src/main.rs")).unwrap();
    /// let result = ConventionDetector::detect(&[parsed]);
    /// println!("Using the {} convention", result.convention);
    /// ```
    pub fn detect(parsed_files: &[ParsedFile]) -> DetectionResult {
        debug!("Detecting convention in {} files", parsed_files.len());

        let mut frameworks = BTreeSet::new();
        for parsed_file in parsed_files {
            for item in &parsed_file.syntax_tree.items {
                if let Item::Use(use_item) = item {
                    Self::check_use_tree(&use_item.tree, &mut frameworks);
                }
            }
        }

        let convention = if frameworks.is_empty() {
            Convention::Attributes
        } else {
            Convention::Extractors
        };
        debug!("Detected frameworks: {:?}, convention: {}", frameworks, convention);

        DetectionResult {
            frameworks,
            convention,
        }
    }

    /// Recursively check use tree for framework imports
    fn check_use_tree(tree: &UseTree, detected: &mut BTreeSet<String>) {
        let ident = match tree {
            UseTree::Path(path) => {
                Self::check_use_tree(&path.tree, detected);
                &path.ident
            }
            UseTree::Group(group) => {
                for item in &group.items {
                    Self::check_use_tree(item, detected);
                }
                return;
            }
            UseTree::Rename(rename) => &rename.ident,
            UseTree::Name(name) => &name.ident,
            UseTree::Glob(_) => return,
        };

        let ident = ident.to_string();
        if EXTRACTOR_FRAMEWORKS.contains(&ident.as_str()) {
            detected.insert(ident);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::AstParser;

    fn detect(sources: &[&str]) -> DetectionResult {
        let parsed: Vec<ParsedFile> = sources
            .iter()
            .enumerate()
            .map(|(idx, source)| AstParser::parse_source(format!("file{}.rs", idx), source).unwrap())
            .collect();
        ConventionDetector::detect(&parsed)
    }

    #[test]
    fn test_detect_axum() {
        let result = detect(&["use axum::{extract::Path, Json};"]);
        assert_eq!(result.convention, Convention::Extractors);
        assert!(result.frameworks.contains("axum"));
    }

    #[test]
    fn test_detect_actix_web() {
        let result = detect(&["use actix_web::web;"]);
        assert_eq!(result.convention, Convention::Extractors);
        assert!(result.frameworks.contains("actix_web"));
    }

    #[test]
    fn test_attribute_resources_without_framework() {
        let result = detect(&[
            "use serde::Serialize;\n#[api(\"/pets\")] pub struct PetResource;",
            "use std::collections::HashMap;",
        ]);
        assert_eq!(result.convention, Convention::Attributes);
        assert!(result.frameworks.is_empty());
    }

    #[test]
    fn test_detect_with_grouped_and_renamed_imports() {
        let result = detect(&["use {std::fmt, actix_web as web};"]);
        assert_eq!(result.convention, Convention::Extractors);
    }

    #[test]
    fn test_detect_across_files() {
        let result = detect(&["use axum::Router;", "use actix_web::App;"]);
        let frameworks: Vec<_> = result.frameworks.iter().cloned().collect();
        assert_eq!(frameworks, vec!["actix_web", "axum"]);
    }

    #[test]
    fn test_glob_imports_are_ignored() {
        let result = detect(&["use std::*;"]);
        assert_eq!(result.convention, Convention::Attributes);
    }

    #[test]
    fn test_detect_empty_file_list() {
        let result = detect(&[]);
        assert_eq!(result.convention, Convention::Attributes);
    }
}
