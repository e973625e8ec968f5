//! Resource OpenAPI - Swagger 2.0 documents from annotated Rust resource types.
//!
//! A resource is a struct marked `#[api("/base")]` whose `impl` block holds handler methods.
//! Handlers carry a verb (`#[get]`, `#[post]`, ...), an optional `#[path("...")]` and an
//! `#[api_operation("summary")]`. A method returning another resource type is a
//! sub-resource locator: its path, media types, tags and parameters are inherited by every
//! operation of the returned resource.
//!
//! # Supported Conventions
//!
//! - **Attributes**: parameters declared with `#[path_param]`, `#[query_param]`,
//!   `#[header_param]`, `#[form_param]`, `#[form_data_param]` and `#[bean_param]`
//! - **Extractors**: actix-web / axum style `Path<T>`, `Query<T>`, `Form<T>` and `Json<T>`
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files
//! 2. [`parser`] - Parses Rust source files into syntax trees
//! 3. [`detector`] - Picks the parameter convention from `use` statements
//! 4. [`reader`] - Reads resource, method and argument metadata from the syntax trees
//! 5. [`type_resolver`] / [`schema_generator`] - Turn Rust types into Swagger models
//! 6. [`extension`] - The chain of parameter extractors
//! 7. [`path_template`] / [`operation`] - Compose paths and build single operations
//! 8. [`walker`] - Traverses resources and sub-resources into a [`document::SwaggerDocument`]
//! 9. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use resource_openapi::{
//!     extension::Convention,
//!     parser::AstParser,
//!     reader::source::SourceMetadataReader,
//!     scanner::FileScanner,
//!     schema_generator::SchemaGenerator,
//!     serializer::serialize_yaml,
//!     type_resolver::TypeResolver,
//!     walker::{root_resources, ResourceWalker},
//! };
//! use std::path::PathBuf;
//!
//! let scan_result = FileScanner::new(PathBuf::from("./pet-store")).scan().unwrap();
//! let parsed_files: Vec<_> = AstParser::parse_files(&scan_result.rust_files)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .collect();
//!
//! let reader = SourceMetadataReader::new(&parsed_files);
//! let converter = SchemaGenerator::new(TypeResolver::new(&parsed_files));
//! let mut walker = ResourceWalker::new(&reader, Box::new(converter), Convention::Attributes);
//! walker.read_all(&root_resources(&reader));
//!
//! println!("{}", serialize_yaml(walker.document()).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod scanner;
pub mod parser;
pub mod detector;
pub mod reader;
pub mod extension;
pub mod path_template;
pub mod type_resolver;
pub mod schema_generator;
pub mod operation;
pub mod walker;
pub mod document;
pub mod serializer;
pub mod error;
