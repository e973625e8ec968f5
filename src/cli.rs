use crate::detector::ConventionDetector;
use crate::document::SwaggerDocument;
use crate::error::Error;
use crate::extension::Convention;
use crate::parser::{AstParser, ParsedFile};
use crate::reader::source::SourceMetadataReader;
use crate::reader::MetadataReader;
use crate::scanner::FileScanner;
use crate::schema_generator::SchemaGenerator;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::type_resolver::TypeResolver;
use crate::walker::{root_resources, ResourceWalker};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Generate a Swagger 2.0 document from annotated Rust resource types
#[derive(Parser, Debug)]
#[command(name = "resource-openapi")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// How parameters are declared (if not specified, auto-detect)
    #[arg(short = 'c', long = "convention", value_enum)]
    pub convention: Option<Convention>,

    /// Root resource to read; repeat for several. Defaults to every #[api] resource with a path
    #[arg(short = 'r', long = "resource", value_name = "TYPE")]
    pub resources: Vec<String>,

    /// API title
    #[arg(long = "title", default_value = "Generated API")]
    pub title: String,

    /// API version
    #[arg(long = "api-version", default_value = "1.0.0")]
    pub api_version: String,

    /// API description
    #[arg(long = "description")]
    pub description: Option<String>,

    /// Host serving the API
    #[arg(long = "host")]
    pub host: Option<String>,

    /// Base path of the API
    #[arg(long = "base-path", value_name = "PATH")]
    pub base_path: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }
    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }
    match args.convention {
        Some(convention) => info!("Convention: {}", convention),
        None => info!("Convention: auto-detect"),
    }

    Ok(args)
}

/// Scan, parse and walk the project, returning the assembled document.
pub fn generate(args: &CliArgs) -> Result<SwaggerDocument> {
    info!("Scanning project directory...");
    let scan_result = FileScanner::new(args.project_path.clone()).scan()?;
    info!("Found {} Rust files", scan_result.rust_files.len());
    if scan_result.rust_files.is_empty() {
        anyhow::bail!("No Rust files found in the project directory");
    }

    info!("Parsing Rust files...");
    let parsed_files: Vec<ParsedFile> = AstParser::parse_files(&scan_result.rust_files)
        .into_iter()
        .filter_map(|result| match result {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file due to parse error: {:#}", e);
                None
            }
        })
        .collect();
    info!("Successfully parsed {} files", parsed_files.len());
    if parsed_files.is_empty() {
        anyhow::bail!("No files could be parsed successfully");
    }

    let convention = match args.convention {
        Some(convention) => convention,
        None => {
            let detection = ConventionDetector::detect(&parsed_files);
            info!(
                "Detected the {} convention (frameworks: {:?})",
                detection.convention, detection.frameworks
            );
            detection.convention
        }
    };

    let reader = SourceMetadataReader::new(&parsed_files);
    let roots = if args.resources.is_empty() {
        root_resources(&reader)
    } else {
        args.resources
            .iter()
            .filter(|name| {
                let known = reader.resource(name).is_some();
                if !known {
                    warn!("Unknown resource {}, skipping", name);
                }
                known
            })
            .cloned()
            .collect()
    };
    if roots.is_empty() {
        return Err(Error::NoResourcesFound.into());
    }
    info!("Reading {} root resources: {:?}", roots.len(), roots);

    let document = SwaggerDocument::new()
        .with_info(
            args.title.clone(),
            args.api_version.clone(),
            args.description.clone(),
        )
        .with_host(args.host.clone(), args.base_path.clone());
    let converter = SchemaGenerator::new(TypeResolver::new(&parsed_files));
    let mut walker =
        ResourceWalker::new(&reader, Box::new(converter), convention).with_document(document);
    walker.read_all(&roots);

    Ok(walker.into_document())
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting Swagger document generation...");

    let document = generate(&args)?;

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Wrote Swagger document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("  - Paths: {}", document.paths.len());
    info!("  - Operations: {}", document.operation_count());
    info!("  - Definitions: {}", document.definitions.len());
    info!("  - Tags: {}", document.tags.len());

    Ok(())
}
