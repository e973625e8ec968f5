//! Resource OpenAPI - command-line tool generating Swagger 2.0 documents.
//!
//! # Usage
//!
//! ```bash
//! resource-openapi [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! resource-openapi ./pet-store -o swagger.yaml
//! ```
//!
//! Generate JSON for selected roots only:
//! ```bash
//! resource-openapi ./pet-store -f json -r PetResource -r StoreResource
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! resource-openapi ./pet-store -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use resource_openapi::cli;

fn main() -> Result<()> {
    // Parse once to read the verbose flag before the logger exists
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("Resource OpenAPI starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Swagger document generation completed successfully");

    Ok(())
}
