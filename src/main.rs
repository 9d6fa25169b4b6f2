//! apidocx - command-line tool for generating API documentation.
//!
//! Reads the routes of an Axum or Actix-Web project (or a JSON route list), describes
//! each endpoint from its doc comment or an AI provider, and writes Markdown, OpenAPI,
//! Postman and ReDoc artifacts.
//!
//! # Usage
//!
//! ```bash
//! apidocx [OPTIONS] [PROJECT_PATH]
//! ```
//!
//! # Examples
//!
//! Generate every format with the configured output paths:
//! ```bash
//! apidocx ./my-api-project
//! ```
//!
//! Generate a YAML OpenAPI document only, without calling the AI provider:
//! ```bash
//! apidocx ./my-api-project -f openapi -o openapi.yaml --no-ai
//! ```
//!
//! Regenerate on every source change:
//! ```bash
//! apidocx ./my-api-project --watch -v
//! ```

use anyhow::Result;
use apidocx::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // The verbose flag decides the log level, so parse before the logger exists
    // and validate afterwards.
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("apidocx starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("API documentation generation completed successfully");

    Ok(())
}
