//! OpenAPI from Controllers - Command-line tool for documenting decorated TypeScript controllers.
//!
//! This binary reads one controller file or a directory of controller files, extracts every
//! endpoint declared through routing decorators, and prints the endpoint collection (or an
//! OpenAPI 3.0 document built from it).
//!
//! # Usage
//!
//! ```bash
//! openapi-from-controllers [OPTIONS] <INPUT>
//! ```
//!
//! # Examples
//!
//! Document a single controller:
//! ```bash
//! openapi-from-controllers src/users/users.controller.ts
//! ```
//!
//! Generate an OpenAPI document for a whole project as JSON:
//! ```bash
//! openapi-from-controllers ./src --openapi -f json -o openapi.json
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! openapi-from-controllers ./src -v
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use openapi_from_controllers::cli;

fn main() -> Result<()> {
    // Parse first so the verbose flag can pick the log level
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut logger = env_logger::Builder::from_default_env();
    if args_for_verbose.verbose || std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(log_level);
    }
    logger.init();

    info!("OpenAPI from Controllers starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;

    cli::run(args)?;

    info!("Endpoint extraction completed successfully");

    Ok(())
}
