use crate::extractor::{EndpointExtractor, ExtractorOptions, DEFAULT_FILE_SUFFIX};
use crate::openapi_builder::OpenApiBuilder;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use serde::Serialize;
use std::path::PathBuf;

/// OpenAPI from Controllers - Generate API documentation from decorated TypeScript controllers
#[derive(Parser, Debug)]
#[command(name = "openapi-from-controllers")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Controller file or directory containing controller files
    #[arg(value_name = "INPUT")]
    pub input_path: PathBuf,

    /// Collection title (defaults to the file name, or "API" for a directory)
    #[arg(short = 't', long = "title")]
    pub title: Option<String>,

    /// Collection version (defaults to 1.0.0)
    #[arg(long = "api-version", value_name = "VERSION")]
    pub api_version: Option<String>,

    /// File name suffix of controller files in directory mode
    #[arg(short = 's', long = "suffix", default_value = DEFAULT_FILE_SUFFIX)]
    pub suffix: String,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Emit an OpenAPI 3.0 document instead of the endpoint collection
    #[arg(long = "openapi")]
    pub openapi: bool,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input_path.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input_path.display());
    }

    if args.suffix.trim().is_empty() {
        anyhow::bail!("File suffix must not be empty");
    }

    info!("Input path: {}", args.input_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting endpoint extraction...");

    let options = ExtractorOptions {
        file_suffix: args.suffix.clone(),
    };
    let mut extractor = EndpointExtractor::with_options(options);
    let collection = extractor
        .parse_path(
            &args.input_path,
            args.title.as_deref(),
            args.api_version.as_deref(),
        )
        .with_context(|| format!("Failed to extract endpoints from {}", args.input_path.display()))?;

    if collection.endpoints.is_empty() {
        log::warn!("No endpoints found in {}", args.input_path.display());
    }

    let content = if args.openapi {
        info!("Building OpenAPI document...");
        let document = OpenApiBuilder::from_collection(&collection).build();
        render(&document, args.output_format)?
    } else {
        render(&collection, args.output_format)?
    };

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Endpoints: {}", collection.endpoints.len());
    info!("  - Tags: {}", collection.tags.len());
    if let Some(symbols) = extractor.symbols() {
        info!(
            "  - Symbols: {} errors, {} success messages",
            symbols.errors.len(),
            symbols.successes.len()
        );
    }

    Ok(())
}

fn render<T: Serialize>(document: &T, format: OutputFormat) -> Result<String> {
    info!("Serializing to {:?} format...", format);
    match format {
        OutputFormat::Yaml => serialize_yaml(document),
        OutputFormat::Json => serialize_json(document),
    }
}
