//! OpenAPI from Controllers - API documentation from decorated TypeScript controllers.
//!
//! This library reconstructs endpoint descriptions (paths, methods, parameters, request and
//! response schemas) from NestJS-style controller sources through static analysis, without
//! executing the code.
//!
//! # Architecture
//!
//! The library is organized into several modules that work together:
//!
//! 1. [`scanner`] - Recursively scans directories for controller files
//! 2. [`parser`] - Parses TypeScript sources into syntax trees with tree-sitter
//! 3. [`inspector`] - Lowers decorated classes, methods and parameters into [`declarations`]
//! 4. [`type_resolver`] - Resolves parameter types to their structural members
//! 5. [`symbol_table`] - Loads the error-code and success-message tables ([`http_status`] names)
//! 6. [`extractor`] - Builds one endpoint record per HTTP-verb method
//! 7. [`collection`] - Aggregates endpoints and tags across files
//! 8. [`openapi_builder`] / [`schema`] - Converts the collection to OpenAPI 3.0
//! 9. [`serializer`] - Serializes the output to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_controllers::{
//!     extractor::EndpointExtractor,
//!     openapi_builder::OpenApiBuilder,
//!     serializer::serialize_yaml,
//! };
//! use std::path::Path;
//!
//! let mut extractor = EndpointExtractor::new();
//! let collection = extractor
//!     .parse_directory(Path::new("./src"), Some("Users API"), None)
//!     .unwrap();
//!
//! let document = OpenApiBuilder::from_collection(&collection).build();
//! println!("{}", serialize_yaml(&document).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod annotation_args;
pub mod cli;
pub mod collection;
pub mod declarations;
pub mod error;
pub mod extractor;
pub mod http_status;
pub mod inspector;
pub mod model;
pub mod openapi_builder;
pub mod parser;
pub mod scanner;
pub mod schema;
pub mod serializer;
pub mod symbol_table;
pub mod type_resolver;
