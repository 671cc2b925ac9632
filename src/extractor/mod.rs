//! Endpoint extraction from decorated controller sources.
//!
//! The [`EndpointExtractor`] turns the declarations exposed by a
//! [`DeclarationSource`] into [`EndpointRecord`]s: it composes paths, assigns tags,
//! collects parameters, builds request body schemas, resolves the response table against
//! the error and success symbol tables, and fills in summary and description.
//!
//! # Example
//!
//! ```no_run
//! use openapi_from_controllers::extractor::EndpointExtractor;
//! use std::path::Path;
//!
//! let mut extractor = EndpointExtractor::new();
//! let collection = extractor.parse_directory(Path::new("src"), None, None).unwrap();
//! println!("Found {} endpoints", collection.endpoints.len());
//! ```

pub mod parameters;
pub mod paths;
pub mod request_body;
pub mod responses;

use crate::annotation_args::{is_object_literal, keyed_string, strip_braces_and_quotes};
use crate::collection::CollectionBuilder;
use crate::declarations::{find_annotation, MethodDecl};
use crate::error::{Error, Result};
use crate::inspector::syntax::strip_doc_comment;
use crate::inspector::{DeclarationSource, TypeScriptInspector};
use crate::model::{EndpointRecord, ParsedSwagger, RouteGroup, Tag};
use crate::parser::{AstParser, ParsedFile};
use crate::scanner::FileScanner;
use crate::symbol_table::{SymbolTableLoader, SymbolTables};
use log::{debug, info, warn};
use std::path::Path;

/// Default file name suffix of controller source units
pub const DEFAULT_FILE_SUFFIX: &str = ".controller.ts";
/// Collection title used in directory mode when none is given
pub const DEFAULT_TITLE: &str = "API";
/// Collection version used when none is given
pub const DEFAULT_VERSION: &str = "1.0.0";
/// Tag given to endpoints of a route group without one
pub const DEFAULT_TAG: &str = "default";

const SUMMARY_ANNOTATIONS: &[&str] = &["ApiOperation", "ApiSummary"];

/// Options controlling which files an extraction run considers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorOptions {
    /// Only files whose name ends with this suffix are scanned in directory mode
    pub file_suffix: String,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self {
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
        }
    }
}

/// Builds endpoint records for every HTTP-verb method of every route group.
///
/// The symbol tables are owned by the extractor: they are loaded lazily from the
/// directory of the first unit that has them nearby and reused for the rest of the run.
pub struct EndpointExtractor {
    source: Box<dyn DeclarationSource>,
    symbols: Option<SymbolTables>,
    options: ExtractorOptions,
}

impl EndpointExtractor {
    /// Creates an extractor backed by the TypeScript inspector with default options
    pub fn new() -> Self {
        Self::with_options(ExtractorOptions::default())
    }

    pub fn with_options(options: ExtractorOptions) -> Self {
        Self::with_source(Box::new(TypeScriptInspector::new()), options)
    }

    /// Creates an extractor reading declarations from a custom source
    pub fn with_source(source: Box<dyn DeclarationSource>, options: ExtractorOptions) -> Self {
        Self {
            source,
            symbols: None,
            options,
        }
    }

    /// Symbol tables loaded so far, if any
    pub fn symbols(&self) -> Option<&SymbolTables> {
        self.symbols.as_ref()
    }

    pub fn options(&self) -> &ExtractorOptions {
        &self.options
    }

    /// Parses a single file or every matching file below a directory
    pub fn parse_path(
        &mut self,
        path: &Path,
        title: Option<&str>,
        version: Option<&str>,
    ) -> Result<ParsedSwagger> {
        if path.is_dir() {
            self.parse_directory(path, title, version)
        } else {
            self.parse_file(path, title, version)
        }
    }

    /// Parses one source unit.
    ///
    /// The title defaults to the file name, the version to `1.0.0`, and the description is
    /// the documentation block attached to the unit's first statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn parse_file(
        &mut self,
        path: &Path,
        title: Option<&str>,
        version: Option<&str>,
    ) -> Result<ParsedSwagger> {
        info!("Parsing controller file: {}", path.display());
        let unit = AstParser::parse_file(path)?;

        let title = match title {
            Some(title) => title.to_string(),
            None => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        };
        let description = self.source.unit_description(&unit);

        let (endpoints, tags) = self.extract_unit(&unit);
        info!("Extracted {} endpoints from {}", endpoints.len(), path.display());

        let mut builder = CollectionBuilder::new(title, version.unwrap_or(DEFAULT_VERSION))
            .with_description(description);
        builder.add_unit(endpoints, tags);
        Ok(builder.build())
    }

    /// Parses every matching file below `dir`.
    ///
    /// All files are parsed before any extraction happens, so one unparseable unit fails
    /// the run without partial output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoFilesFound`] when no file matches the configured suffix, and
    /// propagates scan and parse failures.
    pub fn parse_directory(
        &mut self,
        dir: &Path,
        title: Option<&str>,
        version: Option<&str>,
    ) -> Result<ParsedSwagger> {
        info!("Scanning directory: {}", dir.display());
        let scan = FileScanner::new(dir.to_path_buf(), self.options.file_suffix.clone()).scan()?;
        for warning in &scan.warnings {
            warn!("{}", warning);
        }

        if scan.source_files.is_empty() {
            return Err(Error::NoFilesFound {
                dir: dir.to_path_buf(),
                suffix: self.options.file_suffix.clone(),
            });
        }
        info!("Found {} controller files", scan.source_files.len());

        let units = AstParser::parse_files(&scan.source_files)?;

        let mut builder = CollectionBuilder::new(
            title.unwrap_or(DEFAULT_TITLE),
            version.unwrap_or(DEFAULT_VERSION),
        );
        for unit in &units {
            let (endpoints, tags) = self.extract_unit(unit);
            debug!("{}: {} endpoints", unit.path.display(), endpoints.len());
            builder.add_unit(endpoints, tags);
        }

        let collection = builder.build();
        info!(
            "Extracted {} endpoints with {} tags",
            collection.endpoints.len(),
            collection.tags.len()
        );
        Ok(collection)
    }

    /// Endpoints and route group tags of one parsed unit
    pub fn extract_unit(&mut self, unit: &ParsedFile) -> (Vec<EndpointRecord>, Vec<Tag>) {
        if let Some(dir) = unit.path.parent() {
            self.ensure_symbols(dir);
        }

        let mut endpoints = Vec::new();
        let mut tags: Vec<Tag> = Vec::new();

        for controller in self.source.route_groups(unit) {
            let tag = paths::controller_tag(controller.name.as_deref(), &controller.base_path);
            let group = RouteGroup::new(controller.base_path, tag);

            if let Some(name) = &group.tag {
                if !tags.iter().any(|t| &t.name == name) {
                    tags.push(Tag {
                        name: name.clone(),
                        description: None,
                    });
                }
            }

            for method in &controller.methods {
                endpoints.push(self.build_endpoint(&group, method));
            }
        }

        (endpoints, tags)
    }

    /// Loads the symbol tables near `dir` unless an earlier load already found entries
    fn ensure_symbols(&mut self, dir: &Path) {
        if self.symbols.is_some() {
            return;
        }
        let tables = SymbolTableLoader::load(dir);
        if !tables.is_empty() {
            self.symbols = Some(tables);
        }
    }

    fn build_endpoint(&self, group: &RouteGroup, method: &MethodDecl) -> EndpointRecord {
        let path = paths::to_placeholder_syntax(&paths::join_paths(
            &group.base_path,
            &method.route_path,
        ));
        debug!("Building endpoint {} {}", method.http_method.as_str(), path);

        let parameters = parameters::extract_parameters(method, &path);
        let request_body = request_body::extract_request_body(method);
        let responses = responses::extract_responses(&method.annotations, self.symbols.as_ref());

        let tag = group.tag.clone().unwrap_or_else(|| DEFAULT_TAG.to_string());

        EndpointRecord {
            path,
            http_method: method.http_method,
            tags: vec![tag],
            summary: method_summary(method),
            description: method_description(method),
            parameters,
            request_body,
            responses,
            operation_id: method.name.clone(),
        }
    }
}

impl Default for EndpointExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// `summary:` of the operation annotation, or its whole argument text without braces and quotes
fn method_summary(method: &MethodDecl) -> String {
    let Some(annotation) = find_annotation(&method.annotations, SUMMARY_ANNOTATIONS) else {
        return String::new();
    };

    let summary = annotation
        .first_argument()
        .filter(|arg| is_object_literal(arg))
        .and_then(|arg| keyed_string(arg, "summary"));

    summary.unwrap_or_else(|| strip_braces_and_quotes(&annotation.argument_text()))
}

/// Documentation block of the method, else `description:` of the operation annotation
fn method_description(method: &MethodDecl) -> String {
    if let Some(doc) = method.doc_comment.as_deref() {
        let stripped = strip_doc_comment(doc);
        if !stripped.is_empty() {
            return stripped;
        }
    }

    find_annotation(&method.annotations, SUMMARY_ANNOTATIONS)
        .and_then(|a| a.first_argument())
        .filter(|arg| is_object_literal(arg))
        .and_then(|arg| keyed_string(arg, "description"))
        .unwrap_or_default()
}
