use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Parser, Tree};

/// TypeScript source parser.
///
/// The `AstParser` uses tree-sitter with the TypeScript grammar to turn source text into a
/// concrete syntax tree that the declaration inspector can walk.
///
/// # Example
///
/// ```no_run
/// use openapi_from_controllers::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/users/users.controller.ts")).unwrap();
/// println!("Root node: {}", parsed.tree.root_node().kind());
/// ```
pub struct AstParser;

/// A successfully parsed TypeScript file with its syntax tree.
///
/// The source text is kept alongside the tree because tree-sitter nodes only carry byte
/// ranges into it.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The full source text
    pub source: String,
    /// The parsed syntax tree
    pub tree: Tree,
}

impl AstParser {
    /// Reads and parses a single source file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the parser produces no tree at all.
    /// Recoverable syntax errors only produce a warning; tree-sitter keeps the rest of the
    /// tree usable.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let source = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse_source(path, source)
    }

    /// Parses already loaded source text as if it came from `path`
    pub fn parse_source(path: &Path, source: String) -> Result<ParsedFile> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|e| Error::ParseError {
                file: path.to_path_buf(),
                message: format!("Failed to load TypeScript grammar: {}", e),
            })?;

        let tree = parser.parse(&source, None).ok_or_else(|| Error::ParseError {
            file: path.to_path_buf(),
            message: "Parser produced no syntax tree".to_string(),
        })?;

        if tree.root_node().has_error() {
            warn!(
                "Syntax errors in {}; continuing with the recovered tree",
                path.display()
            );
        }

        debug!("Successfully parsed file: {}", path.display());

        Ok(ParsedFile {
            path: path.to_path_buf(),
            source,
            tree,
        })
    }

    /// Parses every file, stopping at the first failure.
    ///
    /// A directory scan produces no partial results, so one unparseable unit fails the
    /// whole batch.
    pub fn parse_files(paths: &[PathBuf]) -> Result<Vec<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let parsed = paths
            .iter()
            .map(|path| Self::parse_file(path))
            .collect::<Result<Vec<_>>>()?;

        debug!("Parsing complete: {} files", parsed.len());
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    #[test]
    fn test_parse_valid_typescript_file() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
            import { Controller, Get } from '@nestjs/common';

            @Controller('users')
            export class UsersController {
              @Get()
              findAll(): string[] {
                return [];
              }
            }
        "#;

        let file_path = create_temp_file(&temp_dir, "users.controller.ts", code);
        let parsed = AstParser::parse_file(&file_path).unwrap();

        assert_eq!(parsed.path, file_path);
        assert_eq!(parsed.tree.root_node().kind(), "program");
        assert!(!parsed.tree.root_node().has_error());
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = AstParser::parse_file(Path::new("/nonexistent/users.controller.ts"));

        let err = result.unwrap_err();
        assert!(matches!(err, Error::IoError { .. }));
        assert!(err.to_string().contains("/nonexistent/users.controller.ts"));
    }

    #[test]
    fn test_parse_recovers_from_syntax_errors() {
        let parsed = AstParser::parse_source(
            Path::new("broken.ts"),
            "export class Broken { method( {".to_string(),
        )
        .unwrap();
        assert!(parsed.tree.root_node().has_error());
    }

    #[test]
    fn test_parse_files_fails_on_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let good = create_temp_file(&temp_dir, "a.controller.ts", "export class A {}");
        let missing = temp_dir.path().join("b.controller.ts");

        let result = AstParser::parse_files(&[good.clone(), missing]);
        assert!(result.is_err());

        let ok = AstParser::parse_files(&[good]).unwrap();
        assert_eq!(ok.len(), 1);
    }

    #[test]
    fn test_parse_files_empty_list() {
        let results = AstParser::parse_files(&[]).unwrap();
        assert!(results.is_empty());
    }
}
