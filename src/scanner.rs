use crate::error::{Error, Result};
use log::warn;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Directories never descended into
const SKIPPED_DIRS: &[&str] = &["node_modules", "dist"];

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks through a directory to find every source unit whose
/// file name ends with the configured suffix (`.controller.ts` by default). It skips hidden
/// directories (those starting with `.`) as well as `node_modules` and `dist`.
///
/// # Example
///
/// ```no_run
/// use openapi_from_controllers::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./src"), ".controller.ts");
/// let result = scanner.scan().unwrap();
/// println!("Found {} controller files", result.source_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    suffix: String,
}

/// Result of directory scanning operation.
///
/// Contains the list of discovered files and any warnings encountered during scanning.
pub struct ScanResult {
    /// Matching files in sorted order
    pub source_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified root directory and file name suffix.
    pub fn new(root_path: PathBuf, suffix: impl Into<String>) -> Self {
        Self {
            root_path,
            suffix: suffix.into(),
        }
    }

    /// Scans the directory tree and collects all matching files.
    ///
    /// If any directories or files cannot be accessed, warnings are logged and added to
    /// the result, but scanning continues. Files come back sorted so that repeated runs
    /// aggregate endpoints and tags in the same order.
    ///
    /// # Errors
    ///
    /// Returns an error if the root path is not an accessible directory.
    pub fn scan(&self) -> Result<ScanResult> {
        let metadata =
            std::fs::metadata(&self.root_path).map_err(|e| Error::io(&self.root_path, e))?;
        if !metadata.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "{} is not a directory",
                self.root_path.display()
            )));
        }

        let mut source_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                if !e.file_type().is_dir() {
                    return true;
                }
                !file_name.starts_with('.')
                    && !SKIPPED_DIRS.iter().any(|skipped| *skipped == file_name)
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    let matches_suffix = path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .map(|name| name.ends_with(&self.suffix))
                        .unwrap_or(false);

                    if entry.file_type().is_file() && matches_suffix {
                        source_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    // Record warning for inaccessible directories/files
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        source_files.sort();

        Ok(ScanResult {
            source_files,
            warnings,
        })
    }
}
