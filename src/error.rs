use std::path::PathBuf;

/// Result type alias for the extraction pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a whole extraction run.
///
/// Problems confined to a single annotation, symbol lookup or type resolution never
/// surface here; they degrade to documented defaults and are only logged.
#[derive(Debug)]
pub enum Error {
    IoError { path: PathBuf, source: std::io::Error },
    ParseError { file: PathBuf, message: String },
    NoFilesFound { dir: PathBuf, suffix: String },
    InvalidArgument(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError { path, source } => {
                write!(f, "IO error on {}: {}", path.display(), source)
            }
            Error::ParseError { file, message } => {
                write!(f, "Parse error in {}: {}", file.display(), message)
            }
            Error::NoFilesFound { dir, suffix } => {
                write!(f, "No files found in {} matching *{}", dir.display(), suffix)
            }
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl Error {
    /// Wraps an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::IoError {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_files_found_message() {
        let err = Error::NoFilesFound {
            dir: PathBuf::from("/srv/api"),
            suffix: ".controller.ts".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No files found in /srv/api matching *.controller.ts"
        );
    }

    #[test]
    fn test_io_error_exposes_source() {
        let err = Error::io(
            "missing.ts",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("missing.ts"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
