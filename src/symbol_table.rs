//! Loading of the error-code and success-message symbol tables.
//!
//! Both tables live in sibling TypeScript files found by convention near the
//! controllers. They are pattern matched rather than parsed: an error table entry
//! looks like `USER_NOT_FOUND: createError('User not found', 404)`, a success
//! table entry like `USER_CREATED: 'User created'`.

use crate::http_status::status_code_for_name;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// File name of the error definitions table
pub const ERROR_TABLE_FILE: &str = "error-codes.ts";
/// File name of the success message table
pub const SUCCESS_TABLE_FILE: &str = "success-messages.ts";

/// Directories probed for the tables, relative to the source unit, nearest first
const CANDIDATE_DIRS: &[&str] = &[
    ".",
    "constants",
    "..",
    "../constants",
    "../common",
    "../common/constants",
    "../..",
    "../../constants",
    "../../common",
    "../../common/constants",
];

static ERROR_ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"([A-Za-z_$][\w$]*)\s*:\s*(?:new\s+)?[A-Za-z_$][\w$.]*\s*\(\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)"|`([^`]*)`)\s*,\s*(\d+|HttpStatus\s*\.\s*[A-Z_]+)"#,
    )
    .unwrap()
});

static SUCCESS_ENTRY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"([A-Za-z_$][\w$]*)\s*:\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)"|`([^`]*)`)"#,
    )
    .unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEntry {
    pub code: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessEntry {
    pub message: String,
}

/// Error and success definitions keyed by their declared identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTables {
    pub errors: HashMap<String, ErrorEntry>,
    pub successes: HashMap<String, SuccessEntry>,
}

impl SymbolTables {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.successes.is_empty()
    }

    pub fn error(&self, identifier: &str) -> Option<&ErrorEntry> {
        self.errors.get(identifier)
    }

    pub fn success(&self, identifier: &str) -> Option<&SuccessEntry> {
        self.successes.get(identifier)
    }
}

/// Locates and parses the symbol tables.
pub struct SymbolTableLoader;

impl SymbolTableLoader {
    /// Probes the candidate directories around `start_dir` in order.
    ///
    /// Probing stops at the first candidate where either table yields at least one
    /// entry. Unreadable files count as empty; when nothing is found the result is
    /// empty rather than an error.
    pub fn load(start_dir: &Path) -> SymbolTables {
        for candidate in CANDIDATE_DIRS {
            let dir = start_dir.join(candidate);
            let errors = Self::read_table(&dir.join(ERROR_TABLE_FILE))
                .map(|text| Self::parse_error_definitions(&text))
                .unwrap_or_default();
            let successes = Self::read_table(&dir.join(SUCCESS_TABLE_FILE))
                .map(|text| Self::parse_success_definitions(&text))
                .unwrap_or_default();

            if !errors.is_empty() || !successes.is_empty() {
                info!(
                    "Loaded {} error and {} success definitions from {}",
                    errors.len(),
                    successes.len(),
                    dir.display()
                );
                return SymbolTables { errors, successes };
            }
        }

        debug!("No symbol tables found near {}", start_dir.display());
        SymbolTables::default()
    }

    fn read_table(path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(e) => {
                if path.exists() {
                    warn!("Skipping unreadable symbol table {}: {}", path.display(), e);
                }
                None
            }
        }
    }

    /// Matches `IDENT: creator('message', code, ...)` entries.
    ///
    /// The code may also be a symbolic `HttpStatus.NAME`; entries whose code cannot
    /// be resolved are skipped.
    pub fn parse_error_definitions(text: &str) -> HashMap<String, ErrorEntry> {
        let mut entries = HashMap::new();

        for caps in ERROR_ENTRY_RE.captures_iter(text) {
            let identifier = caps[1].to_string();
            let message = Self::captured_message(&caps);
            let raw_code = &caps[5];

            let code = match raw_code.parse::<u32>() {
                Ok(code) => Some(code),
                Err(_) => status_code_for_name(raw_code.rsplit('.').next().unwrap_or("").trim())
                    .map(u32::from),
            };

            match code {
                Some(code) => {
                    entries.insert(identifier, ErrorEntry { code, message });
                }
                None => debug!("Skipping error definition {} with code {}", identifier, raw_code),
            }
        }

        entries
    }

    /// Matches `IDENT: 'message'` entries
    pub fn parse_success_definitions(text: &str) -> HashMap<String, SuccessEntry> {
        SUCCESS_ENTRY_RE
            .captures_iter(text)
            .map(|caps| {
                (
                    caps[1].to_string(),
                    SuccessEntry {
                        message: Self::captured_message(&caps),
                    },
                )
            })
            .collect()
    }

    fn captured_message(caps: &regex::Captures) -> String {
        let raw = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map(|m| m.as_str())
            .unwrap_or("");
        raw.replace("\\'", "'").replace("\\\"", "\"")
    }
}
