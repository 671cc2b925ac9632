//! Response table extraction.
//!
//! Status codes come from numeric literals or symbolic `HttpStatus.NAME` references.
//! Descriptions are resolved against the loaded symbol tables, so
//! `describeErrors(ErrorCodes.BAD_INPUT, ErrorCodes.CONFLICT)` turns into
//! `"400: Bad input<br><br>409: Conflict<br><br>"`.

use crate::annotation_args::{
    call_expression, is_object_literal, keyed_value, last_segment, reference_segments,
    string_literal,
};
use crate::declarations::Annotation;
use crate::http_status::status_code_for_name;
use crate::model::ResponseSpec;
use crate::symbol_table::SymbolTables;
use log::debug;
use std::collections::BTreeMap;

/// Generic response documentation annotation
pub const RESPONSE_ANNOTATION: &str = "ApiResponse";

/// Fixed-status annotation; documents its positional status as a plain response
pub const HTTP_CODE_ANNOTATION: &str = "HttpCode";

/// Shorthand response annotations and the status each one implies
const SHORTHAND_RESPONSES: &[(&str, u16)] = &[
    ("ApiOkResponse", 200),
    ("ApiCreatedResponse", 201),
    ("ApiNoContentResponse", 204),
    ("ApiBadRequestResponse", 400),
    ("ApiUnauthorizedResponse", 401),
    ("ApiForbiddenResponse", 403),
    ("ApiNotFoundResponse", 404),
    ("ApiConflictResponse", 409),
    ("ApiInternalServerErrorResponse", 500),
];

const ERROR_AGGREGATE_HELPER: &str = "describeErrors";
const SUCCESS_AGGREGATE_HELPER: &str = "describeSuccess";
const SEGMENT_SEPARATOR: &str = "<br><br>";

/// Entries present on every endpoint, added when not declared explicitly
const DEFAULT_RESPONSES: &[(&str, &str)] = &[
    ("401", "Unauthorized"),
    ("500", "Internal Server Error"),
];

/// Resolves status text: a numeric literal or a `HttpStatus.NAME` reference.
///
/// Unknown names resolve to `None` and the response is dropped.
pub fn resolve_status(text: &str) -> Option<u16> {
    let text = text.trim();
    if let Ok(code) = text.parse::<u16>() {
        return Some(code);
    }
    let literal = string_literal(text);
    if let Some(code) = literal.as_deref().and_then(|s| s.trim().parse::<u16>().ok()) {
        return Some(code);
    }
    reference_segments(text).and_then(|segments| {
        segments
            .last()
            .and_then(|name| status_code_for_name(name))
    })
}

/// Resolves a description expression to display text.
///
/// In priority order: a string literal, the error aggregate helper, the success
/// aggregate helper, a direct reference into either table, and finally `"Response"`.
pub fn resolve_description(text: Option<&str>, symbols: Option<&SymbolTables>) -> String {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return "Response".to_string();
    };

    if let Some(literal) = string_literal(text) {
        return literal;
    }

    if let Some((callee, args)) = call_expression(text) {
        match last_segment(&callee) {
            ERROR_AGGREGATE_HELPER => return describe_errors(&args, symbols),
            SUCCESS_AGGREGATE_HELPER => return describe_successes(&args, symbols),
            _ => {}
        }
    }

    if let Some(segments) = reference_segments(text) {
        return direct_reference(&segments, symbols);
    }

    debug!("Unsupported response description expression: {}", text);
    "Response".to_string()
}

fn describe_errors(args: &[String], symbols: Option<&SymbolTables>) -> String {
    if args.is_empty() {
        return "Bad Request".to_string();
    }

    args.iter()
        .map(|arg| {
            let identifier = last_segment(arg);
            match symbols.and_then(|s| s.error(identifier)) {
                Some(entry) => format!("{}: {}{}", entry.code, entry.message, SEGMENT_SEPARATOR),
                None => {
                    debug!("Unresolved error symbol {}", identifier);
                    format!("{}{}", identifier, SEGMENT_SEPARATOR)
                }
            }
        })
        .collect()
}

fn describe_successes(args: &[String], symbols: Option<&SymbolTables>) -> String {
    if args.is_empty() {
        return "Success".to_string();
    }

    args.iter()
        .map(|arg| {
            let identifier = last_segment(arg);
            match symbols.and_then(|s| s.success(identifier)) {
                Some(entry) => format!("{}{}", entry.message, SEGMENT_SEPARATOR),
                None => {
                    debug!("Unresolved success symbol {}", identifier);
                    format!("{}{}", identifier, SEGMENT_SEPARATOR)
                }
            }
        })
        .collect()
}

/// `ErrorCodes.NOT_FOUND` or `ErrorCodes.NOT_FOUND.message`: the nearest segment known
/// to either table wins; an unknown reference keeps its identifier text
fn direct_reference(segments: &[String], symbols: Option<&SymbolTables>) -> String {
    if let Some(symbols) = symbols {
        for segment in segments.iter().rev() {
            if let Some(entry) = symbols.error(segment) {
                return entry.message.clone();
            }
            if let Some(entry) = symbols.success(segment) {
                return entry.message.clone();
            }
        }
    }

    let identifier = segments
        .iter()
        .rev()
        .find(|s| !matches!(s.as_str(), "message" | "description"))
        .or_else(|| segments.last())
        .cloned()
        .unwrap_or_default();
    debug!("Unresolved table reference {}", identifier);
    identifier
}

/// Status and description expressions of one response annotation
fn response_arguments(annotation: &Annotation) -> Option<(Option<String>, Option<String>)> {
    let shorthand = SHORTHAND_RESPONSES
        .iter()
        .find(|(name, _)| *name == annotation.name)
        .map(|(_, code)| *code);

    if annotation.name != RESPONSE_ANNOTATION
        && annotation.name != HTTP_CODE_ANNOTATION
        && shorthand.is_none()
    {
        return None;
    }

    let first = annotation.first_argument();
    let (status, description) = match first {
        Some(arg) if is_object_literal(arg) => {
            (keyed_value(arg, "status"), keyed_value(arg, "description"))
        }
        Some(arg) if shorthand.is_none() => (
            Some(arg.to_string()),
            annotation.arguments.get(1).cloned(),
        ),
        _ => (None, None),
    };

    let status = shorthand.map(|code| code.to_string()).or(status);
    Some((status, description))
}

/// Builds the response table of a method from its annotations.
///
/// Unknown status names drop their response. Unauthorized (401) and internal error
/// (500) entries are always present afterwards.
pub fn extract_responses(
    annotations: &[Annotation],
    symbols: Option<&SymbolTables>,
) -> BTreeMap<String, ResponseSpec> {
    let mut responses = BTreeMap::new();

    for annotation in annotations {
        let Some((status, description)) = response_arguments(annotation) else {
            continue;
        };

        let Some(code) = status.as_deref().and_then(resolve_status) else {
            debug!(
                "Dropping @{} with unresolved status {:?}",
                annotation.name, status
            );
            continue;
        };

        // `@HttpCode` never replaces a documented entry for the same status
        if annotation.name == HTTP_CODE_ANNOTATION && responses.contains_key(&code.to_string()) {
            continue;
        }

        let description = resolve_description(description.as_deref(), symbols);
        responses.insert(code.to_string(), ResponseSpec::new(description));
    }

    for (code, description) in DEFAULT_RESPONSES {
        responses
            .entry(code.to_string())
            .or_insert_with(|| ResponseSpec::new(*description));
    }

    responses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol_table::{ErrorEntry, SuccessEntry};
    use pretty_assertions::assert_eq;

    fn tables() -> SymbolTables {
        let mut tables = SymbolTables::default();
        tables.errors.insert(
            "BAD_INPUT".to_string(),
            ErrorEntry {
                code: 400,
                message: "Bad input".to_string(),
            },
        );
        tables.errors.insert(
            "CONFLICT".to_string(),
            ErrorEntry {
                code: 409,
                message: "Conflict".to_string(),
            },
        );
        tables.successes.insert(
            "USER_CREATED".to_string(),
            SuccessEntry {
                message: "User created".to_string(),
            },
        );
        tables
    }

    fn annotation(name: &str, args: &[&str]) -> Annotation {
        Annotation::new(name, args.iter().map(|a| a.to_string()).collect())
    }

    #[test]
    fn test_resolve_status() {
        assert_eq!(resolve_status("201"), Some(201));
        assert_eq!(resolve_status("HttpStatus.NOT_FOUND"), Some(404));
        assert_eq!(resolve_status("'204'"), Some(204));
        assert_eq!(resolve_status("HttpStatus.I_AM_A_TEAPOT"), None);
        assert_eq!(resolve_status("status()"), None);
    }

    #[test]
    fn test_resolve_description_priority() {
        let tables = tables();
        let symbols = Some(&tables);

        assert_eq!(resolve_description(Some("'Created'"), symbols), "Created");
        assert_eq!(
            resolve_description(
                Some("describeErrors(ErrorCodes.BAD_INPUT, ErrorCodes.CONFLICT)"),
                symbols
            ),
            "400: Bad input<br><br>409: Conflict<br><br>"
        );
        assert_eq!(
            resolve_description(Some("describeErrors(ErrorCodes.MISSING)"), symbols),
            "MISSING<br><br>"
        );
        assert_eq!(resolve_description(Some("describeErrors()"), symbols), "Bad Request");
        assert_eq!(
            resolve_description(Some("describeSuccess(SuccessMessages.USER_CREATED)"), symbols),
            "User created<br><br>"
        );
        assert_eq!(resolve_description(Some("describeSuccess()"), symbols), "Success");
        assert_eq!(
            resolve_description(Some("ErrorCodes.CONFLICT.message"), symbols),
            "Conflict"
        );
        assert_eq!(
            resolve_description(Some("SuccessMessages.USER_CREATED"), symbols),
            "User created"
        );
        assert_eq!(resolve_description(None, symbols), "Response");
        assert_eq!(resolve_description(Some("a + b"), symbols), "Response");
    }

    #[test]
    fn test_resolve_description_without_tables() {
        assert_eq!(
            resolve_description(Some("describeErrors(ErrorCodes.BAD_INPUT)"), None),
            "BAD_INPUT<br><br>"
        );
        assert_eq!(
            resolve_description(Some("ErrorCodes.BAD_INPUT.message"), None),
            "BAD_INPUT"
        );
    }

    #[test]
    fn test_extract_responses_object_form() {
        let responses = extract_responses(
            &[annotation(
                "ApiResponse",
                &["{ status: HttpStatus.NOT_FOUND, description: \"x\" }"],
            )],
            None,
        );

        assert_eq!(responses["404"].description, "x");
        assert_eq!(responses["401"].description, "Unauthorized");
        assert_eq!(responses["500"].description, "Internal Server Error");
        assert_eq!(responses.len(), 3);
    }

    #[test]
    fn test_extract_responses_positional_and_shorthand() {
        let tables = tables();
        let responses = extract_responses(
            &[
                annotation("Get", &["':id'"]),
                annotation("ApiResponse", &["200", "'Found'"]),
                annotation(
                    "ApiBadRequestResponse",
                    &["{ description: describeErrors(ErrorCodes.BAD_INPUT) }"],
                ),
                annotation("ApiUnauthorizedResponse", &["{ description: 'Token expired' }"]),
                annotation("ApiResponse", &["{ status: HttpStatus.I_AM_A_TEAPOT }"]),
            ],
            Some(&tables),
        );

        let keys: Vec<_> = responses.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["200", "400", "401", "500"]);
        assert_eq!(responses["200"].description, "Found");
        assert_eq!(responses["400"].description, "400: Bad input<br><br>");
        assert_eq!(responses["401"].description, "Token expired");
    }

    #[test]
    fn test_extract_responses_defaults_only() {
        let responses = extract_responses(&[], None);
        let keys: Vec<_> = responses.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["401", "500"]);
    }

    #[test]
    fn test_extract_responses_http_code() {
        let responses = extract_responses(
            &[annotation("Post", &["'bulk'"]), annotation("HttpCode", &["204"])],
            None,
        );
        let keys: Vec<_> = responses.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["204", "401", "500"]);
        assert_eq!(responses["204"].description, "Response");

        let symbolic = extract_responses(&[annotation("HttpCode", &["HttpStatus.ACCEPTED"])], None);
        assert_eq!(symbolic["202"].description, "Response");
    }

    #[test]
    fn test_http_code_keeps_documented_description() {
        let responses = extract_responses(
            &[
                annotation("ApiResponse", &["{ status: 204, description: 'Deleted' }"]),
                annotation("HttpCode", &["HttpStatus.NO_CONTENT"]),
            ],
            None,
        );
        assert_eq!(responses["204"].description, "Deleted");

        let reversed = extract_responses(
            &[
                annotation("HttpCode", &["204"]),
                annotation("ApiResponse", &["{ status: 204, description: 'Deleted' }"]),
            ],
            None,
        );
        assert_eq!(reversed["204"].description, "Deleted");
    }
}
