//! Path composition and tag derivation.

use once_cell::sync::Lazy;
use regex::Regex;

static REPEATED_SLASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/{2,}").unwrap());
static COLON_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([A-Za-z_$][\w$]*)\??").unwrap());
static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}/]+)\}").unwrap());
static CONTROLLER_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\w+?)Controller$").unwrap());

/// Joins a route group base path with a method path fragment.
///
/// One trailing `/` is dropped from the base and the fragment always gets a leading one,
/// so an empty fragment keeps a trailing `/` (`users` + `` gives `/users/`). The result
/// starts with `/` and never contains `//`.
pub fn join_paths(base: &str, fragment: &str) -> String {
    let base = base.trim();
    let base = base.strip_suffix('/').unwrap_or(base);
    let fragment = fragment.trim();

    let joined = if fragment.starts_with('/') {
        format!("/{}{}", base, fragment)
    } else {
        format!("/{}/{}", base, fragment)
    };
    REPEATED_SLASH_RE.replace_all(&joined, "/").into_owned()
}

/// Rewrites `:name` segments (and optional `:name?`) to `{name}` placeholders
pub fn to_placeholder_syntax(path: &str) -> String {
    COLON_PARAM_RE.replace_all(path, "{$1}").into_owned()
}

/// Placeholder names in the order they appear in the path
pub fn path_placeholders(path: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(path)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Tag for a route group.
///
/// `UserProfileController` gives `userprofile`; a class name without the suffix falls
/// back to the first non-empty segment of the base path; otherwise the group is untagged.
pub fn controller_tag(class_name: Option<&str>, base_path: &str) -> Option<String> {
    if let Some(caps) = class_name.and_then(|name| CONTROLLER_NAME_RE.captures(name)) {
        return Some(caps[1].to_lowercase());
    }

    base_path
        .split('/')
        .map(str::trim)
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}
