//! Textual compatibility shims applied to component source before embedding
//!
//! The in-browser transpiler is AST-free, so these are regex rewrites, not
//! parse-rewrites. They are best-effort: the optional-chaining shim handles
//! one level of access only and does not handle chained or nested optional
//! access. Kept as pure functions so they can be tested against a table of
//! (input, expected) pairs.

use regex::Regex;
use std::sync::LazyLock;

static FRAGMENT_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<>\s*").unwrap());
static FRAGMENT_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*</>").unwrap());
static OPTIONAL_CHAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w+)\?\.(\w+)").unwrap());
static ABSOLUTE_API_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http://localhost:\d+/api/").unwrap());

/// Rewrite shorthand fragments to their named equivalents:
/// `<>` becomes `<React.Fragment>`, `</>` becomes `</React.Fragment>`.
pub fn rewrite_fragment_shorthand(source: &str) -> String {
    let opened = FRAGMENT_OPEN.replace_all(source, "<React.Fragment>");
    FRAGMENT_CLOSE
        .replace_all(&opened, "</React.Fragment>")
        .into_owned()
}

/// Rewrite one-level optional chaining to a short-circuit conjunction:
/// `a?.b` becomes `a && a.b`.
///
/// Shallow by design: `a?.b?.c` and `a?.b.c?.d` are NOT handled correctly.
pub fn rewrite_optional_chaining(source: &str) -> String {
    OPTIONAL_CHAIN
        .replace_all(source, "$1 && $1.$2")
        .into_owned()
}

/// Rewrite absolute same-host API URLs to relative ones so exercise code
/// keeps working wherever the server is bound.
pub fn rewrite_absolute_api_urls(source: &str) -> String {
    ABSOLUTE_API_URL.replace_all(source, "/api/").into_owned()
}

/// All shims in the order they are applied to component-bearing content
pub fn prepare_component_source(source: &str) -> String {
    let source = rewrite_absolute_api_urls(source);
    let source = rewrite_fragment_shorthand(&source);
    rewrite_optional_chaining(&source)
}
