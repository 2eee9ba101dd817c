//! Dialect detection from file extension and content sniffing
//!
//! Classification drives which document shell the synthesizer builds. The
//! content sniffing is string-matching and inherently heuristic; it lives
//! behind this module's interface so a stricter parser-based detector could
//! be substituted without touching callers.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Marker tokens that mean "this markup uses the UI framework"
const UI_MARKERS: &[&str] = &[
    "React.",
    "ReactDOM.",
    r#"type="text/babel""#,
    "react.development.js",
    "react.production.js",
];

static JSX_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z][A-Za-z0-9]*(\s[^>]*)?/?>").unwrap());

/// Synthesizer-relevant classification of a file's content and extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    /// A full hypertext document with no UI-framework involvement
    Markup,
    /// A hypertext document that uses the UI framework and needs the
    /// runtime plus transpiler injected
    MarkupWithUi,
    /// Raw component source (.jsx) needing a full shell around it
    ComponentSource,
    /// Plain script, run with console capture
    Script,
    /// Stylesheet, rendered against a static demo area
    Stylesheet,
    /// Typed source with no client-side compiler; shown read-only
    TypedSource,
    /// Anything else; shown as an escaped read-only listing
    Unknown,
}

impl Dialect {
    /// Classify from extension plus content sniffing.
    ///
    /// Pure: same inputs always produce the same dialect. The extension may
    /// be given with or without the leading dot, any case.
    pub fn classify(extension: &str, content: &str) -> Self {
        let ext = extension.trim_start_matches('.').to_lowercase();
        match ext.as_str() {
            "jsx" => Dialect::ComponentSource,
            "html" => {
                if has_ui_markers(content) {
                    Dialect::MarkupWithUi
                } else {
                    Dialect::Markup
                }
            }
            "css" => Dialect::Stylesheet,
            "js" => Dialect::Script,
            "ts" | "tsx" => Dialect::TypedSource,
            _ => Dialect::Unknown,
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &str {
        match self {
            Dialect::Markup => "markup",
            Dialect::MarkupWithUi => "markup-with-ui-framework",
            Dialect::ComponentSource => "component-source",
            Dialect::Script => "script",
            Dialect::Stylesheet => "stylesheet",
            Dialect::TypedSource => "typed-source",
            Dialect::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Does this markup reference the UI framework?
pub fn has_ui_markers(content: &str) -> bool {
    UI_MARKERS.iter().any(|marker| content.contains(marker))
}

/// Does this script contain component syntax (JSX-like tags or the
/// UI-framework global)? Scripts that do still classify as `Script`, but
/// the synthesizer wraps them with the component shell so the transpiler
/// sees them.
pub fn has_component_markers(content: &str) -> bool {
    content.contains("React.") || content.contains("ReactDOM.") || JSX_TAG.is_match(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(Dialect::classify(".jsx", ""), Dialect::ComponentSource);
        assert_eq!(Dialect::classify("jsx", ""), Dialect::ComponentSource);
        assert_eq!(Dialect::classify(".JSX", ""), Dialect::ComponentSource);
        assert_eq!(Dialect::classify(".css", ""), Dialect::Stylesheet);
        assert_eq!(Dialect::classify(".js", ""), Dialect::Script);
        assert_eq!(Dialect::classify(".ts", ""), Dialect::TypedSource);
        assert_eq!(Dialect::classify(".tsx", ""), Dialect::TypedSource);
        assert_eq!(Dialect::classify(".md", ""), Dialect::Unknown);
        assert_eq!(Dialect::classify("", ""), Dialect::Unknown);
    }

    #[test]
    fn test_classify_markup_sniffs_content() {
        assert_eq!(
            Dialect::classify(".html", "<html><body>hi</body></html>"),
            Dialect::Markup
        );
        assert_eq!(
            Dialect::classify(".html", "<script>ReactDOM.render(el, root)</script>"),
            Dialect::MarkupWithUi
        );
        assert_eq!(
            Dialect::classify(".html", r#"<script type="text/babel">x</script>"#),
            Dialect::MarkupWithUi
        );
        assert_eq!(
            Dialect::classify(
                ".html",
                r#"<script src="https://unpkg.com/react@18/umd/react.development.js"></script>"#
            ),
            Dialect::MarkupWithUi
        );
    }

    #[test]
    fn test_classify_jsx_unconditional() {
        // Even content with no UI markers classifies as component source
        assert_eq!(
            Dialect::classify(".jsx", "const x = 1;"),
            Dialect::ComponentSource
        );
    }

    #[test]
    fn test_classify_is_pure() {
        let a = Dialect::classify(".html", "React.createElement");
        let b = Dialect::classify(".html", "React.createElement");
        assert_eq!(a, b);
    }

    #[test]
    fn test_component_markers_in_scripts() {
        assert!(has_component_markers("ReactDOM.render(<App/>, el)"));
        assert!(has_component_markers("const el = <div>Hi</div>;"));
        assert!(!has_component_markers("console.log(1 < 2 && 3 > 2);"));
        assert!(!has_component_markers("const sum = (a, b) => a + b;"));
    }
}
