//! Document synthesis: turning one exercise file into a standalone,
//! sandbox-ready hypertext document
//!
//! Every shell is self-contained: runtime libraries come from a CDN, errors
//! thrown by the embedded exercise code render inside the document, and
//! nothing escapes to the hosting page. Injection points are guarded by
//! substring presence checks, so re-running synthesis on its own output
//! never duplicates the runtime tags.

use crate::config::PreviewConfig;
use crate::render::dialect::{Dialect, has_component_markers};
use crate::render::live_reload::{build_live_reload_script, inject_before_body_end};
use crate::render::rewrite::prepare_component_source;
use crate::workspace::TaskFileRef;
use regex::Regex;
use std::sync::LazyLock;

/// Versioned runtime tags; the version token doubles as the idempotence
/// guard for injection.
pub const REACT_RUNTIME_URL: &str = "https://unpkg.com/react@18/umd/react.development.js";
pub const REACT_DOM_RUNTIME_URL: &str =
    "https://unpkg.com/react-dom@18/umd/react-dom.development.js";
pub const TRANSPILER_URL: &str = "https://unpkg.com/@babel/standalone/babel.min.js";

/// Guard tokens: markup carrying either already has the runtime wired in
const RUNTIME_GUARDS: &[&str] = &["react@18", "@babel/standalone"];

static HTML_OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<html[^>]*>").unwrap());
static INLINE_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<script([^>]*)>(.*?)</script>").unwrap());

fn ui_runtime_tags() -> String {
    format!(
        r#"
    <script crossorigin src="{REACT_RUNTIME_URL}"></script>
    <script crossorigin src="{REACT_DOM_RUNTIME_URL}"></script>
    <script src="{TRANSPILER_URL}"></script>"#
    )
}

/// Escape a source listing so it renders as text, never as markup
pub fn html_escape(source: &str) -> String {
    source
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Ensure the UI runtime and transpiler are present in a markup document
/// exactly once.
///
/// Idempotent: markup already carrying a versioned runtime tag is returned
/// unchanged. Insertion goes before `</head>` when one exists; otherwise a
/// minimal head is spliced after the opening root-element tag.
pub fn inject_ui_runtime(markup: &str) -> String {
    if RUNTIME_GUARDS.iter().any(|guard| markup.contains(guard)) {
        return markup.to_string();
    }

    let tags = ui_runtime_tags();
    if markup.contains("</head>") {
        return markup.replacen("</head>", &format!("{tags}\n</head>"), 1);
    }

    let head = format!(
        r#"<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">{tags}
</head>"#
    );
    match HTML_OPEN_TAG.find(markup) {
        Some(m) => {
            let mut out = String::with_capacity(markup.len() + head.len() + 1);
            out.push_str(&markup[..m.end()]);
            out.push('\n');
            out.push_str(&head);
            out.push_str(&markup[m.end()..]);
            out
        }
        None => format!("{head}\n{markup}"),
    }
}

/// Mark inline scripts containing component syntax with the transpiler's
/// script type so they are transpiled instead of executed as plain script.
/// Scripts loaded via `src` or already carrying a `type` are left alone.
pub fn ensure_transpiled_script_types(markup: &str) -> String {
    INLINE_SCRIPT
        .replace_all(markup, |caps: &regex::Captures| {
            let attrs = &caps[1];
            let body = &caps[2];
            if attrs.contains("src=") || attrs.contains("type=") {
                return caps[0].to_string();
            }
            if has_component_markers(body) {
                format!(r#"<script type="text/babel"{attrs}>{body}</script>"#)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

const COMPONENT_SHELL: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>React JSX - __FILE_NAME__</title>
__RUNTIME_TAGS__
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            margin: 0;
            padding: 20px;
            background-color: #f5f5f5;
        }
        #root {
            background: white;
            border-radius: 8px;
            padding: 20px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
            min-height: 200px;
        }
        .error-boundary {
            color: red;
            padding: 20px;
            border: 2px solid red;
            border-radius: 8px;
            background: #ffebee;
            margin: 10px 0;
        }
        .error-boundary h3 { margin-top: 0; }
        .error-boundary pre {
            background: rgba(0,0,0,0.1);
            padding: 10px;
            border-radius: 4px;
            overflow-x: auto;
            white-space: pre-wrap;
        }
        button { cursor: pointer; font-family: inherit; }
        * { box-sizing: border-box; }
    </style>
</head>
<body>
    <div id="root"></div>
    <script>
      function praktikaRenderError(title, message) {
        const root = document.getElementById('root');
        if (root && root.innerHTML.indexOf('error-boundary') === -1) {
          const block = document.createElement('div');
          block.className = 'error-boundary';
          const heading = document.createElement('h3');
          heading.textContent = title;
          const details = document.createElement('pre');
          details.textContent = message;
          block.appendChild(heading);
          block.appendChild(details);
          root.innerHTML = '';
          root.appendChild(block);
        }
      }

      window.addEventListener('error', function (event) {
        console.error('Global error:', event.error);
        praktikaRenderError('Ошибка выполнения:', event.error && event.error.message ? event.error.message : String(event.error));
      });

      window.addEventListener('unhandledrejection', function (event) {
        console.error('Unhandled promise rejection:', event.reason);
        praktikaRenderError('Ошибка в промисе:', event.reason && event.reason.message ? event.reason.message : String(event.reason));
      });
    </script>

    <script type="text/babel">
      try {
__CONTENT__
      } catch (error) {
        console.error('Sync error:', error);
        praktikaRenderError('Ошибка выполнения:', error.message);
      }
    </script>
</body>
</html>"#;

const SCRIPT_SHELL: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>JavaScript - __FILE_NAME__</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif;
            margin: 0;
            padding: 20px;
            background: #f8fafc;
        }
        .container {
            max-width: 1200px;
            margin: 0 auto;
            background: white;
            border-radius: 8px;
            box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1);
            overflow: hidden;
        }
        .header {
            background: #3b82f6;
            color: white;
            padding: 16px 24px;
            font-weight: 600;
        }
        .content { padding: 24px; }
        #output {
            border: 1px solid #e2e8f0;
            border-radius: 4px;
            padding: 16px;
            margin-top: 16px;
            min-height: 200px;
            background: #f8fafc;
        }
        .error {
            color: #dc2626;
            background: #fef2f2;
            border: 1px solid #fecaca;
            padding: 12px;
            border-radius: 4px;
            margin-top: 16px;
        }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">JavaScript: __FILE_NAME__</div>
        <div class="content">
            <div id="output">Загрузка...</div>
        </div>
    </div>

    <script>
        try {
            const output = document.getElementById('output');

            const originalLog = console.log;
            const logs = [];
            console.log = function (...args) {
                logs.push(args.join(' '));
                originalLog.apply(console, args);
                updateOutput();
            };

            function updateOutput() {
                if (logs.length > 0) {
                    output.innerHTML = '<h3>Вывод консоли:</h3><pre></pre>';
                    output.querySelector('pre').textContent = logs.join('\n');
                } else {
                    output.innerHTML = '<p>Код выполнен. Проверьте консоль браузера для вывода.</p>';
                }
            }

__CONTENT__

            if (logs.length === 0) {
                updateOutput();
            }
        } catch (error) {
            const output = document.getElementById('output');
            output.innerHTML = '<div class="error"><strong>Ошибка:</strong> <span></span></div>';
            output.querySelector('span').textContent = error.message;
        }
    </script>
</body>
</html>"#;

const STYLESHEET_SHELL: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>CSS - __FILE_NAME__</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 20px; background: #f8fafc; }
        .container { max-width: 1200px; margin: 0 auto; background: white; border-radius: 8px; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); overflow: hidden; }
        .header { background: #10b981; color: white; padding: 16px 24px; font-weight: 600; }
        .demo { padding: 24px; border-bottom: 1px solid #e2e8f0; }
        .code { padding: 24px; background: #f8fafc; }
        pre { margin: 0; overflow-x: auto; }

        /* Учебные стили применяются здесь */
__CONTENT__
    </style>
</head>
<body>
    <div class="container">
        <div class="header">CSS Стили: __FILE_NAME__</div>
        <div class="demo">
            <h3>Демонстрация стилей</h3>
            <div class="demo-content">
                <p>Пример текста для демонстрации CSS стилей.</p>
                <button>Пример кнопки</button>
                <div style="width: 100px; height: 100px; background: #3b82f6; margin: 16px 0;"></div>
            </div>
        </div>
        <div class="code">
            <h3>Код CSS:</h3>
            <pre><code>__LISTING__</code></pre>
        </div>
    </div>
</body>
</html>"#;

const TYPED_SOURCE_SHELL: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Предварительный просмотр - __FILE_NAME__</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 20px; background: #f8fafc; }
        .container { max-width: 1200px; margin: 0 auto; background: white; border-radius: 8px; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); padding: 24px; }
        .header { color: #3b82f6; font-weight: 600; margin-bottom: 16px; }
        pre { background: #f8fafc; padding: 16px; border-radius: 4px; overflow-x: auto; }
        .note { background: #fef3c7; border: 1px solid #f59e0b; padding: 12px; border-radius: 4px; margin-bottom: 16px; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">TypeScript файл: __FILE_NAME__</div>
        <div class="note">
            <strong>Примечание:</strong> TypeScript файлы требуют компиляции. Показан исходный код.
        </div>
        <pre><code>__LISTING__</code></pre>
    </div>
</body>
</html>"#;

const LISTING_SHELL: &str = r#"<!DOCTYPE html>
<html lang="ru">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Предварительный просмотр - __FILE_NAME__</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 20px; background: #f8fafc; }
        .container { max-width: 1200px; margin: 0 auto; background: white; border-radius: 8px; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); padding: 24px; }
        .header { color: #64748b; font-weight: 600; margin-bottom: 16px; }
        pre { background: #f8fafc; padding: 16px; border-radius: 4px; overflow-x: auto; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">Файл: __FILE_NAME__</div>
        <pre><code>__LISTING__</code></pre>
    </div>
</body>
</html>"#;

/// Builds standalone hypertext documents from raw exercise content
#[derive(Debug, Clone)]
pub struct DocumentSynthesizer {
    preview: PreviewConfig,
}

impl DocumentSynthesizer {
    pub fn new(preview: PreviewConfig) -> Self {
        Self { preview }
    }

    /// Synthesize the full document for one file.
    ///
    /// `live_reload` appends the polling augmentation; everything else is
    /// decided by the dialect.
    pub fn synthesize(
        &self,
        content: &str,
        dialect: Dialect,
        file_ref: &TaskFileRef,
        live_reload: bool,
    ) -> String {
        let file_name = file_ref.file_name();
        let document = match dialect {
            Dialect::Markup => content.to_string(),
            Dialect::MarkupWithUi => {
                ensure_transpiled_script_types(&inject_ui_runtime(content))
            }
            Dialect::ComponentSource => {
                component_shell(&prepare_component_source(content), file_name)
            }
            Dialect::Script => {
                // Plain scripts that carry component syntax go through the
                // transpiler shell so JSX in them still runs.
                if has_component_markers(content) {
                    component_shell(&prepare_component_source(content), file_name)
                } else {
                    script_shell(content, file_name)
                }
            }
            Dialect::Stylesheet => stylesheet_shell(content, file_name),
            Dialect::TypedSource => typed_source_shell(content, file_name),
            Dialect::Unknown => listing_shell(content, file_name),
        };

        if live_reload {
            let script = build_live_reload_script(file_ref, &self.preview);
            inject_before_body_end(&document, &script)
        } else {
            document
        }
    }
}

fn component_shell(content: &str, file_name: &str) -> String {
    COMPONENT_SHELL
        .replace("__RUNTIME_TAGS__", &ui_runtime_tags())
        .replace("__FILE_NAME__", file_name)
        .replace("__CONTENT__", content)
}

fn script_shell(content: &str, file_name: &str) -> String {
    SCRIPT_SHELL
        .replace("__FILE_NAME__", file_name)
        .replace("__CONTENT__", content)
}

fn stylesheet_shell(content: &str, file_name: &str) -> String {
    STYLESHEET_SHELL
        .replace("__FILE_NAME__", file_name)
        .replace("__CONTENT__", content)
        .replace("__LISTING__", &html_escape(content))
}

fn typed_source_shell(content: &str, file_name: &str) -> String {
    TYPED_SOURCE_SHELL
        .replace("__FILE_NAME__", file_name)
        .replace("__LISTING__", &html_escape(content))
}

fn listing_shell(content: &str, file_name: &str) -> String {
    LISTING_SHELL
        .replace("__FILE_NAME__", file_name)
        .replace("__LISTING__", &html_escape(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    fn synthesizer() -> DocumentSynthesizer {
        DocumentSynthesizer::new(PreviewConfig::default())
    }

    fn file_ref(name: &str) -> TaskFileRef {
        TaskFileRef::parse(name).unwrap()
    }

    #[test]
    fn test_inject_ui_runtime_into_head() {
        let markup = "<html><head><title>t</title></head><body></body></html>";
        let out = inject_ui_runtime(markup);
        assert_eq!(count(&out, REACT_RUNTIME_URL), 1);
        assert_eq!(count(&out, REACT_DOM_RUNTIME_URL), 1);
        assert_eq!(count(&out, TRANSPILER_URL), 1);
        assert!(out.contains("</head>"));
    }

    #[test]
    fn test_inject_ui_runtime_is_idempotent() {
        let markup = "<html><head></head><body>React.createElement</body></html>";
        let once = inject_ui_runtime(markup);
        let twice = inject_ui_runtime(&once);
        assert_eq!(count(&twice, REACT_RUNTIME_URL), 1);
        assert_eq!(count(&twice, REACT_DOM_RUNTIME_URL), 1);
        assert_eq!(count(&twice, TRANSPILER_URL), 1);
    }

    #[test]
    fn test_inject_ui_runtime_without_head() {
        let markup = "<html lang=\"en\"><body><div id=\"app\"></div></body></html>";
        let out = inject_ui_runtime(markup);
        assert_eq!(count(&out, "<head>"), 1);
        assert_eq!(count(&out, REACT_RUNTIME_URL), 1);
        // Head lands right after the opening root-element tag
        let html_end = out.find("<html lang=\"en\">").unwrap() + "<html lang=\"en\">".len();
        let head_pos = out.find("<head>").unwrap();
        assert!(head_pos > html_end);
        assert!(head_pos < out.find("<body>").unwrap());
    }

    #[test]
    fn test_transpiled_script_types() {
        let markup = concat!(
            "<html><body>",
            "<script>ReactDOM.render(<App/>, document.getElementById('root'));</script>",
            "<script>console.log('plain');</script>",
            "<script src=\"lib.js\"></script>",
            "<script type=\"module\">import x from 'y';</script>",
            "</body></html>"
        );
        let out = ensure_transpiled_script_types(markup);
        assert_eq!(count(&out, r#"<script type="text/babel">"#), 1);
        assert!(out.contains("<script>console.log('plain');</script>"));
        assert!(out.contains(r#"<script src="lib.js"></script>"#));
        assert!(out.contains(r#"<script type="module">"#));
    }

    #[test]
    fn test_component_shell_end_to_end() {
        let doc = synthesizer().synthesize(
            "const el = <div>Hi</div>;",
            Dialect::ComponentSource,
            &file_ref("02-lists/01-map.problem.jsx"),
            false,
        );
        assert_eq!(count(&doc, REACT_RUNTIME_URL), 1);
        assert_eq!(count(&doc, REACT_DOM_RUNTIME_URL), 1);
        assert_eq!(count(&doc, TRANSPILER_URL), 1);
        assert_eq!(count(&doc, r#"<div id="root">"#), 1);
        assert!(doc.contains(r#"<script type="text/babel">"#));
        assert!(doc.contains("try {"));
        assert!(doc.contains("const el = <div>Hi</div>;"));
        assert!(doc.contains("addEventListener('error'"));
        assert!(doc.contains("addEventListener('unhandledrejection'"));
    }

    #[test]
    fn test_script_with_component_markers_gets_transpiler_shell() {
        let doc = synthesizer().synthesize(
            "ReactDOM.render(<App/>, document.getElementById('root'));",
            Dialect::Script,
            &file_ref("a/b.problem.js"),
            false,
        );
        assert!(doc.contains(r#"<script type="text/babel">"#));
        assert_eq!(count(&doc, TRANSPILER_URL), 1);
    }

    #[test]
    fn test_plain_script_gets_console_capture() {
        let doc = synthesizer().synthesize(
            "console.log('sum', 1 + 2);",
            Dialect::Script,
            &file_ref("a/b.problem.js"),
            false,
        );
        assert!(doc.contains(r#"<div id="output">"#));
        assert!(doc.contains("console.log = function"));
        assert!(doc.contains("Код выполнен"));
        assert!(!doc.contains(TRANSPILER_URL));
    }

    #[test]
    fn test_stylesheet_shell_inlines_and_escapes() {
        let css = ".btn > a { color: red; }";
        let doc = synthesizer().synthesize(
            css,
            Dialect::Stylesheet,
            &file_ref("03-css/01-base.problem.css"),
            false,
        );
        // Applied once raw inside <style>, listed once escaped
        assert!(doc.contains(css));
        assert!(doc.contains(".btn &gt; a { color: red; }"));
        assert!(doc.contains("Демонстрация стилей"));
    }

    #[test]
    fn test_listing_escapes_every_angle_bracket() {
        let source = "<div><span>x</span></div>";
        let doc = synthesizer().synthesize(
            source,
            Dialect::Unknown,
            &file_ref("notes.txt"),
            false,
        );
        let listing_start = doc.find("<code>").unwrap();
        let listing_end = doc.find("</code>").unwrap();
        let listing = &doc[listing_start + "<code>".len()..listing_end];
        assert!(!listing.contains('<'));
        assert!(!listing.contains('>'));
        assert_eq!(count(listing, "&lt;"), 4);
        assert_eq!(count(listing, "&gt;"), 4);
    }

    #[test]
    fn test_typed_source_carries_note() {
        let doc = synthesizer().synthesize(
            "const x: number = 1;",
            Dialect::TypedSource,
            &file_ref("a/b.problem.ts"),
            false,
        );
        assert!(doc.contains("требуют компиляции"));
        assert!(doc.contains("const x: number = 1;"));
    }

    #[test]
    fn test_markup_passes_through() {
        let markup = "<html><head></head><body><h1>Plain</h1></body></html>";
        let doc = synthesizer().synthesize(
            markup,
            Dialect::Markup,
            &file_ref("a/b.problem.html"),
            false,
        );
        assert_eq!(doc, markup);
    }

    #[test]
    fn test_live_reload_injected_before_body_end() {
        let markup = "<html><head></head><body><h1>x</h1></body></html>";
        let doc = synthesizer().synthesize(
            markup,
            Dialect::Markup,
            &file_ref("a/b.problem.html"),
            true,
        );
        assert!(doc.contains("checkForChanges"));
        let script_pos = doc.find("checkForChanges").unwrap();
        assert!(script_pos < doc.rfind("</body>").unwrap() + 1);
        assert!(doc.ends_with("</body></html>"));
    }
}
