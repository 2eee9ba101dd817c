//! Library-level pipeline tests: resolve → classify → synthesize over real
//! temp trees, covering the overlay lifecycle end to end

use praktika::render::synthesize::{REACT_DOM_RUNTIME_URL, REACT_RUNTIME_URL, TRANSPILER_URL};
use praktika::{Dialect, DocumentSynthesizer, FileOrigin, PathResolver, TaskFileRef};
use std::fs;
use tempfile::TempDir;

fn resolver(dir: &TempDir) -> PathResolver {
    PathResolver::with_roots(dir.path().join("src"), dir.path().join("playground"))
}

fn write_source(dir: &TempDir, rel: &str, content: &str) {
    let path = dir.path().join("src").join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn synthesizer() -> DocumentSynthesizer {
    DocumentSynthesizer::new(praktika::config::PreviewConfig::default())
}

async fn render(resolver: &PathResolver, file: &str, live: bool) -> String {
    let file_ref = TaskFileRef::parse(file).unwrap();
    let resolved = resolver.resolve(&file_ref).await.unwrap();
    let dialect = Dialect::classify(&file_ref.extension(), &resolved.content);
    synthesizer().synthesize(&resolved.content, dialect, &file_ref, live)
}

#[tokio::test]
async fn overlay_lifecycle_full_cycle() {
    let dir = TempDir::new().unwrap();
    write_source(&dir, "01-intro/01-a.problem.js", "console.log('v1');");
    let resolver = resolver(&dir);
    let file_ref = TaskFileRef::parse("01-intro/01-a.problem.js").unwrap();

    // First resolve: comes from source, materializes the overlay
    let first = resolver.resolve(&file_ref).await.unwrap();
    assert_eq!(first.origin, FileOrigin::Source);
    let overlay_path = dir.path().join("playground/01-intro/01-a.problem.js");
    assert_eq!(fs::read_to_string(&overlay_path).unwrap(), "console.log('v1');");

    // Learner edit: overlay diverges, source untouched
    resolver
        .playground()
        .write(&file_ref, "console.log('edited');")
        .await
        .unwrap();
    let edited = resolver.resolve(&file_ref).await.unwrap();
    assert_eq!(edited.origin, FileOrigin::Playground);
    assert_eq!(edited.content, "console.log('edited');");
    assert_eq!(
        fs::read_to_string(dir.path().join("src/01-intro/01-a.problem.js")).unwrap(),
        "console.log('v1');"
    );

    // Reset one: back to source content, twice yields the same result
    resolver.playground().reset_one(&file_ref).await.unwrap();
    resolver.playground().reset_one(&file_ref).await.unwrap();
    assert_eq!(
        resolver.resolve(&file_ref).await.unwrap().content,
        "console.log('v1');"
    );

    // Reset all: overlay has no leftover entries, next resolve re-copies
    resolver
        .playground()
        .write(&file_ref, "scratch")
        .await
        .unwrap();
    resolver.playground().reset_all().await.unwrap();
    assert!(!overlay_path.exists());
    let fresh = resolver.resolve(&file_ref).await.unwrap();
    assert_eq!(fresh.origin, FileOrigin::Source);
    assert_eq!(fresh.content, "console.log('v1');");
}

#[tokio::test]
async fn markup_with_ui_gets_runtime_exactly_once() {
    let dir = TempDir::new().unwrap();
    write_source(
        &dir,
        "04-react/01-inline.problem.html",
        "<html><head><title>t</title></head><body>\
         <div id=\"root\"></div>\
         <script>ReactDOM.render(React.createElement('p'), document.getElementById('root'));</script>\
         </body></html>",
    );
    let resolver = resolver(&dir);

    let doc = render(&resolver, "04-react/01-inline.problem.html", false).await;
    assert_eq!(doc.matches(REACT_RUNTIME_URL).count(), 1);
    assert_eq!(doc.matches(REACT_DOM_RUNTIME_URL).count(), 1);
    assert_eq!(doc.matches(TRANSPILER_URL).count(), 1);
    assert_eq!(doc.matches(r#"<script type="text/babel">"#).count(), 1);

    // Re-running synthesis on the output must not duplicate the tags
    let file_ref = TaskFileRef::parse("04-react/01-inline.problem.html").unwrap();
    let dialect = Dialect::classify(".html", &doc);
    assert_eq!(dialect, Dialect::MarkupWithUi);
    let twice = synthesizer().synthesize(&doc, dialect, &file_ref, false);
    assert_eq!(twice.matches(REACT_RUNTIME_URL).count(), 1);
    assert_eq!(twice.matches(REACT_DOM_RUNTIME_URL).count(), 1);
    assert_eq!(twice.matches(TRANSPILER_URL).count(), 1);
}

#[tokio::test]
async fn markup_already_carrying_runtime_is_untouched() {
    let dir = TempDir::new().unwrap();
    let markup = format!(
        "<html><head><script src=\"{REACT_RUNTIME_URL}\"></script></head>\
         <body><script>React.createElement('p');</script></body></html>"
    );
    write_source(&dir, "04-react/02-own.problem.html", &markup);
    let resolver = resolver(&dir);

    let doc = render(&resolver, "04-react/02-own.problem.html", false).await;
    assert_eq!(doc.matches(REACT_RUNTIME_URL).count(), 1);
    // The guard stops the whole injection, not just one tag
    assert_eq!(doc.matches(TRANSPILER_URL).count(), 0);
}

#[tokio::test]
async fn stylesheet_listing_never_leaks_raw_tags() {
    let dir = TempDir::new().unwrap();
    write_source(
        &dir,
        "03-css/01-sel.problem.css",
        "div > p { color: blue; }\n/* note: a < b */",
    );
    let resolver = resolver(&dir);

    let doc = render(&resolver, "03-css/01-sel.problem.css", false).await;
    let listing_start = doc.find("<code>").unwrap() + "<code>".len();
    let listing_end = doc.find("</code>").unwrap();
    let listing = &doc[listing_start..listing_end];
    assert!(!listing.contains('<'));
    assert!(!listing.contains('>'));
    assert!(listing.contains("&lt;"));
    assert!(listing.contains("&gt;"));
}

#[tokio::test]
async fn typed_source_renders_read_only() {
    let dir = TempDir::new().unwrap();
    write_source(
        &dir,
        "05-ts/01-types.problem.ts",
        "type Point = { x: number; y: number };",
    );
    let resolver = resolver(&dir);

    let doc = render(&resolver, "05-ts/01-types.problem.ts", false).await;
    assert!(doc.contains("требуют компиляции"));
    assert!(!doc.contains(TRANSPILER_URL));
}

#[tokio::test]
async fn fragments_and_optional_chaining_are_rewritten_for_transpiler() {
    let dir = TempDir::new().unwrap();
    write_source(
        &dir,
        "02-lists/02-frag.problem.jsx",
        "const el = <>{items?.length}</>;",
    );
    let resolver = resolver(&dir);

    let doc = render(&resolver, "02-lists/02-frag.problem.jsx", false).await;
    assert!(doc.contains("<React.Fragment>"));
    assert!(doc.contains("</React.Fragment>"));
    assert!(doc.contains("items && items.length"));
    assert!(!doc.contains("?."));
}
