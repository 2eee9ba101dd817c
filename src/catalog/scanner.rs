//! Task catalogue scanning
//!
//! The walk is separated from the cataloguing: `collect_entries` snapshots
//! the source tree into plain entries, and `build_catalog` is a pure
//! function over that snapshot, so tests can supply synthetic trees.

use crate::catalog::{VARIANT_FAMILIES, is_problem_file, is_variant_file};
use ignore::WalkBuilder;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

/// One snapshotted source file relevant to the catalogue
#[derive(Debug, Clone)]
pub struct SourceFileEntry {
    /// Forward-slash path relative to the source root
    pub rel_path: String,
    pub file_name: String,
    pub content: String,
}

/// One task shown in the navigation sidebar
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub name: String,
    pub description: String,
    /// Ref of the problem variant (or the only variant that exists)
    pub file: String,
    #[serde(skip)]
    pub chapter: String,
}

/// A chapter grouping, sorted by the original directory name
#[derive(Debug, Clone, Serialize)]
pub struct Chapter {
    /// Display title (translated when a translation exists)
    pub chapter: String,
    #[serde(rename = "originalChapter")]
    pub original_chapter: String,
    pub tasks: Vec<TaskDescriptor>,
}

struct MarkerPatterns {
    html_name: Regex,
    html_desc: Regex,
    block_name: Regex,
    block_desc: Regex,
}

/// Walks the source tree and extracts task metadata from comment markers
/// or filename conventions
pub struct TaskCatalogScanner {
    patterns: Vec<MarkerPatterns>,
}

impl TaskCatalogScanner {
    /// Build a scanner recognizing the given name markers (e.g. `Задание:`)
    pub fn new(markers: &[String]) -> Self {
        let patterns = markers
            .iter()
            .map(|marker| {
                let m = regex::escape(marker);
                MarkerPatterns {
                    html_name: Regex::new(&format!(r"<!--\s*{m}\s*([^\n]*)")).unwrap(),
                    html_desc: Regex::new(&format!(r"(?s)<!--\s*{m}.*?-->")).unwrap(),
                    block_name: Regex::new(&format!(r"/\*\s*{m}\s*([^\n]*)")).unwrap(),
                    block_desc: Regex::new(&format!(r"(?s)/\*\s*{m}.*?\*/")).unwrap(),
                }
            })
            .collect();
        Self { patterns }
    }

    /// Snapshot every problem/solution file under the source root.
    ///
    /// Returns an empty list when the root does not exist. Unreadable files
    /// are skipped with a warning rather than failing the whole scan.
    pub fn collect_entries(&self, source_root: &Path) -> Vec<SourceFileEntry> {
        if !source_root.exists() {
            return Vec::new();
        }

        let mut entries = Vec::new();
        let walker = WalkBuilder::new(source_root)
            .hidden(false)
            .git_ignore(true)
            .follow_links(false)
            .require_git(false)
            .build();

        for result in walker {
            let Ok(entry) = result else { continue };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            let path = entry.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if file_name.starts_with('.') || !is_variant_file(file_name) {
                continue;
            }

            let rel_path = match path.strip_prefix(source_root) {
                Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };

            match std::fs::read_to_string(path) {
                Ok(content) => entries.push(SourceFileEntry {
                    rel_path,
                    file_name: file_name.to_string(),
                    content,
                }),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                }
            }
        }

        entries
    }

    /// Group a snapshot into chapters.
    ///
    /// Pure: no filesystem access. Problem/solution pairs sharing a
    /// normalized base name merge into one descriptor, with the problem
    /// variant supplying the ref and metadata.
    pub fn build_catalog(
        &self,
        entries: &[SourceFileEntry],
        translations: &HashMap<String, String>,
    ) -> Vec<Chapter> {
        // BTreeMap keeps chapters sorted by the original directory name
        let mut chapters: BTreeMap<String, BTreeMap<String, TaskDescriptor>> = BTreeMap::new();

        for entry in entries {
            let chapter = entry
                .rel_path
                .split_once('/')
                .map(|(first, _)| first.to_string())
                .unwrap_or_default();
            let base = normalized_base(&entry.rel_path);
            let (name, description) = self.extract_task_info(entry);

            let descriptor = TaskDescriptor {
                name,
                description,
                file: entry.rel_path.clone(),
                chapter: chapter.clone(),
            };

            let tasks = chapters.entry(chapter).or_default();
            match tasks.get_mut(&base) {
                // The problem variant wins over an already-seen solution
                Some(existing) => {
                    if is_problem_file(&entry.file_name) && !is_problem_file(file_name_of(&existing.file))
                    {
                        *existing = descriptor;
                    }
                }
                None => {
                    tasks.insert(base, descriptor);
                }
            }
        }

        chapters
            .into_iter()
            .map(|(original_chapter, tasks)| Chapter {
                chapter: translations
                    .get(&original_chapter)
                    .cloned()
                    .unwrap_or_else(|| original_chapter.clone()),
                original_chapter,
                tasks: tasks.into_values().collect(),
            })
            .collect()
    }

    /// Walk and catalogue in one step
    pub fn scan(&self, source_root: &Path, translations: &HashMap<String, String>) -> Vec<Chapter> {
        let entries = self.collect_entries(source_root);
        self.build_catalog(&entries, translations)
    }

    fn extract_task_info(&self, entry: &SourceFileEntry) -> (String, String) {
        for patterns in &self.patterns {
            let (name_re, desc_re) = if entry.file_name.ends_with(".html") {
                (&patterns.html_name, &patterns.html_desc)
            } else {
                (&patterns.block_name, &patterns.block_desc)
            };

            if let Some(caps) = name_re.captures(&entry.content) {
                let name = caps[1]
                    .trim()
                    .trim_end_matches("-->")
                    .trim_end_matches("*/")
                    .trim()
                    .to_string();
                let description = desc_re
                    .find(&entry.content)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                if !name.is_empty() {
                    return (name, description);
                }
            }
        }

        (fallback_name(&entry.file_name), String::new())
    }
}

/// Relative path with the variant token removed, used as the merge key for
/// problem/solution pairs
fn normalized_base(rel_path: &str) -> String {
    let mut base = rel_path.to_string();
    for (problem, solution) in VARIANT_FAMILIES {
        base = base.replacen(&format!(".{problem}."), ".", 1);
        base = base.replacen(&format!(".{solution}."), ".", 1);
    }
    base
}

fn file_name_of(rel_path: &str) -> &str {
    rel_path.rsplit('/').next().unwrap_or(rel_path)
}

/// Derive a display name from the file name when no marker is present:
/// variant token and extension stripped, dashes become spaces
fn fallback_name(file_name: &str) -> String {
    let base = normalized_base(file_name);
    let stem = match base.rfind('.') {
        Some(idx) => &base[..idx],
        None => &base,
    };
    stem.replace('-', " ")
}
