//! Logical task-file references and their resolution to disk
//!
//! A ref like `01-intro/01-task.problem.jsx` is resolved against the
//! playground overlay first, then the source tree. The first read of a
//! source file materializes a playground copy, so all later reads and
//! writes target the overlay and learner edits never touch the originals.

use crate::config::Settings;
use crate::error::{IoContext, ServiceError, ServiceResult};
use crate::workspace::PlaygroundStore;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// A logical path identifying one exercise file, relative to the source root.
///
/// Always uses forward-slash separators. A leading `src/` marker is stripped
/// on construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskFileRef(String);

impl TaskFileRef {
    /// Normalize a raw ref: backslashes become slashes, a leading source-root
    /// marker and leading slashes are stripped.
    ///
    /// Refs that escape the tree (`..` components) or normalize to nothing
    /// are rejected.
    pub fn parse(raw: &str) -> ServiceResult<Self> {
        let normalized = raw.replace('\\', "/");
        let trimmed = normalized.trim_start_matches('/');
        let rel = trimmed.strip_prefix("src/").unwrap_or(trimmed);

        if rel.is_empty() {
            return Err(ServiceError::InvalidRef {
                file: raw.to_string(),
            });
        }

        let escapes = Path::new(rel)
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
        if escapes {
            return Err(ServiceError::InvalidRef {
                file: raw.to_string(),
            });
        }

        Ok(Self(rel.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ref as a relative path, for joining onto a tree root
    pub fn rel_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// File name portion of the ref
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Lowercased extension including the dot, e.g. `.jsx`
    pub fn extension(&self) -> String {
        match self.file_name().rfind('.') {
            Some(idx) => self.file_name()[idx..].to_lowercase(),
            None => String::new(),
        }
    }
}

impl std::fmt::Display for TaskFileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which tree a resolved file was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOrigin {
    Playground,
    Source,
}

/// One resolved file. Created per request and never cached, so every
/// read observes the current bytes on disk.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub absolute_path: PathBuf,
    pub content: String,
    pub origin: FileOrigin,
}

/// Maps logical refs to concrete files across the two trees
#[derive(Debug, Clone)]
pub struct PathResolver {
    source_root: PathBuf,
    playground: PlaygroundStore,
}

impl PathResolver {
    pub fn new(settings: &Settings) -> Self {
        Self::with_roots(settings.source_path(), settings.playground_path())
    }

    pub fn with_roots(source_root: PathBuf, playground_root: PathBuf) -> Self {
        let playground = PlaygroundStore::new(playground_root, source_root.clone());
        Self {
            source_root,
            playground,
        }
    }

    pub fn playground(&self) -> &PlaygroundStore {
        &self.playground
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Resolve a ref to its current content.
    ///
    /// The overlay wins when both trees have the file. A source-only file is
    /// copied into the overlay before returning, so the next access finds it
    /// there.
    pub async fn resolve(&self, file_ref: &TaskFileRef) -> ServiceResult<ResolvedFile> {
        let overlay_path = self.playground.entry_path(file_ref);
        match self.playground.read(file_ref).await {
            Ok(content) => {
                return Ok(ResolvedFile {
                    absolute_path: overlay_path,
                    content,
                    origin: FileOrigin::Playground,
                });
            }
            Err(ServiceError::FileNotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let source_path = self.source_root.join(file_ref.rel_path());
        match tokio::fs::read_to_string(&source_path).await {
            Ok(content) => {
                // Copy-on-first-access: materialize the overlay entry so all
                // subsequent reads and writes target it.
                self.playground.write(file_ref, &content).await?;
                Ok(ResolvedFile {
                    absolute_path: source_path,
                    content,
                    origin: FileOrigin::Source,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ServiceError::FileNotFound {
                    file: file_ref.as_str().to_string(),
                })
            }
            Err(e) => Err(e).read_context(&source_path),
        }
    }
}
