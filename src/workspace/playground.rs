//! The playground overlay: a mutable, disposable mirror of the source tree
//!
//! Every write is a whole-file create-or-overwrite and the full reset is a
//! whole-subtree delete-then-recreate, so no fine-grained locking is needed.
//! Concurrent readers racing a reset may briefly miss the root; callers
//! retry.

use crate::error::{IoContext, ServiceError, ServiceResult};
use crate::workspace::TaskFileRef;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct PlaygroundStore {
    root: PathBuf,
    source_root: PathBuf,
}

impl PlaygroundStore {
    pub fn new(root: PathBuf, source_root: PathBuf) -> Self {
        Self { root, source_root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the overlay entry for a ref
    pub fn entry_path(&self, file_ref: &TaskFileRef) -> PathBuf {
        self.root.join(file_ref.rel_path())
    }

    /// Idempotently create the overlay root directory
    pub async fn ensure_root(&self) -> ServiceResult<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .write_context(&self.root)
    }

    /// Read an overlay entry
    pub async fn read(&self, file_ref: &TaskFileRef) -> ServiceResult<String> {
        let path = self.entry_path(file_ref);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ServiceError::FileNotFound {
                    file: file_ref.as_str().to_string(),
                })
            }
            Err(e) => Err(e).read_context(&path),
        }
    }

    /// Create or fully overwrite an overlay entry, creating parent
    /// directories as needed
    pub async fn write(&self, file_ref: &TaskFileRef, content: &str) -> ServiceResult<()> {
        let path = self.entry_path(file_ref);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .write_context(parent)?;
        }
        tokio::fs::write(&path, content).await.write_context(&path)
    }

    /// Delete the overlay entry if present, then re-copy the source entry.
    ///
    /// Fails with `SourceNotFound` when the source tree has no entry either.
    pub async fn reset_one(&self, file_ref: &TaskFileRef) -> ServiceResult<()> {
        let path = self.entry_path(file_ref);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ServiceError::Reset {
                    path: path.clone(),
                    source: e,
                });
            }
        }

        let source_path = self.source_root.join(file_ref.rel_path());
        let content = match tokio::fs::read_to_string(&source_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ServiceError::SourceNotFound {
                    file: file_ref.as_str().to_string(),
                });
            }
            Err(e) => return Err(e).read_context(&source_path),
        };

        self.write(file_ref, &content).await
    }

    /// Remove the entire overlay and recreate an empty root.
    ///
    /// Full removal before recreation, never incremental file-by-file
    /// deletion: a concurrent read sees either the old tree or the fresh
    /// empty one.
    pub async fn reset_all(&self) -> ServiceResult<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ServiceError::Reset {
                    path: self.root.clone(),
                    source: e,
                });
            }
        }
        self.ensure_root().await
    }
}
