//! Listing the files that belong to one task
//!
//! A task ref identifies either a directory or one file inside it. Files
//! sharing the task's numeric prefix (e.g. `01-counter.`) form the task's
//! file set; some courses nest them in a folder named after the prefix
//! instead.

use crate::config::CatalogConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::workspace::TaskFileRef;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;

static TASK_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+-[^.]+)\.").unwrap());

/// Problem first, solution second, everything else after
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFileKind {
    Problem,
    Solution,
    Other,
}

impl TaskFileKind {
    fn of(file_name: &str) -> Self {
        if crate::catalog::is_problem_file(file_name) {
            Self::Problem
        } else if crate::catalog::is_solution_file(file_name) {
            Self::Solution
        } else {
            Self::Other
        }
    }
}

/// One file belonging to a task
#[derive(Debug, Clone, Serialize)]
pub struct TaskFileInfo {
    pub name: String,
    /// Ref relative to the source root
    pub path: String,
    #[serde(rename = "type")]
    pub kind: TaskFileKind,
    pub extension: String,
    #[serde(rename = "canOpenInEditor")]
    pub editor_openable: bool,
}

/// List the files belonging to the task the ref points into, ordered
/// problem, solution, then the rest, each group by name.
pub async fn list_task_files(
    source_root: &Path,
    task_ref: &TaskFileRef,
    catalog: &CatalogConfig,
) -> ServiceResult<Vec<TaskFileInfo>> {
    let task_path = source_root.join(task_ref.rel_path());

    // A ref with an extension points at a file; its directory is the task's
    let (task_dir, prefix) = if task_ref.extension().is_empty() {
        (task_path, None)
    } else {
        let dir = task_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or(task_path);
        let prefix = TASK_PREFIX
            .captures(task_ref.file_name())
            .map(|caps| caps[1].to_string());
        (dir, prefix)
    };

    // Courses with nested layouts keep a task's files in a folder named
    // after the prefix
    let search_dir = match &prefix {
        Some(prefix) => {
            let nested = task_dir.join(prefix);
            if nested.is_dir() { nested } else { task_dir }
        }
        None => task_dir,
    };

    if !search_dir.is_dir() {
        return Err(ServiceError::TaskDirNotFound { path: search_dir });
    }

    let mut files = Vec::new();
    let mut read_dir = tokio::fs::read_dir(&search_dir).await.map_err(|e| {
        ServiceError::FileRead {
            path: search_dir.clone(),
            source: e,
        }
    })?;

    while let Some(entry) = read_dir
        .next_entry()
        .await
        .map_err(|e| ServiceError::FileRead {
            path: search_dir.clone(),
            source: e,
        })?
    {
        let Ok(file_type) = entry.file_type().await else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();

        if let Some(prefix) = &prefix {
            if !name.starts_with(&format!("{prefix}.")) {
                continue;
            }
        }

        let rel = entry
            .path()
            .strip_prefix(source_root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| name.clone());
        let extension = match name.rfind('.') {
            Some(idx) => name[idx..].to_lowercase(),
            None => String::new(),
        };

        files.push(TaskFileInfo {
            kind: TaskFileKind::of(&name),
            editor_openable: catalog.editor_extensions.contains(&extension),
            path: rel,
            extension,
            name,
        });
    }

    files.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
    Ok(files)
}
