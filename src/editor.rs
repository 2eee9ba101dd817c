//! Opening a task file in the learner's external editor
//!
//! Spawns the configured editor command (VS Code's `code` by default) and
//! reports a `vscode://file/...` URI the UI can also offer as a fallback.
//! Failures here never affect any other operation.

use crate::config::EditorConfig;
use crate::error::{ServiceError, ServiceResult};
use serde::Serialize;
use std::path::Path;
use tokio::process::Command;

/// Result of a successful editor launch
#[derive(Debug, Clone, Serialize)]
pub struct EditorLaunch {
    pub success: bool,
    pub uri: String,
}

/// Launch the external editor on the given file
pub async fn open_in_editor(config: &EditorConfig, path: &Path) -> ServiceResult<EditorLaunch> {
    let output = Command::new(&config.command)
        .arg(path)
        .output()
        .await
        .map_err(|e| ServiceError::EditorFailed {
            tool: config.command.clone(),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ServiceError::EditorFailed {
            tool: config.command.clone(),
            detail: format!("exit status {}: {}", output.status, stderr.trim()),
        });
    }

    Ok(EditorLaunch {
        success: true,
        uri: editor_uri(path),
    })
}

/// URI form of a file path for editor deep links
pub fn editor_uri(path: &Path) -> String {
    format!("vscode://file/{}", path.display().to_string().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_uri() {
        assert_eq!(
            editor_uri(Path::new("/course/src/01-intro/a.problem.jsx")),
            "vscode://file//course/src/01-intro/a.problem.jsx"
        );
    }

    #[tokio::test]
    async fn test_missing_tool_is_structured_failure() {
        let config = EditorConfig {
            command: "definitely-not-an-editor-binary".to_string(),
        };
        let err = open_in_editor(&config, Path::new("/tmp/x.js"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EditorFailed { .. }));
        assert_eq!(err.status_code(), "EDITOR_FAILED");
    }
}
