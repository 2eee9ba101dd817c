//! Request handlers for the playground API
//!
//! Every handler converts failures into a `ServiceError`, which maps to a
//! contained JSON error body; nothing crashes the request loop.

use crate::catalog::{find_solution, list_task_files};
use crate::editor::open_in_editor;
use crate::error::{ServiceError, ServiceResult};
use crate::render::Dialect;
use crate::server::AppState;
use crate::workspace::TaskFileRef;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;

const NO_CACHE: &str = "no-store, must-revalidate";

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::MissingParameter { .. } | ServiceError::InvalidRef { .. } => {
                StatusCode::BAD_REQUEST
            }
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, code = self.status_code(), "request failed");
        }
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.status_code(),
        }));
        (status, body).into_response()
    }
}

fn require<'a>(value: &'a Option<String>, name: &'static str) -> ServiceResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or(ServiceError::MissingParameter { name })
}

fn html_response(document: String) -> Response {
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            ),
            (header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE)),
        ],
        document,
    )
        .into_response()
}

fn text_response(content: String) -> Response {
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            ),
            (header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE)),
        ],
        content,
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub file: Option<String>,
    pub live: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    pub task: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveBody {
    pub file: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FileBody {
    pub file: Option<String>,
}

/// GET /api/preview — synthesized document for one exercise file
pub async fn preview(
    State(state): State<AppState>,
    Query(params): Query<FileQuery>,
) -> ServiceResult<Response> {
    let file = require(&params.file, "file")?;
    let live_reload = params.live.as_deref() == Some("true");

    let file_ref = TaskFileRef::parse(file)?;
    let resolved = state.resolver.resolve(&file_ref).await?;
    let dialect = Dialect::classify(&file_ref.extension(), &resolved.content);
    let document = state
        .synthesizer
        .synthesize(&resolved.content, dialect, &file_ref, live_reload);

    Ok(html_response(document))
}

/// GET /api/playground — raw bytes of the resolved file (polled by the
/// live-reload script)
pub async fn playground_get(
    State(state): State<AppState>,
    Query(params): Query<FileQuery>,
) -> ServiceResult<Response> {
    let file = require(&params.file, "file")?;
    let file_ref = TaskFileRef::parse(file)?;
    let resolved = state.resolver.resolve(&file_ref).await?;
    Ok(text_response(resolved.content))
}

/// PUT /api/playground — save learner content to the overlay
pub async fn playground_save(
    State(state): State<AppState>,
    Json(body): Json<SaveBody>,
) -> ServiceResult<Json<serde_json::Value>> {
    let file = require(&body.file, "file")?;
    let content = body
        .content
        .as_deref()
        .ok_or(ServiceError::MissingParameter { name: "content" })?;

    let file_ref = TaskFileRef::parse(file)?;
    state.resolver.playground().write(&file_ref, content).await?;
    Ok(Json(json!({
        "success": true,
        "message": "File saved to playground",
    })))
}

/// POST /api/playground — copy the source entry into the overlay
pub async fn playground_copy(
    State(state): State<AppState>,
    Json(body): Json<FileBody>,
) -> ServiceResult<Json<serde_json::Value>> {
    let file = require(&body.file, "file")?;
    let file_ref = TaskFileRef::parse(file)?;

    let source_path = state.resolver.source_root().join(file_ref.rel_path());
    let content = match tokio::fs::read_to_string(&source_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServiceError::SourceNotFound {
                file: file_ref.as_str().to_string(),
            });
        }
        Err(e) => {
            return Err(ServiceError::FileRead {
                path: source_path,
                source: e,
            });
        }
    };

    state.resolver.playground().write(&file_ref, &content).await?;
    Ok(Json(json!({
        "success": true,
        "message": "File copied to playground",
    })))
}

/// DELETE /api/playground — reset one entry or wipe the whole overlay
pub async fn playground_reset(
    State(state): State<AppState>,
    Query(params): Query<FileQuery>,
) -> ServiceResult<Json<serde_json::Value>> {
    match &params.file {
        Some(file) if !file.is_empty() => {
            let file_ref = TaskFileRef::parse(file)?;
            state.resolver.playground().reset_one(&file_ref).await?;
            Ok(Json(json!({
                "success": true,
                "message": "File reset from source",
            })))
        }
        _ => {
            state.resolver.playground().reset_all().await?;
            Ok(Json(json!({
                "success": true,
                "message": "Playground reset",
            })))
        }
    }
}

/// GET /api/tasks — the full chapter/task catalogue
pub async fn tasks(State(state): State<AppState>) -> ServiceResult<Json<serde_json::Value>> {
    let translations = state.course.get().await.chapter_translations;
    let scanner = state.scanner.clone();
    let source_root = state.settings.source_path();

    // The walk is synchronous; keep it off the async workers
    let catalog = tokio::task::spawn_blocking(move || scanner.scan(&source_root, &translations))
        .await
        .map_err(|e| ServiceError::ConfigError {
            reason: format!("catalogue scan failed: {e}"),
        })?;

    Ok(Json(serde_json::to_value(catalog).unwrap_or_default()))
}

/// GET /api/task-files — the files belonging to one task
pub async fn task_files(
    State(state): State<AppState>,
    Query(params): Query<TaskQuery>,
) -> ServiceResult<Json<serde_json::Value>> {
    let task = require(&params.task, "task")?;
    let task_ref = TaskFileRef::parse(task)?;
    let files = list_task_files(
        &state.settings.source_path(),
        &task_ref,
        &state.settings.catalog,
    )
    .await?;
    Ok(Json(serde_json::to_value(files).unwrap_or_default()))
}

/// GET /api/solution — first existing solution variant for a problem file.
/// A miss is soft: the caller stays in problem view.
pub async fn solution(
    State(state): State<AppState>,
    Query(params): Query<FileQuery>,
) -> ServiceResult<Json<serde_json::Value>> {
    let file = require(&params.file, "file")?;
    let problem = TaskFileRef::parse(file)?;

    match find_solution(&state.resolver, &problem).await {
        Some(found) => Ok(Json(json!({ "found": true, "file": found.as_str() }))),
        None => Ok(Json(json!({ "found": false, "file": null }))),
    }
}

/// GET /api/readme — the description document adjacent to a task
pub async fn readme(
    State(state): State<AppState>,
    Query(params): Query<TaskQuery>,
) -> ServiceResult<Response> {
    let task = require(&params.task, "task")?;
    let task_ref = TaskFileRef::parse(task)?;

    let task_dir = match task_ref.as_str().rsplit_once('/') {
        Some((dir, _)) => dir,
        None => "",
    };
    let readme_path = state
        .settings
        .source_path()
        .join(task_dir)
        .join("README.md");

    match tokio::fs::read_to_string(&readme_path).await {
        Ok(content) => Ok(text_response(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ServiceError::FileNotFound {
                file: format!("{task_dir}/README.md"),
            })
        }
        Err(e) => Err(ServiceError::FileRead {
            path: readme_path,
            source: e,
        }),
    }
}

/// POST /api/editor — open a file in the external editor
pub async fn editor_open(
    State(state): State<AppState>,
    Json(body): Json<FileBody>,
) -> ServiceResult<Json<serde_json::Value>> {
    let file = require(&body.file, "file")?;

    let path = if std::path::Path::new(file).is_absolute() {
        std::path::PathBuf::from(file)
    } else {
        let file_ref = TaskFileRef::parse(file)?;
        let overlay = state.resolver.playground().entry_path(&file_ref);
        if overlay.exists() {
            overlay
        } else {
            state.resolver.source_root().join(file_ref.rel_path())
        }
    };

    let launch = open_in_editor(&state.settings.editor, &path).await?;
    Ok(Json(json!({ "success": launch.success, "uri": launch.uri })))
}

/// GET /api/config — course metadata for the UI
pub async fn course_config(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.course.get().await;
    Json(serde_json::to_value(config).unwrap_or_default())
}

/// POST /api/config — drop the cached course config so the next read
/// reloads it from disk
pub async fn course_config_reload(
    State(state): State<AppState>,
) -> Json<serde_json::Value> {
    state.course.invalidate().await;
    Json(json!({ "success": true, "message": "Course config cache invalidated" }))
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}
