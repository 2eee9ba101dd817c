//! Configuration module for the exercise playground service.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `PRAKTIKA_` and use double
//! underscores to separate nested levels:
//! - `PRAKTIKA_SERVER__BIND=0.0.0.0:4000` sets `server.bind`
//! - `PRAKTIKA_PREVIEW__POLL_INTERVAL_SECS=5` sets `preview.poll_interval_secs`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Workspace root directory (where .praktika is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Read-mostly tree holding the original exercise files
    #[serde(default = "default_source_root")]
    pub source_root: PathBuf,

    /// Mutable overlay tree holding learner edits; disposable
    #[serde(default = "default_playground_root")]
    pub playground_root: PathBuf,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Preview synthesis and live-reload settings
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Task catalogue scanning settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// External editor settings
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// HTTP server bind address
    #[serde(default = "default_bind_address")]
    pub bind: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PreviewConfig {
    /// Seconds between live-reload polls of the watched file
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Delay before the frame reloads once a change is seen, in milliseconds
    #[serde(default = "default_reload_delay_ms")]
    pub reload_delay_ms: u64,

    /// Minimum seconds between logged fetch errors in the polling script
    #[serde(default = "default_error_log_interval")]
    pub error_log_interval_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogConfig {
    /// Comment markers that introduce a task name, tried in order
    #[serde(default = "default_task_markers")]
    pub task_markers: Vec<String>,

    /// Extensions the UI offers to open in the external editor
    #[serde(default = "default_editor_extensions")]
    pub editor_extensions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EditorConfig {
    /// Command used to open a file externally
    #[serde(default = "default_editor_command")]
    pub command: String,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_source_root() -> PathBuf {
    PathBuf::from("src")
}
fn default_playground_root() -> PathBuf {
    PathBuf::from("playground")
}
fn default_false() -> bool {
    false
}
fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}
fn default_poll_interval() -> u64 {
    3
}
fn default_reload_delay_ms() -> u64 {
    1000
}
fn default_error_log_interval() -> u64 {
    10
}
fn default_task_markers() -> Vec<String> {
    vec!["Задание:".to_string(), "Task:".to_string()]
}
fn default_editor_extensions() -> Vec<String> {
    [".js", ".jsx", ".ts", ".tsx", ".html", ".css", ".json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_editor_command() -> String {
    "code".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            workspace_root: None,
            source_root: default_source_root(),
            playground_root: default_playground_root(),
            debug: false,
            server: ServerConfig::default(),
            preview: PreviewConfig::default(),
            catalog: CatalogConfig::default(),
            editor: EditorConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            reload_delay_ms: default_reload_delay_ms(),
            error_log_interval_secs: default_error_log_interval(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            task_markers: default_task_markers(),
            editor_extensions: default_editor_extensions(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            command: default_editor_command(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".praktika/settings.toml"));

        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Layer in environment variables with PRAKTIKA_ prefix
            // Double underscore (__) separates nested levels
            .merge(Env::prefixed("PRAKTIKA_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("PRAKTIKA_").split("_"))
            .extract()
            .map_err(Box::new)
    }

    /// Find the workspace config by looking for a .praktika directory,
    /// searching from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".praktika");
            if config_dir.exists() && config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }

    /// Get the workspace root directory (where .praktika is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".praktika");
            if config_dir.exists() && config_dir.is_dir() {
                return Some(ancestor.to_path_buf());
            }
        }

        None
    }

    /// Absolute path of the source tree
    pub fn source_path(&self) -> PathBuf {
        self.rooted(&self.source_root)
    }

    /// Absolute path of the playground overlay
    pub fn playground_path(&self) -> PathBuf {
        self.rooted(&self.playground_root)
    }

    fn rooted(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            match &self.workspace_root {
                Some(root) => root.join(path),
                None => path.to_path_buf(),
            }
        }
    }
}

/// Course metadata shown by the UI: title, description, and display titles
/// for chapter directories.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CourseConfig {
    #[serde(default = "default_course_title")]
    pub title: String,

    #[serde(default = "default_course_description")]
    pub description: String,

    #[serde(default, rename = "chapterTranslations")]
    pub chapter_translations: HashMap<String, String>,
}

fn default_course_title() -> String {
    "Курс".to_string()
}
fn default_course_description() -> String {
    "Описание курса".to_string()
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            title: default_course_title(),
            description: default_course_description(),
            chapter_translations: HashMap::new(),
        }
    }
}

/// Owned load-once cache for the course config.
///
/// The cache value lives in whatever long-lived context runs the server and
/// is invalidated explicitly, never through a free module-level variable.
#[derive(Debug)]
pub struct CourseConfigStore {
    path: PathBuf,
    cached: RwLock<Option<CourseConfig>>,
}

impl CourseConfigStore {
    /// Create a store reading `course.config.json` under the given root
    pub fn new(root: &Path) -> Self {
        Self {
            path: root.join("course.config.json"),
            cached: RwLock::new(None),
        }
    }

    /// Return the cached config, loading it from disk on first access.
    /// A missing or unparsable file yields the default config.
    pub async fn get(&self) -> CourseConfig {
        if let Some(config) = self.cached.read().await.as_ref() {
            return config.clone();
        }

        let loaded = self.load_from_disk().await;
        let mut guard = self.cached.write().await;
        // Another task may have loaded meanwhile; last write wins, both read
        // the same file.
        *guard = Some(loaded.clone());
        loaded
    }

    /// Drop the cached value so the next `get` re-reads the file
    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }

    async fn load_from_disk(&self) -> CourseConfig {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "course config is not valid JSON, using defaults"
                    );
                    CourseConfig::default()
                }
            },
            Err(_) => CourseConfig::default(),
        }
    }
}
