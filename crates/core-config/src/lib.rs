//! Configuration loading and parsing.
//!
//! Parses `tabpad.toml` (or an override path provided by the binary). Every
//! section and field is optional; absent values take the defaults below, and
//! unknown fields are ignored so older binaries tolerate newer files. A file
//! that fails to parse is logged and replaced by defaults rather than
//! aborting startup.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "tabpad.toml";
const APP_DIR: &str = "tabpad";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct NotifyConfig {
    #[serde(default = "NotifyConfig::default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "NotifyConfig::default_fade_step_ms")]
    pub fade_step_ms: u64,
    #[serde(default = "NotifyConfig::default_opacity_step")]
    pub opacity_step: f32,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            duration_ms: Self::default_duration_ms(),
            fade_step_ms: Self::default_fade_step_ms(),
            opacity_step: Self::default_opacity_step(),
        }
    }
}

impl NotifyConfig {
    const fn default_duration_ms() -> u64 {
        1000
    }
    const fn default_fade_step_ms() -> u64 {
        20
    }
    const fn default_opacity_step() -> f32 {
        0.05
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn fade_step(&self) -> Duration {
        Duration::from_millis(self.fade_step_ms.max(1))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    #[serde(default = "SessionConfig::default_ttl_days")]
    pub ttl_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_days: Self::default_ttl_days(),
        }
    }
}

impl SessionConfig {
    const fn default_ttl_days() -> i64 {
        7
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_tab_width")]
    pub tab_width: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: Self::default_tab_width(),
        }
    }
}

impl EditorConfig {
    const fn default_tab_width() -> usize {
        4
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub source: Option<PathBuf>, // file the values came from, if any
    pub file: ConfigFile,
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join(APP_DIR).join(CONFIG_FILE_NAME);
    }
    PathBuf::from(CONFIG_FILE_NAME)
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_defaults_no_file");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                source: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Directory backing the file store: configured value, else the platform
    /// data dir, else a local `.tabpad` directory.
    pub fn storage_dir(&self) -> PathBuf {
        if let Some(dir) = &self.file.storage.dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".tabpad"))
    }

    /// Directory downloads are written into (working directory by default).
    pub fn export_dir(&self) -> PathBuf {
        self.file
            .export
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn session_ttl_days(&self) -> i64 {
        self.file.session.ttl_days.max(1)
    }

    pub fn tab_width(&self) -> usize {
        self.file.editor.tab_width.max(1)
    }
}
