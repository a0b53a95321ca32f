use crate::classifier::DEFAULT_EXTENSIONS;
use crate::history::{DEFAULT_HISTORY_PATH, DEFAULT_MAX_ENTRIES};
use crate::output_formats::ReportFormat;
use crate::search::{SearchMode, SearchOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "repo-inspector";
const CONFIG_FILE_NAME: &str = ".repo-inspector.toml";

/// Converts a size limit in MB to bytes. Limits too large to represent
/// saturate, which never skips a file.
pub fn megabytes(mb: u64) -> u64 {
    mb.saturating_mul(1024 * 1024)
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_mode: SearchMode,
    pub default_extensions: Vec<String>,
    pub follow_links: bool,
    pub skip_binary: bool,
    pub max_file_size_mb: Option<u64>,
    pub exclude_dirs: Vec<String>,
    pub threads: Option<usize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_mode: SearchMode::Regex,
            default_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            follow_links: false,
            skip_binary: false,
            max_file_size_mb: None,
            exclude_dirs: vec![],
            threads: None,
        }
    }
}

impl SearchConfig {
    pub fn to_options(&self) -> SearchOptions {
        SearchOptions {
            follow_links: self.follow_links,
            skip_binary: self.skip_binary,
            max_file_size: self.max_file_size_mb.map(megabytes),
            exclude_dirs: self.exclude_dirs.clone(),
            threads: self.threads,
            cancel: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub formats: Vec<ReportFormat>,
    /// Matches echoed to the terminal after a search.
    pub preview_limit: usize,
    /// Attribute each match to its last author with `git blame`.
    pub blame: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("reports"),
            formats: vec![
                ReportFormat::Text,
                ReportFormat::Json,
                ReportFormat::Markdown,
            ],
            preview_limit: 10,
            blame: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub path: PathBuf,
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_HISTORY_PATH),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl Config {
    /// Loads `explicit` if given, otherwise the first config file found in
    /// the usual locations, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_path(),
        };
        match config_path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join(CONFIG_DIR_NAME).join("config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(CONFIG_FILE_NAME);
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(CONFIG_FILE_NAME);
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }
}
