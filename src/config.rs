use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::state::DEFAULT_TIME_LIMIT_SECS;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorMode {
    /// Highlight the whole current word.
    #[default]
    Highlight,
    /// Mark the last typed character of the current word.
    Caret,
}

impl CursorMode {
    pub fn toggled(self) -> Self {
        match self {
            CursorMode::Highlight => CursorMode::Caret,
            CursorMode::Caret => CursorMode::Highlight,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CursorMode::Highlight => "highlight",
            CursorMode::Caret => "caret",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_time_limit_secs")]
    pub time_limit_secs: u32,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub relay_addr: Option<String>,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub cursor_mode: CursorMode,
    #[serde(default)]
    pub share_command: Option<Vec<String>>,
    #[serde(default = "default_clipboard_command")]
    pub clipboard_command: Option<Vec<String>>,
}

fn default_time_limit_secs() -> u32 {
    DEFAULT_TIME_LIMIT_SECS
}
fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_clipboard_command() -> Option<Vec<String>> {
    crate::share::default_clipboard_command()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_limit_secs: default_time_limit_secs(),
            api_url: default_api_url(),
            offline: false,
            relay_addr: None,
            theme: default_theme(),
            cursor_mode: CursorMode::default(),
            share_command: None,
            clipboard_command: default_clipboard_command(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typetype")
            .join("config.toml")
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("typetype")
    }

    /// Repair values a hand-edited file may have broken.
    pub fn normalize(&mut self) {
        if self.time_limit_secs == 0 {
            self.time_limit_secs = default_time_limit_secs();
        }
        if self.relay_addr.as_deref().is_some_and(|a| a.trim().is_empty()) {
            self.relay_addr = None;
        }
    }
}
