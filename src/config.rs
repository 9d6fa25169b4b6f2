//! Optional TOML configuration.
//!
//! Every key has a default, so an absent file and an empty file mean the same thing.
//! Relative paths are resolved against the project directory by [`Config::resolve`].

use crate::ai::openai::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::error::{Error, Result};
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File looked up in the project directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "apidocx.toml";

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const ENDPOINT_ENV: &str = "OPENAI_API_ENDPOINT";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Markdown artifact
    pub output: PathBuf,
    pub openapi_output: PathBuf,
    pub postman_output: PathBuf,
    /// ReDoc HTML artifact
    pub redoc_output: PathBuf,
    pub base_url: String,
    pub title: String,
    pub enable_ai: bool,
    pub ai: AiSettings,
    pub cache: CacheSettings,
    pub watch: WatchSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AiSettings {
    pub provider: String,
    pub model: String,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    /// Request timeout in seconds
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings {
    pub enabled: bool,
    pub store_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatchSettings {
    /// Watched files and directories; empty means the whole project
    pub paths: Vec<PathBuf>,
    /// Poll interval in seconds
    pub interval: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from("docs/api.md"),
            openapi_output: PathBuf::from("docs/api.json"),
            postman_output: PathBuf::from("docs/api.postman.json"),
            redoc_output: PathBuf::from("docs/api.html"),
            base_url: "http://localhost".to_string(),
            title: "API Documentation".to_string(),
            enable_ai: true,
            ai: AiSettings::default(),
            cache: CacheSettings::default(),
            watch: WatchSettings::default(),
        }
    }
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            endpoint: None,
            timeout: 15,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            store_path: PathBuf::from(".apidocx/cache.json"),
        }
    }
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            interval: 2,
        }
    }
}

impl AiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Configured endpoint, or the public chat-completion endpoint.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }
}

impl WatchSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }
}

impl Config {
    /// Loads `explicit`, or `<project>/apidocx.toml` when it exists, or the defaults.
    ///
    /// # Errors
    ///
    /// An explicit file that does not exist, any unreadable file, or invalid TOML.
    pub fn load(project: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = project.join(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    debug!("No {} in {}, using defaults", DEFAULT_CONFIG_FILE, project.display());
                    return Ok(Self::default());
                }
                candidate
            }
        };

        info!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(&path).map_err(|e| Error::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Self::from_toml(&content).map_err(|e| Error::Config {
            path,
            message: e.to_string(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Fills unset AI credentials from the environment and anchors relative paths at
    /// `project`.
    pub fn resolve(mut self, project: &Path) -> Self {
        self.apply_env(|name| std::env::var(name).ok());

        for path in [
            &mut self.output,
            &mut self.openapi_output,
            &mut self.postman_output,
            &mut self.redoc_output,
            &mut self.cache.store_path,
        ] {
            anchor(path, project);
        }
        for path in &mut self.watch.paths {
            anchor(path, project);
        }

        self
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.ai.api_key.is_none() {
            self.ai.api_key = lookup(API_KEY_ENV).filter(|v| !v.is_empty());
        }
        if self.ai.endpoint.is_none() {
            self.ai.endpoint = lookup(ENDPOINT_ENV).filter(|v| !v.is_empty());
        }
    }
}

fn anchor(path: &mut PathBuf, project: &Path) {
    if path.is_relative() {
        *path = project.join(&*path);
    }
}
