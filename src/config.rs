use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = ".pr-cart.toml";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// Largest page size the files endpoint honours.
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .pr-cart.toml.
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// API base URL, for GitHub Enterprise (default: https://api.github.com)
    pub api_url: Option<String>,
    /// Files fetched per page (1-100, default 100)
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Directory where checkout writes patch files (default: current directory)
    pub directory: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `path`, or from .pr-cart.toml in the current
    /// directory when no path is given. A missing default file yields the
    /// default config; an explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };

        if config.github.token.is_none() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                config.github.token = Some(token);
            }
        }

        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Resolve the GitHub token: config file value takes precedence,
    /// falls back to GITHUB_TOKEN env var.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    pub fn api_url(&self) -> &str {
        self.github.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn per_page(&self) -> u32 {
        self.github
            .per_page
            .unwrap_or(MAX_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// Where a patch named `filename` is written when no explicit path is given.
    pub fn output_path(&self, filename: &str) -> PathBuf {
        match &self.output.directory {
            Some(dir) => dir.join(filename),
            None => PathBuf::from(filename),
        }
    }
}
