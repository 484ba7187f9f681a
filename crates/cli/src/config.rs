//! Configuration for the `labres` CLI.
//!
//! Values are resolved from, highest priority first: command-line flags,
//! `LABRES_*` environment variables, a TOML file, and built-in defaults.
//!
//! # Example
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8080"
//!
//! [results]
//! page_size = 10
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_PAGE_SIZE: usize = labres_core::DEFAULT_PAGE_SIZE;
pub const DEFAULT_CONFIG_FILE: &str = "labres.toml";

pub const ENV_API_URL: &str = "LABRES_API_URL";
pub const ENV_PAGE_SIZE: &str = "LABRES_PAGE_SIZE";
pub const ENV_CONFIG: &str = "LABRES_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("LABRES_PAGE_SIZE must be a positive integer, got '{0}'")]
    InvalidPageSize(String),

    #[error("page size must be at least 1")]
    ZeroPageSize,

    #[error("API base URL must not be empty")]
    EmptyApiUrl,
}

// ── File format ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub results: ResultsSection,
}

/// `[api]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    pub base_url: Option<String>,
}

/// `[results]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResultsSection {
    pub page_size: Option<usize>,
}

pub fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ── Resolution ───────────────────────────────────────────────────────────────

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub api_url: Option<String>,
    pub page_size: Option<usize>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub page_size: usize,
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn load(overrides: Overrides) -> Result<Settings, ConfigError> {
        Settings::resolve(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve settings using `env` to look up environment variables.
    ///
    /// An explicit config path (flag or `LABRES_CONFIG`) must exist; the
    /// implicit `./labres.toml` is only read when present.
    pub fn resolve<F>(overrides: Overrides, env: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit = overrides
            .config
            .clone()
            .or_else(|| env(ENV_CONFIG).filter(|p| !p.is_empty()).map(PathBuf::from));

        let file = match explicit {
            Some(path) => {
                tracing::debug!(path = %path.display(), "reading config file");
                read_config_file(&path)?
            }
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.is_file() {
                    tracing::debug!(path = DEFAULT_CONFIG_FILE, "reading config file");
                    read_config_file(implicit)?
                } else {
                    FileConfig::default()
                }
            }
        };

        let env_page_size = match env(ENV_PAGE_SIZE) {
            Some(raw) => Some(
                raw.trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidPageSize(raw.clone()))?,
            ),
            None => None,
        };

        let api_url = overrides
            .api_url
            .or_else(|| env(ENV_API_URL))
            .or(file.api.base_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let page_size = overrides
            .page_size
            .or(env_page_size)
            .or(file.results.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);

        if api_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        if page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }

        Ok(Settings {
            api_url: api_url.trim().to_string(),
            page_size,
        })
    }
}
