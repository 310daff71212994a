//! Client configuration.
//!
//! Loaded in order of precedence:
//! 1. Command-line flags (highest priority)
//! 2. Environment variables
//! 3. Config file (~/.config/venta-libre/config.toml)
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use venta_nexus::ReloadPolicy;


pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1";

/// Where the home page gets its products from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSource {
    /// Generated on the client.
    #[default]
    Mock,
    /// `GET /products` on the API.
    Api,
}

impl std::str::FromStr for ProductSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "api" => Ok(Self::Api),
            other => Err(format!("Unknown product source: '{other}'. Available: mock, api")),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read config file {}: {source}", path.display()))]
    Read { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to parse config file {}: {source}", path.display()))]
    Parse { path: PathBuf, source: toml::de::Error },

    #[snafu(display("Invalid value for {key}: {message}"))]
    Invalid { key: &'static str, message: String },
}

/// Effective configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL every API path is appended to
    pub api_url: String,

    pub source: ProductSource,

    /// Quiet time after the last keystroke before the search applies
    pub search_debounce: Duration,

    /// How long the error banner stays up
    pub toast_duration: Duration,

    /// Size of the generated catalog when `source = "mock"`
    pub mock_products: usize,

    /// Simulated latency of the generated catalog
    pub mock_latency: Duration,

    pub reload_policy: ReloadPolicy,

    /// Path mounted at startup
    pub start_path: String,

    pub log_dir: PathBuf,

    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            source: ProductSource::Mock,
            search_debounce: Duration::from_millis(300),
            toast_duration: Duration::from_secs(5),
            mock_products: 24,
            mock_latency: Duration::from_millis(400),
            reload_policy: ReloadPolicy::SamePath,
            start_path: "/".to_string(),
            log_dir: default_log_dir(),
            log_level: "info".to_string(),
        }
    }
}

/// Config file structure. Every key is optional.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub api_url: Option<String>,
    pub source: Option<ProductSource>,
    pub search_debounce_ms: Option<u64>,
    pub toast_secs: Option<u64>,
    pub mock_products: Option<usize>,
    pub mock_latency_ms: Option<u64>,
    pub reload_policy: Option<String>,
    pub start_path: Option<String>,
    pub log_dir: Option<String>,
    pub log_level: Option<String>,
}

/// Values taken from the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub source: Option<ProductSource>,
    pub start_path: Option<String>,
    pub reload_policy: Option<ReloadPolicy>,
}

impl Config {
    /// ~/.config/venta-libre/config.toml
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("venta-libre").join("config.toml"))
    }

    /// Load file, environment and overrides. A missing file is fine, a
    /// broken one is an error.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = match path.map(Path::to_path_buf).or_else(Self::config_path) {
            Some(path) => Self::read_file(&path)?,
            None => FileConfig::default(),
        };
        let mut config = Self::resolve(file, |key| std::env::var(key).ok())?;
        config.apply(overrides)?;
        Ok(config)
    }

    pub(crate) fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).context(ParseSnafu { path }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Merge env > file > default.
    pub(crate) fn resolve<E>(file: FileConfig, env: E) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = env("VENTA_LIBRE_API_URL")
            .or(file.api_url)
            .unwrap_or(defaults.api_url);
        check_api_url(&api_url)?;

        let source = match env("VENTA_LIBRE_SOURCE") {
            Some(raw) => raw
                .parse()
                .map_err(|message| ConfigError::Invalid { key: "source", message })?,
            None => file.source.unwrap_or(defaults.source),
        };

        let reload_policy = match file.reload_policy {
            Some(raw) => raw
                .parse()
                .map_err(|message| ConfigError::Invalid { key: "reload_policy", message })?,
            None => defaults.reload_policy,
        };

        let start_path = file.start_path.unwrap_or(defaults.start_path);
        check_start_path(&start_path)?;

        let log_dir = env("VENTA_LIBRE_LOG_DIR")
            .or(file.log_dir)
            .map(PathBuf::from)
            .unwrap_or(defaults.log_dir);

        let log_level = env("VENTA_LIBRE_LOG_LEVEL")
            .or(file.log_level)
            .unwrap_or(defaults.log_level);

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            source,
            search_debounce: file
                .search_debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.search_debounce),
            toast_duration: file
                .toast_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.toast_duration),
            mock_products: file.mock_products.unwrap_or(defaults.mock_products),
            mock_latency: file
                .mock_latency_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.mock_latency),
            reload_policy,
            start_path,
            log_dir,
            log_level,
        })
    }

    /// Apply command-line overrides on top. Flags get the same checks as
    /// file and environment values.
    pub fn apply(&mut self, overrides: &Overrides) -> Result<(), ConfigError> {
        if let Some(url) = &overrides.api_url {
            check_api_url(url)?;
            self.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(source) = overrides.source {
            self.source = source;
        }
        if let Some(path) = &overrides.start_path {
            check_start_path(path)?;
            self.start_path = path.clone();
        }
        if let Some(policy) = overrides.reload_policy {
            self.reload_policy = policy;
        }
        Ok(())
    }

    /// Render as a config file. `Config::default().to_toml()` is the template.
    pub fn to_toml(&self) -> String {
        let file = FileConfig {
            api_url: Some(self.api_url.clone()),
            source: Some(self.source),
            search_debounce_ms: Some(self.search_debounce.as_millis() as u64),
            toast_secs: Some(self.toast_duration.as_secs()),
            mock_products: Some(self.mock_products),
            mock_latency_ms: Some(self.mock_latency.as_millis() as u64),
            reload_policy: Some(self.reload_policy.to_string()),
            start_path: Some(self.start_path.clone()),
            log_dir: Some(self.log_dir.display().to_string()),
            log_level: Some(self.log_level.clone()),
        };
        toml::to_string_pretty(&file).unwrap_or_default()
    }
}

fn check_api_url(url: &str) -> Result<(), ConfigError> {
    ensure!(
        url.starts_with("http://") || url.starts_with("https://"),
        InvalidSnafu {
            key: "api_url",
            message: format!("'{url}' is not an http(s) URL"),
        }
    );
    Ok(())
}

fn check_start_path(path: &str) -> Result<(), ConfigError> {
    ensure!(
        path.starts_with('/'),
        InvalidSnafu {
            key: "start_path",
            message: format!("'{path}' must start with '/'"),
        }
    );
    Ok(())
}

fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|p| p.join("venta-libre").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}
