#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::model::{PageSetup, PageSize, DEFAULT_TITLE};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, Validate,
};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use toml_config::FileConfig;
use tracing::debug;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_WORKERS: usize = 2;
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 30;

pub const ENV_CONFIG: &str = "MARKDOWN_PDF_CONFIG";
pub const ENV_HOST: &str = "MARKDOWN_PDF_HOST";
pub const ENV_PORT: &str = "MARKDOWN_PDF_PORT";
pub const ENV_WORKERS: &str = "MARKDOWN_PDF_WORKERS";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub max_body_bytes: usize,
    pub request_timeout_secs: u64,
    pub page_size: PageSize,
    /// Defaults to `workers` when unset.
    pub render_workers: Option<usize>,
    pub render_timeout_secs: u64,
    pub default_title: String,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            page_size: PageSize::A4,
            render_workers: None,
            render_timeout_secs: DEFAULT_RENDER_TIMEOUT_SECS,
            default_title: DEFAULT_TITLE.to_string(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// Values given on the command line. They win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub workers: Option<usize>,
    pub page_size: Option<PageSize>,
    pub log_json: bool,
}

impl AppConfig {
    /// Defaults, then the TOML file, then `MARKDOWN_PDF_*` environment
    /// variables, then command-line overrides.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = path {
            debug!("Loading config file {}", path.display());
            config.apply_file(FileConfig::from_file(path)?);
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        let FileConfig {
            server,
            render,
            logging,
        } = file;

        if let Some(host) = server.host {
            self.host = host;
        }
        if let Some(port) = server.port {
            self.port = port;
        }
        if let Some(workers) = server.workers {
            self.workers = workers;
        }
        if let Some(bytes) = server.max_body_bytes {
            self.max_body_bytes = bytes;
        }
        if let Some(secs) = server.request_timeout_seconds {
            self.request_timeout_secs = secs;
        }

        if let Some(size) = render.page_size {
            self.page_size = size;
        }
        if render.render_workers.is_some() {
            self.render_workers = render.render_workers;
        }
        if let Some(secs) = render.render_timeout_seconds {
            self.render_timeout_secs = secs;
        }
        if let Some(title) = render.default_title {
            self.default_title = title;
        }

        if let Some(level) = logging.level {
            self.log_level = level.to_ascii_lowercase();
        }
        if let Some(json) = logging.json {
            self.log_json = json;
        }
    }

    /// Reads `MARKDOWN_PDF_HOST`, `_PORT` and `_WORKERS` through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            self.host = host.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = parse_env(ENV_PORT, &port)?;
        }
        if let Some(workers) = lookup(ENV_WORKERS) {
            self.workers = parse_env(ENV_WORKERS, &workers)?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(host) = &overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(workers) = overrides.workers {
            self.workers = workers;
        }
        if let Some(size) = overrides.page_size {
            self.page_size = size;
        }
        if overrides.log_json {
            self.log_json = true;
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::InvalidConfigValueError {
            field: key.to_string(),
            value: raw.to_string(),
            reason: "expected a positive integer".to_string(),
        })
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("server.host", &self.host)?;
        validate_range("server.port", self.port, 1, u16::MAX)?;
        validate_positive_number("server.workers", self.workers, 1)?;
        validate_positive_number("server.max_body_bytes", self.max_body_bytes, 1024)?;
        validate_range(
            "server.request_timeout_seconds",
            self.request_timeout_secs,
            1,
            3600,
        )?;

        if let Some(render_workers) = self.render_workers {
            validate_positive_number("render.render_workers", render_workers, 1)?;
        }
        validate_range(
            "render.render_timeout_seconds",
            self.render_timeout_secs,
            1,
            3600,
        )?;
        validate_non_empty_string("render.default_title", &self.default_title)?;

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(AppError::InvalidConfigValueError {
                field: "logging.level".to_string(),
                value: self.log_level.clone(),
                reason: format!("Valid levels: {}", LOG_LEVELS.join(", ")),
            });
        }
        Ok(())
    }
}

impl ConfigProvider for AppConfig {
    fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn render_workers(&self) -> usize {
        self.render_workers.unwrap_or(self.workers)
    }

    fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    fn page_setup(&self) -> PageSetup {
        PageSetup::new(self.page_size)
    }

    fn default_title(&self) -> &str {
        &self.default_title
    }
}
