// src/config/mod.rs
//! Runtime configuration: TOML file with serde defaults, then env overrides.
//!
//! Lookup order for the file:
//! 1) `$FACTCHECK_CONFIG_PATH` (must exist when set)
//! 2) `config/factcheck.toml`
//! 3) built-in defaults

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENV_CONFIG_PATH: &str = "FACTCHECK_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/factcheck.toml";

pub const ENV_API_BASE_URL: &str = "FACTCHECK_API_BASE_URL";
pub const ENV_API_TOKEN: &str = "FACTCHECK_API_TOKEN";
pub const ENV_PAGE_SIZE: &str = "FACTCHECK_PAGE_SIZE";
pub const ENV_PORT: &str = "PORT";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_PAGE_SIZE: usize = 12;
pub const DEFAULT_HISTORY_CAP: usize = 20;
pub const DEFAULT_SUGGESTION_MIN_CHARS: usize = 2;

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}
fn default_connect_timeout_secs() -> u64 {
    4
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    concat!("factcheck-news/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
fn default_history_cap() -> usize {
    DEFAULT_HISTORY_CAP
}
fn default_suggestion_min_chars() -> usize {
    DEFAULT_SUGGESTION_MIN_CHARS
}
fn default_storage_dir() -> PathBuf {
    PathBuf::from("cache/factcheck")
}
fn default_bind() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3001
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FactcheckConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Bearer credential; usually injected through `FACTCHECK_API_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    #[serde(default = "default_suggestion_min_chars")]
    pub suggestion_min_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            history_cap: default_history_cap(),
            suggestion_min_chars: default_suggestion_min_chars(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for the key-value files (search history). `None` keeps it in memory.
    #[serde(default = "default_storage_dir_opt")]
    pub dir: Option<PathBuf>,
}

fn default_storage_dir_opt() -> Option<PathBuf> {
    Some(default_storage_dir())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir_opt(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Optional JSON seed: `{"news": [...], "comments": [...], "votes": [...]}`.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            seed_path: None,
        }
    }
}

impl FactcheckConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: FactcheckConfig =
            toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// File lookup (see module docs), then env overrides.
    pub fn load() -> Result<Self> {
        let cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from_file(&default_p)?
            } else {
                info!(target: "config", "no config file found, using defaults");
                Self::default()
            }
        };
        Ok(cfg.with_env_overrides())
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_API_BASE_URL) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
        if let Ok(token) = std::env::var(ENV_API_TOKEN) {
            let t = token.trim();
            self.api.token = (!t.is_empty()).then(|| t.to_string());
        }
        if let Some(v) = parse_env::<usize>(ENV_PAGE_SIZE) {
            self.listing.page_size = v;
            self.search.page_size = v;
        }
        if let Some(v) = parse_env::<u16>(ENV_PORT) {
            self.server.port = v;
        }
        self.sanitized()
    }

    fn sanitized(mut self) -> Self {
        if self.listing.page_size == 0 {
            self.listing.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.search.page_size == 0 {
            self.search.page_size = DEFAULT_PAGE_SIZE;
        }
        self.search.history_cap = self.search.history_cap.clamp(1, DEFAULT_HISTORY_CAP);
        if self.search.suggestion_min_chars == 0 {
            self.search.suggestion_min_chars = DEFAULT_SUGGESTION_MIN_CHARS;
        }
        self
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(target: "config", key, value = %raw, "ignoring unparsable env override");
            None
        }
    }
}
