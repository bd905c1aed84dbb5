//! Configuration loading for chattyd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.chatty/config.toml` (user)
//! 3. `/etc/chatty/config.toml` (system)
//!
//! When no file exists the built-in defaults apply, so the service can run on
//! environment variables alone. Environment overrides are applied after the
//! file (see [`Config::apply_env`]).
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.chatty/secrets.toml` (user, must be 0600 or 0400)
//! 2. `/etc/chatty/secrets.toml` (system, must be 0600 or 0400)
//! 3. `HF_API_KEY` environment variable

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::cache::CacheConfig;
use crate::policy::QualityFilter;
use crate::providers::{DEFAULT_MODELS, huggingface};
use crate::types::GenerationParams;
use crate::{ChattyError, Result};

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub quality: QualityFilter,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind to (default: 0.0.0.0).
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port (default: 3000).
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl ServerConfig {
    /// `host:port` for binding.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Hosted generator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Inference API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Models to rotate through, in priority order.
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    /// Maximum generated tokens (default: 150).
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    /// Sampling temperature (default: 0.7).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Per-attempt request timeout in seconds (default: 45).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            models: default_models(),
            max_new_tokens: default_max_new_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    huggingface::DEFAULT_BASE_URL.to_string()
}

fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
}

fn default_max_new_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout() -> u64 {
    huggingface::DEFAULT_TIMEOUT.as_secs()
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams::new()
            .max_new_tokens(self.max_new_tokens)
            .temperature(self.temperature)
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Entry time-to-live in seconds (default: 3600).
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
    /// Maximum cached entries (default: 10,000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_ttl() -> u64 {
    3600
}

fn default_max_entries() -> u64 {
    10_000
}

impl CacheSection {
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .ttl(Duration::from_secs(self.ttl_secs))
            .max_entries(self.max_entries)
    }
}

/// Environment variables that override file configuration.
pub const ENV_PORT: &str = "PORT";
pub const ENV_MODELS: &str = "HF_MODELS";
pub const ENV_BASE_URL: &str = "HF_BASE_URL";
pub const ENV_CACHE_TTL: &str = "CACHE_TTL_SECS";

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.chatty/config.toml`
    /// 3. `/etc/chatty/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ChattyError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            ChattyError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path, if any.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(ChattyError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".chatty").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/chatty/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Blank values are ignored. Unparseable numbers are configuration errors.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(port) = get(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|e| {
                ChattyError::Configuration(format!("Invalid {ENV_PORT} {port:?}: {e}"))
            })?;
        }

        if let Some(models) = get(ENV_MODELS) {
            let models: Vec<String> = models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
            if !models.is_empty() {
                self.upstream.models = models;
            }
        }

        if let Some(url) = get(ENV_BASE_URL) {
            self.upstream.base_url = url.trim().to_string();
        }

        if let Some(ttl) = get(ENV_CACHE_TTL) {
            self.cache.ttl_secs = ttl.trim().parse().map_err(|e| {
                ChattyError::Configuration(format!("Invalid {ENV_CACHE_TTL} {ttl:?}: {e}"))
            })?;
        }

        Ok(())
    }
}

/// Secrets configuration (API keys).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub huggingface: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

/// Environment variable holding the HuggingFace token.
pub const ENV_API_KEY: &str = "HF_API_KEY";

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.chatty/secrets.toml` (if exists, must be 0600 or 0400)
    /// 2. `/etc/chatty/secrets.toml` (if exists, must be 0600 or 0400)
    ///
    /// Returns empty secrets if no file exists (the key may come from env).
    pub fn load() -> Result<Self> {
        Self::load_first(&Self::standard_paths())
    }

    /// Like [`Secrets::load`], but an unusable secrets file is logged and
    /// skipped so the `HF_API_KEY` lookup and fallback-only mode still apply.
    pub fn load_or_default() -> Self {
        Self::load_first_or_default(&Self::standard_paths())
    }

    /// Load the first existing file among `candidates`.
    pub fn load_first(candidates: &[PathBuf]) -> Result<Self> {
        match candidates.iter().find(|path| path.exists()) {
            Some(path) => {
                Self::check_permissions(path)?;
                Self::load_from_file(path)
            }
            None => Ok(Secrets::default()),
        }
    }

    /// [`Secrets::load_first`], with empty secrets whenever that fails.
    pub fn load_first_or_default(candidates: &[PathBuf]) -> Self {
        Self::load_first(candidates).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring secrets file, serving without it");
            Secrets::default()
        })
    }

    fn standard_paths() -> Vec<PathBuf> {
        let mut paths = Vec::with_capacity(2);
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".chatty").join("secrets.toml"));
        }
        paths.push(PathBuf::from("/etc/chatty/secrets.toml"));
        paths
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ChattyError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            ChattyError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            ChattyError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(ChattyError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// HuggingFace API key: secrets file first, then `HF_API_KEY`.
    ///
    /// Blank keys count as missing.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    /// [`Secrets::api_key`] with an arbitrary variable lookup.
    pub fn api_key_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let usable = |key: String| Some(key.trim().to_string()).filter(|k| !k.is_empty());
        self.huggingface
            .as_ref()
            .and_then(|s| usable(s.api_key.clone()))
            .or_else(|| lookup(ENV_API_KEY).and_then(&usable))
    }
}
