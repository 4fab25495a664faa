//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/companion/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/companion/` (~/.config/companion/)
//! - State/Logs: `$XDG_STATE_HOME/companion/` (~/.local/state/companion/)
//!
//! Agent identifiers are never compiled in. They come from the `[agent]`
//! table, optional `[surfaces.<id>]` overrides, or `COMPANION_*`
//! environment variables.

use crate::error::{Error, Result};
use crate::surface::ChatSurface;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Remote agent used by every surface unless overridden
    #[serde(default)]
    pub agent: AgentConfig,

    /// Per-surface overrides, keyed by surface id (e.g. `learner_quiz`)
    #[serde(default)]
    pub surfaces: HashMap<String, SurfaceOverride>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote agent configuration injected into request builders and transports
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Agent identifier
    #[serde(default)]
    pub agent_id: String,

    /// Agent alias identifier
    #[serde(default)]
    pub agent_alias_id: String,

    /// Region used to derive the default endpoint
    #[serde(default = "default_region")]
    pub region: String,

    /// API endpoint (optional, derived from region when absent)
    pub endpoint: Option<String>,

    /// Bearer credential (can also use env var)
    pub api_key: Option<String>,

    /// Whole-request timeout in seconds; no timeout when absent
    pub timeout_secs: Option<u64>,

    /// Connection establishment timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: String::new(),
            agent_alias_id: String::new(),
            region: default_region(),
            endpoint: None,
            api_key: None,
            timeout_secs: None,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

impl AgentConfig {
    /// Returns the explicit endpoint, or the regional agent runtime endpoint
    pub fn resolved_endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!(
                "https://bedrock-agent-runtime.{}.amazonaws.com",
                self.region
            ),
        }
    }

    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.agent_id.trim().is_empty() {
            return Err(Error::Config(
                "agent.agent_id is required (set it in config.toml or COMPANION_AGENT_ID)"
                    .to_string(),
            ));
        }
        if self.agent_alias_id.trim().is_empty() {
            return Err(Error::Config(
                "agent.agent_alias_id is required (set it in config.toml or COMPANION_AGENT_ALIAS_ID)"
                    .to_string(),
            ));
        }
        if self.region.trim().is_empty() {
            return Err(Error::Config("agent.region must not be empty".to_string()));
        }
        let endpoint = self.resolved_endpoint();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(Error::Config(format!(
                "agent.endpoint must be an http(s) URL, got {:?}",
                endpoint
            )));
        }
        Ok(())
    }
}

/// Override values for a single chat surface
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SurfaceOverride {
    /// Agent identifier for this surface
    pub agent_id: Option<String>,
    /// Agent alias identifier for this surface
    pub agent_alias_id: Option<String>,
    /// Greeting shown when the conversation view mounts
    pub greeting: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Config::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Apply `COMPANION_*` environment variables on top of the `[agent]` table
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = present("COMPANION_AGENT_ID") {
            self.agent.agent_id = v;
        }
        if let Some(v) = present("COMPANION_AGENT_ALIAS_ID") {
            self.agent.agent_alias_id = v;
        }
        if let Some(v) = present("COMPANION_REGION") {
            self.agent.region = v;
        }
        if let Some(v) = present("COMPANION_ENDPOINT") {
            self.agent.endpoint = Some(v);
        }
        if let Some(v) = present("COMPANION_API_KEY") {
            self.agent.api_key = Some(v);
        }
    }

    /// Agent configuration for a surface, with its overrides merged in
    pub fn agent_for(&self, surface: ChatSurface) -> AgentConfig {
        let mut agent = self.agent.clone();
        if let Some(overrides) = self.surfaces.get(surface.id()) {
            if let Some(agent_id) = &overrides.agent_id {
                agent.agent_id = agent_id.clone();
            }
            if let Some(alias) = &overrides.agent_alias_id {
                agent.agent_alias_id = alias.clone();
            }
        }
        agent
    }

    /// Greeting override for a surface, if configured
    pub fn greeting_for(&self, surface: ChatSurface) -> Option<&str> {
        self.surfaces
            .get(surface.id())
            .and_then(|o| o.greeting.as_deref())
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/companion/config.toml` (~/.config/companion/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("companion").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/companion/` (~/.local/state/companion/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("companion")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/companion/companion.log` (~/.local/state/companion/companion.log)
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("companion.log")
    }

    /// Ensure XDG base directory environment variables are set.
    ///
    /// This is mainly for CLI binaries that want explicit, stable path behavior
    /// before invoking other components that read these env vars.
    pub fn ensure_xdg_env() {
        let home = home_dir();

        if std::env::var("XDG_STATE_HOME").is_err() {
            std::env::set_var("XDG_STATE_HOME", home.join(".local/state"));
        }

        if std::env::var("XDG_CONFIG_HOME").is_err() {
            std::env::set_var("XDG_CONFIG_HOME", home.join(".config"));
        }
    }
}
