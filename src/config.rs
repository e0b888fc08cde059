//! Session configuration loaded from TOML, the environment and CLI flags.

use crate::games::chess::Position;
use crate::session::ControllerOptions;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable overriding the move service base URL.
pub const MOVE_SERVICE_URL_ENV: &str = "STRICTLY_CHESS_MOVE_SERVICE_URL";

/// Named move service profile.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Engine {
    /// The regular engine.
    #[default]
    Standard,
    /// The stronger challenge bot.
    Challenge,
}

impl Engine {
    /// Path of this engine's endpoint on the move service.
    pub fn path(self) -> &'static str {
        match self {
            Engine::Standard => "/best-move",
            Engine::Challenge => "/best-move-mybot",
        }
    }
}

/// Settings for one playing session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct SessionConfig {
    /// Whether the human picks a side before playing.
    #[serde(default)]
    allow_color_choice: bool,

    /// Move service base URL.
    #[serde(default = "default_base_url")]
    #[setters(into)]
    base_url: String,

    /// Engine profile appended to the base URL.
    #[serde(default)]
    engine: Engine,

    /// Full endpoint URL, taking precedence over base URL and engine.
    #[serde(default)]
    #[setters(strip_option, into)]
    endpoint: Option<String>,

    /// Delay before each move request, in milliseconds.
    #[serde(default = "default_pacing_delay_ms")]
    pacing_delay_ms: u64,

    /// Upper bound on one move request, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    request_timeout_ms: u64,

    /// Starting position in FEN; the standard start when absent.
    #[serde(default)]
    #[setters(strip_option, into)]
    start_fen: Option<String>,
}

#[instrument]
fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

#[instrument]
fn default_pacing_delay_ms() -> u64 {
    300
}

#[instrument]
fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            allow_color_choice: false,
            base_url: default_base_url(),
            engine: Engine::default(),
            endpoint: None,
            pacing_delay_ms: default_pacing_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            start_fen: None,
        }
    }
}

impl SessionConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(url = %config.move_service_url(), "Config loaded successfully");
        Ok(config)
    }

    /// Applies `STRICTLY_CHESS_MOVE_SERVICE_URL` when set.
    #[instrument(skip(self))]
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(MOVE_SERVICE_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => {
                debug!(url = %url, "Base URL overridden from environment");
                self.with_base_url(url)
            }
            _ => self,
        }
    }

    /// URL move requests are posted to.
    pub fn move_service_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "{}{}",
                self.base_url.trim_end_matches('/'),
                self.engine.path()
            ),
        }
    }

    /// Delay before each move request.
    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    /// Upper bound on one move request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Builds the controller options, loading `start_fen` if set.
    #[instrument(skip(self))]
    pub fn controller_options(&self) -> Result<ControllerOptions, ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::new("request_timeout_ms must be positive"));
        }

        let start = match &self.start_fen {
            Some(fen) => Position::from_fen(fen)
                .map_err(|e| ConfigError::new(format!("Invalid start_fen: {}", e)))?,
            None => Position::new(),
        };
        Ok(ControllerOptions::new(self.allow_color_choice, start))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
