//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `airhub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use airhub_app::ingestor::TelemetryMode;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Station server settings.
    pub server: ServerConfig,
    /// Station scoping.
    pub station: StationConfig,
    /// Telemetry source settings.
    pub telemetry: TelemetryConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Station server endpoints.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// REST base URL of the station server.
    pub base_url: String,
    /// WebSocket endpoint. Empty means "derive from `base_url`".
    pub ws_url: String,
}

/// Which station this instance automates.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    /// Station identifier used for scoping requests.
    pub id: String,
}

/// Telemetry source configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `live` or `simulation`.
    pub mode: String,
    /// Delay between WebSocket reconnect attempts, in milliseconds.
    pub reconnect_delay_ms: u64,
    /// Tick period of simulation mode, in milliseconds.
    pub simulation_interval_ms: u64,
    /// Fixed generator seed; absent means seed from the clock.
    pub simulation_seed: Option<u64>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `airhub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// the resulting values do not validate.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("airhub.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("AIRHUB_BASE_URL") {
            self.server.base_url = val;
        }
        if let Ok(val) = std::env::var("AIRHUB_WS_URL") {
            self.server.ws_url = val;
        }
        if let Ok(val) = std::env::var("AIRHUB_STATION") {
            self.station.id = val;
        }
        if let Ok(val) = std::env::var("AIRHUB_MODE") {
            self.telemetry.mode = val;
        }
        if let Ok(val) = std::env::var("AIRHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.server.base_url)
            .map_err(|err| ConfigError::Validation(format!("invalid base_url: {err}")))?;
        if !matches!(self.telemetry.mode.as_str(), "live" | "simulation") {
            return Err(ConfigError::Validation(format!(
                "mode must be 'live' or 'simulation', got '{}'",
                self.telemetry.mode
            )));
        }
        if self.telemetry.simulation_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "simulation_interval_ms must be non-zero".to_string(),
            ));
        }
        if self.station.id.is_empty() {
            return Err(ConfigError::Validation(
                "station id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The REST base URL.
    ///
    /// # Errors
    ///
    /// Fails when the configured value is not a valid URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.server.base_url)
            .map_err(|err| ConfigError::Validation(format!("invalid base_url: {err}")))
    }

    /// The WebSocket endpoint: the explicit `ws_url` when set, otherwise
    /// the base URL with its scheme switched to `ws`/`wss` plus `/ws`.
    ///
    /// # Errors
    ///
    /// Fails when the resulting value is not a valid URL.
    pub fn ws_url(&self) -> Result<Url, ConfigError> {
        let raw = if self.server.ws_url.is_empty() {
            format!(
                "{}/ws",
                self.server
                    .base_url
                    .replacen("http", "ws", 1)
                    .trim_end_matches('/')
            )
        } else {
            self.server.ws_url.clone()
        };
        Url::parse(&raw).map_err(|err| ConfigError::Validation(format!("invalid ws_url: {err}")))
    }

    /// The configured telemetry mode.
    #[must_use]
    pub fn telemetry_mode(&self) -> TelemetryMode {
        match self.telemetry.mode.as_str() {
            "simulation" => TelemetryMode::Simulation,
            // anything else was rejected in validate()
            _ => TelemetryMode::Live,
        }
    }

    /// Delay between reconnect attempts.
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.telemetry.reconnect_delay_ms)
    }

    /// Tick period of simulation mode.
    #[must_use]
    pub fn simulation_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry.simulation_interval_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            ws_url: String::new(),
        }
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            id: "station_01".to_string(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            mode: "live".to_string(),
            reconnect_delay_ms: 5000,
            simulation_interval_ms: 3000,
            simulation_seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "airhubd=info,airhub=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
