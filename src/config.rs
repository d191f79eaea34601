//! Configuration management for the SymptoCare client
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::SymptoCareError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the SymptoCare client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptoCareConfig {
    /// Backend server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Speech capability configuration
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Trace and log export configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Backend server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL the endpoint paths are joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds, 0 keeps the transport default
    #[serde(default)]
    pub timeout_seconds: u32,
}

/// Speech settings. A missing command means the capability is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Recognition language tag
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Text-to-speech program and leading arguments, e.g. `["espeak-ng"]`
    #[serde(default)]
    pub synthesis_command: Option<Vec<String>>,
    /// Speech-to-text program and leading arguments
    #[serde(default)]
    pub recognition_command: Option<Vec<String>>,
    /// Upper bound in seconds on one recognition session, speech included
    #[serde(default = "default_recognition_timeout")]
    pub recognition_timeout_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// OTLP/HTTP collector endpoint; export is off when unset
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_locale() -> String {
    "en-IN".to_string()
}

fn default_recognition_timeout() -> u32 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: 0,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            synthesis_command: None,
            recognition_command: None,
            recognition_timeout_seconds: default_recognition_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for SymptoCareConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            speech: SpeechConfig::default(),
            logging: LoggingConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl SymptoCareConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SYMPTOCARE_SERVER__BASE_URL=... style overrides
        builder = builder.add_source(
            Environment::with_prefix("SYMPTOCARE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SymptoCareConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("symptocare").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.base_url.is_empty() {
            self.server.base_url = default_base_url();
        }
        if self.speech.locale.is_empty() {
            self.speech.locale = default_locale();
        }
        if self.speech.recognition_timeout_seconds == 0 {
            self.speech.recognition_timeout_seconds = default_recognition_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if matches!(&self.speech.synthesis_command, Some(cmd) if cmd.is_empty()) {
            self.speech.synthesis_command = None;
        }
        if matches!(&self.speech.recognition_command, Some(cmd) if cmd.is_empty()) {
            self.speech.recognition_command = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.timeout_seconds > 300 {
            return Err(
                SymptoCareError::config("Server timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.speech.recognition_timeout_seconds > 120 {
            return Err(SymptoCareError::config(
                "Recognition timeout cannot exceed 120 seconds",
            )
            .into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SymptoCareError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SymptoCareError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !is_http_url(&self.server.base_url) {
            return Err(SymptoCareError::config(
                "Server base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if let Some(endpoint) = &self.telemetry.otlp_endpoint {
            if !is_http_url(endpoint) {
                return Err(SymptoCareError::config(
                    "OTLP endpoint must be a valid HTTP or HTTPS URL",
                )
                .into());
            }
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
