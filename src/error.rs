//! Error types and handling for the SymptoCare client

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the SymptoCare client
#[derive(Error, Debug)]
pub enum SymptoCareError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Endpoint communication errors
    #[error("API error: {source}")]
    Api {
        #[from]
        source: ApiError,
    },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Speech capability errors
    #[error("Speech error: {message}")]
    Speech { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl SymptoCareError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new speech error
    pub fn speech<S: Into<String>>(message: S) -> Self {
        Self::Speech {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SymptoCareError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            SymptoCareError::Api { source } => source.display_message(),
            SymptoCareError::Validation { message } => format!("Invalid input: {message}"),
            SymptoCareError::Speech { message } => message.clone(),
            SymptoCareError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

/// Failure of a single endpoint call
#[derive(Error, Debug)]
pub enum ApiError {
    /// The server answered with a non-success status
    #[error("Request failed with status code {}", .status.as_u16())]
    Status {
        status: StatusCode,
        /// The `error` field of the response body, when there was one
        server_message: Option<String>,
    },

    /// The request never produced a response
    #[error("{0}")]
    Transport(String),

    /// The response body was not the JSON we expected
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message shown to the user: the server's own description if it sent
    /// one, otherwise the transport-level message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            ApiError::Status {
                server_message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest_middleware::Error> for ApiError {
    fn from(err: reqwest_middleware::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
