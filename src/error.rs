//! Error types and handling for the TourGuide application

use thiserror::Error;

/// Main error type for the TourGuide application
#[derive(Error, Debug)]
pub enum TourGuideError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TourGuideError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message.
    ///
    /// Upstream error bodies and transport details never reach the
    /// user through this path.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TourGuideError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            TourGuideError::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            TourGuideError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TourGuideError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            TourGuideError::General { message } => message.clone(),
        }
    }
}
