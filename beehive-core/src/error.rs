//! Error types for the Beehive core library.
//!
//! Background polls never surface errors to the caller: they are recorded on the poll
//! status and logged. Everything a user explicitly asks for (sending, uploading, editing,
//! loading configuration) returns a [`BeehiveError`] so front-ends can render it.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Config | Environment, config file and validation errors |
//! | E2001-E2099 | Session | Missing credential, role or identity |
//! | E3001-E3099 | API | Transport, status, decode and timeout errors |
//! | E4001-E4099 | Validation | Client-side precondition failures |
//! | E5001-E5099 | Polling | Poll session lifecycle errors |
//! | E9001-E9099 | General | Internal, IO and serialization errors |

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

use crate::api::SubmitError;
use crate::config::ConfigLoadError;
use crate::sync::FetchError;

/// The main error type for the Beehive core library.
#[derive(Debug, Error)]
pub enum BeehiveError {
    // ========================================================================
    // Configuration Errors (E1001-E1099)
    // ========================================================================
    /// Configuration file parse error
    #[error("[E1001] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// Invalid configuration value
    #[error("[E1002] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    /// Environment variable has invalid value
    #[error("[E1003] Invalid environment variable '{name}': {message}")]
    InvalidEnvVar { name: String, message: String },

    // ========================================================================
    // Session Errors (E2001-E2099)
    // ========================================================================
    /// No bearer token or user id is configured
    #[error("[E2001] No active session: {0}")]
    MissingSession(String),

    /// The backend rejected the credential
    #[error("[E2002] Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The session role is not allowed to perform the operation
    #[error("[E2003] Forbidden: {0}")]
    Forbidden(String),

    // ========================================================================
    // API Errors (E3001-E3099)
    // ========================================================================
    /// API request failed with a non-success status
    #[error("[E3001] API request failed with status {status}: {message}")]
    ApiStatus { status: u16, message: String },

    /// API request failed before a response arrived
    #[error("[E3002] API request failed: {0}")]
    ApiRequestFailed(String),

    /// API response parse error
    #[error("[E3003] Failed to parse API response: {0}")]
    ApiParseError(String),

    /// Request exceeded the client-side timeout
    #[error("[E3004] Request timed out after {0:?}")]
    Timeout(Duration),

    /// Backend is unreachable
    #[error("[E3005] API service unavailable: {0}")]
    ServiceUnavailable(String),

    // ========================================================================
    // Validation Errors (E4001-E4099)
    // ========================================================================
    /// A required field is empty or malformed
    #[error("[E4001] Validation error: {0}")]
    ValidationError(String),

    /// The resource key does not identify anything
    #[error("[E4002] Invalid resource key: {0}")]
    InvalidKey(String),

    // ========================================================================
    // Polling Errors (E5001-E5099)
    // ========================================================================
    /// Poll session is not running
    #[error("[E5001] Poll session for '{0}' is not running")]
    PollNotRunning(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (catch-all for unexpected conditions)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("[E9002] IO error: {0}")]
    IoError(String),

    /// Serialization/deserialization error
    #[error("[E9003] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for Beehive operations.
pub type BeehiveResult<T> = Result<T, BeehiveError>;

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<reqwest::Error> for BeehiveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BeehiveError::Timeout(Duration::from_secs(0))
        } else if err.is_connect() {
            BeehiveError::ServiceUnavailable(err.to_string())
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                401 => BeehiveError::AuthenticationFailed(status.to_string()),
                403 => BeehiveError::Forbidden(status.to_string()),
                code => BeehiveError::ApiStatus {
                    status: code,
                    message: err.to_string(),
                },
            }
        } else if err.is_decode() {
            BeehiveError::ApiParseError(err.to_string())
        } else {
            BeehiveError::ApiRequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BeehiveError {
    fn from(err: serde_json::Error) -> Self {
        BeehiveError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for BeehiveError {
    fn from(err: std::io::Error) -> Self {
        BeehiveError::IoError(err.to_string())
    }
}

impl From<config::ConfigError> for BeehiveError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => BeehiveError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => BeehiveError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => BeehiveError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => BeehiveError::ConfigParseError(err.to_string()),
        }
    }
}

impl From<ConfigLoadError> for BeehiveError {
    fn from(err: ConfigLoadError) -> Self {
        match err {
            ConfigLoadError::Config(inner) => inner.into(),
            ConfigLoadError::MissingRequired(key) if key.starts_with("auth.") => {
                BeehiveError::MissingSession(format!("{} is not configured", key))
            }
            ConfigLoadError::MissingRequired(key) => BeehiveError::InvalidConfigValue {
                key,
                message: "Missing required value".to_string(),
            },
            ConfigLoadError::InvalidValue { key, message } => {
                BeehiveError::InvalidConfigValue { key, message }
            }
            ConfigLoadError::Io(inner) => inner.into(),
            ConfigLoadError::Serialize(inner) => BeehiveError::SerializationError(inner.to_string()),
        }
    }
}

impl From<FetchError> for BeehiveError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InvalidKey => BeehiveError::InvalidKey("empty resource key".to_string()),
            FetchError::Transport {
                status: Some(401), ..
            } => BeehiveError::AuthenticationFailed("bearer token rejected".to_string()),
            FetchError::Transport {
                status: Some(403), ..
            } => BeehiveError::Forbidden("resource requires another role".to_string()),
            FetchError::Transport {
                status: Some(status),
                message,
            } => BeehiveError::ApiStatus { status, message },
            FetchError::Transport {
                status: None,
                message,
            } => BeehiveError::ServiceUnavailable(message),
            FetchError::Timeout(after) => BeehiveError::Timeout(after),
            FetchError::Decode(message) => BeehiveError::ApiParseError(message),
        }
    }
}

impl From<SubmitError> for BeehiveError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(message) => BeehiveError::ValidationError(message),
            SubmitError::Forbidden(message) => BeehiveError::Forbidden(message),
            SubmitError::Transport {
                status: Some(401), ..
            } => BeehiveError::AuthenticationFailed("bearer token rejected".to_string()),
            SubmitError::Transport {
                status: Some(status),
                message,
            } => BeehiveError::ApiStatus { status, message },
            SubmitError::Transport {
                status: None,
                message,
            } => BeehiveError::ServiceUnavailable(message),
            SubmitError::Timeout(after) => BeehiveError::Timeout(after),
            SubmitError::Decode(message) => BeehiveError::ApiParseError(message),
            SubmitError::Io(message) => BeehiveError::IoError(message),
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl BeehiveError {
    /// Returns true if this error is related to configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            BeehiveError::ConfigParseError(_)
                | BeehiveError::InvalidConfigValue { .. }
                | BeehiveError::InvalidEnvVar { .. }
        )
    }

    /// Returns true if this error came from talking to the backend.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            BeehiveError::ApiStatus { .. }
                | BeehiveError::ApiRequestFailed(_)
                | BeehiveError::ApiParseError(_)
                | BeehiveError::Timeout(_)
                | BeehiveError::ServiceUnavailable(_)
        )
    }

    /// Returns true if this error is transient and the operation might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            BeehiveError::Timeout(_) | BeehiveError::ServiceUnavailable(_) => true,
            BeehiveError::ApiStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            BeehiveError::ConfigParseError(_) => "E1001",
            BeehiveError::InvalidConfigValue { .. } => "E1002",
            BeehiveError::InvalidEnvVar { .. } => "E1003",
            BeehiveError::MissingSession(_) => "E2001",
            BeehiveError::AuthenticationFailed(_) => "E2002",
            BeehiveError::Forbidden(_) => "E2003",
            BeehiveError::ApiStatus { .. } => "E3001",
            BeehiveError::ApiRequestFailed(_) => "E3002",
            BeehiveError::ApiParseError(_) => "E3003",
            BeehiveError::Timeout(_) => "E3004",
            BeehiveError::ServiceUnavailable(_) => "E3005",
            BeehiveError::ValidationError(_) => "E4001",
            BeehiveError::InvalidKey(_) => "E4002",
            BeehiveError::PollNotRunning(_) => "E5001",
            BeehiveError::Internal(_) => "E9001",
            BeehiveError::IoError(_) => "E9002",
            BeehiveError::SerializationError(_) => "E9003",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            BeehiveError::MissingSession(_) => {
                Some("Set BEEHIVE_TOKEN and BEEHIVE_USER_ID or add an [auth] section to the config file")
            }
            BeehiveError::AuthenticationFailed(_) => {
                Some("Your token may have expired. Sign in again and update BEEHIVE_TOKEN")
            }
            BeehiveError::Forbidden(_) => Some("This action requires an admin session"),
            BeehiveError::ServiceUnavailable(_) => {
                Some("Check that the backend is running and BEEHIVE_API_URL is correct")
            }
            BeehiveError::Timeout(_) => {
                Some("The backend is slow to respond. Raise polling.request_timeout_ms if this persists")
            }
            BeehiveError::ConfigParseError(_) | BeehiveError::InvalidConfigValue { .. } => {
                Some("Run 'beehive config' to inspect the effective configuration")
            }
            _ => None,
        }
    }

    /// Log this error with appropriate severity level.
    pub fn log(&self) {
        let code = self.error_code();
        let suggestion = self.user_suggestion();

        if self.is_transient() {
            warn!(
                error_code = %code,
                suggestion = suggestion,
                "Transient error occurred: {}",
                self
            );
        } else {
            error!(
                error_code = %code,
                suggestion = suggestion,
                "Error occurred: {}",
                self
            );
        }
    }
}

// ============================================================================
// User-friendly error formatting for CLI
// ============================================================================

/// Format an error for CLI display with suggestions.
pub struct CliErrorDisplay<'a> {
    error: &'a BeehiveError,
    show_suggestion: bool,
}

impl<'a> CliErrorDisplay<'a> {
    pub fn new(error: &'a BeehiveError) -> Self {
        Self {
            error,
            show_suggestion: true,
        }
    }

    pub fn without_suggestion(mut self) -> Self {
        self.show_suggestion = false;
        self
    }
}

impl<'a> fmt::Display for CliErrorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;

        if self.show_suggestion {
            if let Some(suggestion) = self.error.user_suggestion() {
                writeln!(f)?;
                writeln!(f, "  Suggestion: {}", suggestion)?;
            }
        }

        if self.error.is_transient() {
            writeln!(f)?;
            writeln!(f, "  This error may be temporary. Try again shortly.")?;
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
