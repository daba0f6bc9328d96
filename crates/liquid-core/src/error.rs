//! Error types for Liquid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for every Liquid crate.
///
/// Variants mirror the outcomes a launch or a session can observe. A page
/// that fails to load is *not* an error here (it is a session state), and a
/// second instance of an already running app is expected control flow, not
/// a failure.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum LiquidError {
    /// No record exists for the app; callers usually start the create flow.
    #[error("No configuration found for app '{app}'")]
    ConfigNotFound { app: String },

    /// A record exists but cannot be understood.
    #[error("Configuration for app '{app}' is corrupt: {reason}")]
    ConfigCorrupt { app: String, reason: String },

    /// The record's starting URL is missing or unparseable.
    #[error("Invalid URL '{url}' for app '{app}': {reason}")]
    InvalidUrl {
        app: String,
        url: String,
        reason: String,
    },

    /// Writing a record back to disk failed.
    #[error("Failed to persist configuration for app '{app}': {message}")]
    PersistWriteFailure { app: String, message: String },

    /// The requested app name is unusable (empty after normalisation).
    #[error("Invalid app name: {0}")]
    InvalidAppName(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Instance lock error
    #[error("Lock error: {0}")]
    Lock(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LiquidError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a ConfigNotFound error
    pub fn not_found(app: impl Into<String>) -> Self {
        Self::ConfigNotFound { app: app.into() }
    }

    /// Creates a ConfigCorrupt error
    pub fn corrupt(app: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigCorrupt {
            app: app.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidUrl error
    pub fn invalid_url(
        app: impl Into<String>,
        url: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidUrl {
            app: app.into(),
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a PersistWriteFailure error
    pub fn persist(app: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PersistWriteFailure {
            app: app.into(),
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a ConfigNotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ConfigNotFound { .. })
    }

    /// Check if this is a ConfigCorrupt error
    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::ConfigCorrupt { .. })
    }

    /// Check if this is an InvalidUrl error
    pub fn is_invalid_url(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. })
    }

    /// Check if this is a PersistWriteFailure error
    pub fn is_persist_failure(&self) -> bool {
        matches!(self, Self::PersistWriteFailure { .. })
    }

    /// Whether the failure must stop the app from launching.
    ///
    /// `ConfigNotFound` is excluded: it routes to the create flow instead.
    pub fn is_fatal_for_launch(&self) -> bool {
        matches!(
            self,
            Self::ConfigCorrupt { .. } | Self::InvalidUrl { .. } | Self::InvalidAppName(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for LiquidError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<toml::de::Error> for LiquidError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for LiquidError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, LiquidError>`.
pub type Result<T> = std::result::Result<T, LiquidError>;
