//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout Bazaar.
//! The taxonomy separates expected operational failures from real faults:
//!
//! # Error Categories
//! - `InvalidInput`: raw input fails validation (wrong number shape, out of range)
//! - `NotFound`: a referenced store/warehouse/product/user does not exist
//! - `Denied`: role or ownership check failed
//! - `Backend`: the database could not be reached or a statement failed
//! - `Config`: profile registry or configuration file errors
//!
//! The first three recover locally (the menu loop prints the message and
//! returns to the menu). Only `Backend` resembles a raised fault, and even
//! there existence and authorization checks degrade it to not-found/denied.

use thiserror::Error;

/// Main error type for Bazaar operations
#[derive(Error, Debug)]
pub enum BazaarError {
    /// Raw input fails validation rules
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Role or ownership check failed
    #[error("Denied: {0}")]
    Denied(String),

    /// Database access failed
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration file or profile registry error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BazaarError {
    /// Convert error to a stable error code string
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Denied(_) => "DENIED",
            Self::Backend(_) => "BACKEND_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Get the operator-facing message
    ///
    /// Safe to print: never contains credentials.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether the menu loop can recover by returning to the menu
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::NotFound(_) | Self::Denied(_))
    }

    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a denied error
    pub fn denied(message: impl Into<String>) -> Self {
        Self::Denied(message.into())
    }

    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for Bazaar operations
pub type Result<T> = std::result::Result<T, BazaarError>;
