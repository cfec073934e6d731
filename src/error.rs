//! Error types for the browser tab host.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use browser_tabhost::{Result, WindowManager};
//!
//! fn example(manager: &WindowManager) -> Result<()> {
//!     let browser = manager.new_tab(true, "Home")?;
//!     browser.go_home()?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Lifecycle | [`Error::ManagerClosed`] |
//! | Collaborator | [`Error::Engine`] |
//!
//! Missing tabs are deliberately *not* errors: accessors return `None` and
//! mutators fall through silently when an index or reverse lookup finds
//! nothing. Only a dead owner loop or a failing engine collaborator is
//! reportable.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when the window manager is built without its required
    /// collaborators.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// The owner loop has shut down.
    ///
    /// Returned when an operation is marshaled onto the owner thread after
    /// the manager has been shut down, or when the loop dies before replying.
    #[error("Window manager closed")]
    ManagerClosed,

    // ========================================================================
    // Collaborator Errors
    // ========================================================================
    /// Browser engine failure.
    ///
    /// Returned when the native engine collaborator fails to create an
    /// instance or rejects a navigation request.
    #[error("Engine error: {message}")]
    Engine {
        /// Description of the engine failure.
        message: String,
    },
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an engine error.
    #[inline]
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error means the owner loop is gone.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ManagerClosed)
    }

    /// Returns `true` if this is an engine collaborator error.
    #[inline]
    #[must_use]
    pub fn is_engine_error(&self) -> bool {
        matches!(self, Self::Engine { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
