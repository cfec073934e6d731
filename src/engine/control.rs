//! Engine session and factory traits.
//!
//! [`BrowserEngine`] is the host's view of one native browser session. The
//! window manager owns exactly one per tab, created through the injected
//! [`EngineFactory`] and disposed when the tab closes.
//!
//! All methods are synchronous: the owner loop calls them inline while
//! processing a command, and the engine delivers its own activity through the
//! [`EngineEventSink`] it receives at creation time.
//!
//! [`EngineEventSink`]: crate::manager::EngineEventSink

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;
use crate::identifiers::{AutomationHandle, BrowserId};
use crate::manager::EngineEventSink;

// ============================================================================
// EncryptionLevel
// ============================================================================

/// Connection security of the page currently shown by an engine session.
///
/// Only [`EncryptionLevel::Insecure`] influences the pop-up filter: the `Low`
/// level degrades insecure origins to the `Medium` rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionLevel {
    /// The engine cannot report the connection security.
    #[default]
    Unknown,
    /// Plain, unencrypted connection.
    Insecure,
    /// Encrypted page with unencrypted subresources.
    Mixed,
    /// Fully encrypted connection.
    Secure,
}

impl EncryptionLevel {
    /// Returns `true` only for [`EncryptionLevel::Insecure`].
    #[inline]
    #[must_use]
    pub fn is_insecure(self) -> bool {
        matches!(self, Self::Insecure)
    }
}

// ============================================================================
// BrowserEngine
// ============================================================================

/// One native browser session.
///
/// Implementations wrap whatever the platform provides; the host only
/// requires the queries and requests below. Navigation requests are
/// fire-and-forget from the host's perspective: completion arrives later as
/// an [`EngineEvent`].
///
/// Implementations must suppress their own script-error dialog and report the
/// error through [`EngineEvent::ScriptError`] instead; the host records it
/// and considers it handled.
///
/// [`EngineEvent`]: crate::engine::EngineEvent
/// [`EngineEvent::ScriptError`]: crate::engine::EngineEvent::ScriptError
pub trait BrowserEngine: Send + Sync {
    /// Requests navigation to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Engine`] if the engine rejects the request outright.
    ///
    /// [`Error::Engine`]: crate::error::Error::Engine
    fn navigate(&self, url: &Url) -> Result<()>;

    /// Requests navigation to the engine's configured home page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Engine`] if the engine rejects the request outright.
    ///
    /// [`Error::Engine`]: crate::error::Error::Engine
    fn go_home(&self) -> Result<()>;

    /// Returns the title of the current document.
    fn document_title(&self) -> String;

    /// Returns the current status-bar text.
    fn status_text(&self) -> String;

    /// Returns the connection security of the current page.
    fn encryption_level(&self) -> EncryptionLevel;

    /// Returns `true` when backward history navigation is available.
    fn can_go_back(&self) -> bool;

    /// Returns `true` when forward history navigation is available.
    fn can_go_forward(&self) -> bool;

    /// Returns `true` while a navigation is in flight.
    fn is_busy(&self) -> bool;

    /// Returns the automation object reference for this session.
    ///
    /// Handed back to the engine when a pop-up is permitted so the new window
    /// attaches to the caller's navigation request.
    fn automation_handle(&self) -> AutomationHandle;

    /// Releases the session.
    ///
    /// Called exactly once, when the owning tab closes. The session must not
    /// raise further events afterwards.
    fn dispose(&self);
}

// ============================================================================
// EngineFactory
// ============================================================================

/// Creates engine sessions for new tabs.
///
/// The window manager calls [`EngineFactory::create`] on its owner thread
/// whenever a tab is opened, passing the [`BrowserId`] it assigned and the
/// sink the session must push its events into.
pub trait EngineFactory: Send + Sync {
    /// Creates a new engine session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Engine`] if the session cannot be created.
    ///
    /// [`Error::Engine`]: crate::error::Error::Engine
    fn create(&self, id: BrowserId, events: EngineEventSink) -> Result<Arc<dyn BrowserEngine>>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_insecure_is_insecure() {
        assert!(EncryptionLevel::Insecure.is_insecure());
        assert!(!EncryptionLevel::Unknown.is_insecure());
        assert!(!EncryptionLevel::Mixed.is_insecure());
        assert!(!EncryptionLevel::Secure.is_insecure());
    }

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(EncryptionLevel::default(), EncryptionLevel::Unknown);
    }

    #[test]
    fn test_encryption_level_serde() {
        let json = serde_json::to_string(&EncryptionLevel::Insecure).expect("serialize");
        assert_eq!(json, "\"insecure\"");
    }
}
