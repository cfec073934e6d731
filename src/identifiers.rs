//! Type-safe identifiers for host entities.
//!
//! Newtype wrappers prevent mixing incompatible identifiers at compile time.
//!
//! | Type | Identifies |
//! |------|------------|
//! | [`BrowserId`] | A browser engine instance (one per tab) |
//! | [`AutomationHandle`] | The engine-side automation object of an instance |
//!
//! [`BrowserId`] is the reverse-lookup key from an engine-raised event to the
//! owning tab: the manager assigns one at creation time and keys the tab strip
//! by it, instead of walking a containment hierarchy.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// BrowserId
// ============================================================================

/// Unique identifier for a browser engine instance.
///
/// Assigned by the window manager when the instance is created and used to
/// route engine events back to the owning tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrowserId(Uuid);

impl BrowserId {
    /// Generates a fresh random identifier.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BrowserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// AutomationHandle
// ============================================================================

/// Opaque reference to the automation object of a browser instance.
///
/// Handed back to the native engine when a pop-up is permitted, so the engine
/// can attach the new window to the caller's pending navigation. The host
/// never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AutomationHandle(Uuid);

impl AutomationHandle {
    /// Generates a fresh handle.
    ///
    /// Engine implementations call this once per instance.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AutomationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_id_unique() {
        let a = BrowserId::generate();
        let b = BrowserId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_browser_id_display_matches_uuid() {
        let id = BrowserId::generate();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }

    #[test]
    fn test_automation_handle_unique() {
        let a = AutomationHandle::generate();
        let b = AutomationHandle::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_browser_id_serde_transparent() {
        let id = BrowserId::generate();
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, format!("\"{id}\""));

        let back: BrowserId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
