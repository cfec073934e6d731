//! Host-facing command state and notifications.
//!
//! The window manager broadcasts two things to its hosting application: the
//! status-bar text of the active tab and the set of browser commands the
//! host's toolbar/menu should currently enable. Both arrive through a single
//! registered [`NotificationHandler`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

// ============================================================================
// BrowserCommands
// ============================================================================

/// Set of host commands enabled for the active browser.
///
/// `BACK`, `FORWARD` and `STOP` track the active engine's state; the
/// remaining commands are enabled whenever any tab exists. The set is empty
/// when the strip is empty.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrowserCommands(u32);

impl BrowserCommands {
    /// No commands available.
    pub const NONE: Self = Self(0);

    /// Navigate back in history.
    pub const BACK: Self = Self(1);

    /// Navigate forward in history.
    pub const FORWARD: Self = Self(1 << 1);

    /// Stop the navigation in flight.
    pub const STOP: Self = Self(1 << 2);

    /// Navigate to the home page.
    pub const HOME: Self = Self(1 << 3);

    /// Open the search page.
    pub const SEARCH: Self = Self(1 << 4);

    /// Print the current document.
    pub const PRINT: Self = Self(1 << 5);

    /// Preview the current document for printing.
    pub const PRINT_PREVIEW: Self = Self(1 << 6);

    /// Reload the current document.
    pub const RELOAD: Self = Self(1 << 7);

    /// Commands available whenever an active browser exists.
    pub const DEFAULTS: Self = Self(
        Self::HOME.0 | Self::SEARCH.0 | Self::PRINT.0 | Self::PRINT_PREVIEW.0 | Self::RELOAD.0,
    );

    /// Returns the empty set.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self::NONE
    }

    /// Returns `true` if no commands are set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every command in `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the raw command bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for BrowserCommands {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for BrowserCommands {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for BrowserCommands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(BrowserCommands, &str); 8] = [
            (BrowserCommands::BACK, "BACK"),
            (BrowserCommands::FORWARD, "FORWARD"),
            (BrowserCommands::STOP, "STOP"),
            (BrowserCommands::HOME, "HOME"),
            (BrowserCommands::SEARCH, "SEARCH"),
            (BrowserCommands::PRINT, "PRINT"),
            (BrowserCommands::PRINT_PREVIEW, "PRINT_PREVIEW"),
            (BrowserCommands::RELOAD, "RELOAD"),
        ];

        if self.is_empty() {
            return f.write_str("BrowserCommands(NONE)");
        }

        write!(f, "BrowserCommands(")?;
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        f.write_str(")")
    }
}

// ============================================================================
// HostNotification
// ============================================================================

/// A notification relayed from the window manager to the hosting application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostNotification {
    /// The active tab's status-bar text changed.
    ///
    /// Status changes of non-active tabs are suppressed.
    StatusTextChanged(String),

    /// The enabled-command set changed.
    ///
    /// Raised on navigation, history-availability and busy-state changes of
    /// the active browser, and whenever the active tab itself changes.
    CommandStateChanged(BrowserCommands),
}

// ============================================================================
// NotificationHandler
// ============================================================================

/// Callback receiving [`HostNotification`]s.
///
/// Invoked on the owner thread; the handler must not call back into the
/// window manager, since every manager operation would wait on the very
/// thread the handler is running on.
pub type NotificationHandler = Box<dyn Fn(HostNotification) + Send + Sync>;

// ============================================================================
// Tests
// ============================================================================
