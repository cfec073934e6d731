//! Pop-up filter decision procedure.
//!
//! When the engine raises a new-window request, the window manager consults
//! [`decide`] with the session's [`FilterLevel`], the request's
//! [`NavigationContext`] flags, and the encryption level of the originating
//! page. The function is pure: same inputs, same verdict, no caching.
//!
//! # Filter Levels
//!
//! | Level | Behavior |
//! |-------|----------|
//! | [`FilterLevel::None`] | Allow all pop-ups |
//! | [`FilterLevel::Low`] | Allow pop-ups from secure pages; insecure pages degrade to `Medium` |
//! | [`FilterLevel::Medium`] | Allow only fully user-initiated pop-ups |
//! | [`FilterLevel::High`] | Block all pop-ups (override key still wins) |
//!
//! Two rules precede the level check: a request carrying no context at all is
//! allowed (nothing to distinguish it by, fail open), and a request made with
//! the override key held is allowed unconditionally.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::engine::EncryptionLevel;

// ============================================================================
// FilterLevel
// ============================================================================

/// Pop-up filter strictness.
///
/// Session-scoped and mutable at any time; [`decide`] reads the level fresh
/// at each decision.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FilterLevel {
    /// Allow all pop-ups.
    #[default]
    None,
    /// Allow pop-ups raised from pages with a secure connection.
    Low,
    /// Allow only pop-ups whose window chain is user-initiated.
    Medium,
    /// Block all pop-ups unless the override key is held.
    High,
}

impl fmt::Display for FilterLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(name)
    }
}

// ============================================================================
// NavigationContext
// ============================================================================

/// Flags describing how a new-window request originated.
///
/// Combinable bitset; the empty set means the engine supplied no provenance
/// information. Consulted only at decision time, never persisted.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationContext(u32);

impl NavigationContext {
    /// No provenance information.
    pub const NONE: Self = Self(0);

    /// The navigation at this hop was initiated by the user.
    pub const USER_INITED: Self = Self(1);

    /// The window chain was initiated by the user at its root.
    pub const USER_FIRST_INITED: Self = Self(1 << 1);

    /// The user held the pop-up override key while navigating.
    pub const OVERRIDE_KEY: Self = Self(1 << 2);

    /// The request targets an HTML dialog, not a browser window.
    pub const HTML_DIALOG: Self = Self(1 << 3);

    /// Returns the empty context.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self::NONE
    }

    /// Returns `true` if no flags are set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every flag in `other` is set in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the raw flag bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for NavigationContext {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for NavigationContext {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for NavigationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(NavigationContext, &str); 4] = [
            (NavigationContext::USER_INITED, "USER_INITED"),
            (NavigationContext::USER_FIRST_INITED, "USER_FIRST_INITED"),
            (NavigationContext::OVERRIDE_KEY, "OVERRIDE_KEY"),
            (NavigationContext::HTML_DIALOG, "HTML_DIALOG"),
        ];

        if self.is_empty() {
            return f.write_str("NavigationContext(NONE)");
        }

        write!(f, "NavigationContext(")?;
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
// PopupDecision
// ============================================================================

/// Verdict of the pop-up filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopupDecision {
    /// Honor the new-window request.
    Allow,
    /// Cancel the navigation; no window is materialized.
    Deny,
}

impl PopupDecision {
    /// Returns `true` for [`PopupDecision::Allow`].
    #[inline]
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

// ============================================================================
// Decision Procedure
// ============================================================================

/// Decides whether a new-window request is honored.
///
/// Rules, evaluated in order:
///
/// 1. An empty `context` allows: with no provenance information the request
///    cannot be distinguished from a legitimate window, so the filter fails
///    open.
/// 2. [`NavigationContext::OVERRIDE_KEY`] allows unconditionally.
/// 3. Otherwise the verdict follows `level`. At `Low`, a request from an
///    insecure page is judged by the `Medium` rule instead; the degrade is a
///    deliberate part of the level's contract.
///
/// [`NavigationContext::HTML_DIALOG`] does not influence the verdict; it only
/// changes what the caller does with an allowance (navigate in place instead
/// of materializing a tab).
#[must_use]
pub fn decide(
    level: FilterLevel,
    context: NavigationContext,
    encryption: EncryptionLevel,
) -> PopupDecision {
    if context.is_empty() {
        return PopupDecision::Allow;
    }

    if context.contains(NavigationContext::OVERRIDE_KEY) {
        return PopupDecision::Allow;
    }

    let allowed = match level {
        FilterLevel::None => true,
        FilterLevel::Low => {
            if encryption.is_insecure() {
                // Insecure origin: judged by the Medium rule instead.
                user_chain_initiated(context)
            } else {
                true
            }
        }
        FilterLevel::Medium => user_chain_initiated(context),
        FilterLevel::High => false,
    };

    if allowed {
        PopupDecision::Allow
    } else {
        PopupDecision::Deny
    }
}

/// Returns `true` when the window chain is user-initiated at its root *and*
/// at this hop.
#[inline]
fn user_chain_initiated(context: NavigationContext) -> bool {
    context.contains(NavigationContext::USER_FIRST_INITED)
        && context.contains(NavigationContext::USER_INITED)
}

// ============================================================================
// Tests
// ============================================================================
