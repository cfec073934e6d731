//! Tab/window management.
//!
//! One [`WindowManager`] owns a strip of tabs, each hosting exactly one
//! browser engine session. All tab state lives on a dedicated owner thread;
//! the public handle marshals every operation onto it and blocks for the
//! answer, and engine events travel the same queue.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`WindowManager`] | Public handle over the owner loop |
//! | [`WindowManagerBuilder`] | Configures and starts a manager |
//! | [`BrowserHandle`] | One browser instance living in a tab |
//! | [`EngineEventSink`] | The channel engine sessions push events into |

// ============================================================================
// Submodules
// ============================================================================

/// Public handle, builder, and owner loop.
mod host;

/// Owner-loop message types.
mod message;

/// Tab strip bookkeeping.
mod strip;

// ============================================================================
// Re-exports
// ============================================================================

pub use host::{BrowserHandle, WindowManager, WindowManagerBuilder};
pub use message::EngineEventSink;
