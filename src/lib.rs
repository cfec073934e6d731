//! Browser tab host - tabbed hosting core for a native browser engine.
//!
//! This library implements the policy layer of a tabbed browser-host
//! control: tab lifecycle bookkeeping, pop-up filter decisioning, and
//! script-error capture. The native engine itself (rendering, DOM,
//! networking) is an external collaborator reached through the
//! [`BrowserEngine`] trait.
//!
//! # Architecture
//!
//! All tab state is owned by a single thread per [`WindowManager`]:
//!
//! - **Public operations** enqueue a command onto the owner loop and block
//!   until it has been processed (synchronous hand-off, never
//!   fire-and-forget)
//! - **Engine events** (navigation, title/status changes, script errors,
//!   pop-up requests) enter through the same queue via the
//!   [`EngineEventSink`] each session receives at creation
//! - **Pop-up requests** block the raising engine callback until the filter
//!   has decided, answered as attach / proceed-in-place / cancel
//!
//! Exactly one tab is active while any exist; the strip is visible iff it is
//! non-empty.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use browser_tabhost::{
//!     AutomationHandle, BrowserEngine, BrowserId, EncryptionLevel, EngineEvent,
//!     EngineEventSink, EngineFactory, FilterLevel, Result, WindowManager,
//! };
//! use url::Url;
//!
//! /// One session of the wrapped native engine.
//! struct NativeSession {
//!     events: EngineEventSink,
//!     automation: AutomationHandle,
//! }
//!
//! impl BrowserEngine for NativeSession {
//!     fn navigate(&self, url: &Url) -> Result<()> {
//!         // A real implementation drives the native control here.
//!         self.events.emit(EngineEvent::Navigated { url: url.clone() });
//!         Ok(())
//!     }
//!     fn go_home(&self) -> Result<()> { Ok(()) }
//!     fn document_title(&self) -> String { String::new() }
//!     fn status_text(&self) -> String { String::new() }
//!     fn encryption_level(&self) -> EncryptionLevel { EncryptionLevel::Secure }
//!     fn can_go_back(&self) -> bool { false }
//!     fn can_go_forward(&self) -> bool { false }
//!     fn is_busy(&self) -> bool { false }
//!     fn automation_handle(&self) -> AutomationHandle { self.automation }
//!     fn dispose(&self) {}
//! }
//!
//! struct NativeFactory;
//!
//! impl EngineFactory for NativeFactory {
//!     fn create(
//!         &self,
//!         _id: BrowserId,
//!         events: EngineEventSink,
//!     ) -> Result<Arc<dyn BrowserEngine>> {
//!         Ok(Arc::new(NativeSession {
//!             events,
//!             automation: AutomationHandle::generate(),
//!         }))
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let manager = WindowManager::builder()
//!         .engine_factory(Arc::new(NativeFactory))
//!         .filter_level(FilterLevel::Medium)
//!         .build()?;
//!
//!     let browser = manager.new_tab(true, "Home")?;
//!     browser.navigate(&"https://example.com".parse().expect("url"))?;
//!     println!("tabs: {}", manager.tab_count()?);
//!
//!     manager.close_all_tabs()?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`manager`] | Tab/window manager: [`WindowManager`], [`BrowserHandle`] |
//! | [`engine`] | Engine collaborator seam: [`BrowserEngine`], [`EngineEvent`] |
//! | [`popup`] | Pop-up filter: [`FilterLevel`], [`decide`] |
//! | [`script_error`] | Script error capture: [`ScriptErrorRegister`] |
//! | [`commands`] | Command state and host notifications |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |

// ============================================================================
// Modules
// ============================================================================

/// Command state and host notifications.
///
/// The enabled-command set broadcast to the hosting application and the
/// notification callback it registers.
pub mod commands;

/// Engine collaborator seam.
///
/// Traits the native engine is wrapped behind, plus the events it raises.
pub mod engine;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers for host entities.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Tab/window management.
///
/// The owner loop, its public handle, and the tab strip.
pub mod manager;

/// Pop-up filter decision procedure.
///
/// A pure function from filter level and navigation context to a verdict.
pub mod popup;

/// Script error capture.
///
/// Insertion-ordered error register shared across all tabs.
pub mod script_error;

// ============================================================================
// Re-exports
// ============================================================================

// Manager types
pub use manager::{BrowserHandle, EngineEventSink, WindowManager, WindowManagerBuilder};

// Engine types
pub use engine::{
    BrowserEngine, EncryptionLevel, EngineEvent, EngineFactory, NewWindowRequest, PopupResponse,
};

// Pop-up filter types
pub use popup::{FilterLevel, NavigationContext, PopupDecision, decide};

// Script error types
pub use script_error::{ErrorSurface, ScriptError, ScriptErrorRegister, SurfaceFactory};

// Notification types
pub use commands::{BrowserCommands, HostNotification, NotificationHandler};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{AutomationHandle, BrowserId};
