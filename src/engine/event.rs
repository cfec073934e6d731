//! Engine event types.
//!
//! Events are notifications pushed from an engine session into the window
//! manager's owner loop. Every event is processed on the owner thread, in
//! arrival order, through the same queue as host commands.
//!
//! # Event Kinds
//!
//! | Kind | Host reaction |
//! |------|---------------|
//! | `NavigationStarted` / `Navigated` / `DocumentCompleted` | Recompute the enabled-command set (active tab only) |
//! | `StatusTextChanged` | Relay to the host iff the emitting tab is active |
//! | `TitleChanged` | Update the emitting tab's label and tooltip |
//! | `CanGoBackChanged` / `CanGoForwardChanged` / `BusyChanged` | Recompute the enabled-command set (active tab only) |
//! | `ScriptError` | Record in the script error register |
//! | `Quit` | Close the emitting tab (script called `window.close()`) |
//! | `NewWindowRequested` | Run the pop-up filter and answer the request |

// ============================================================================
// Imports
// ============================================================================

use tokio::sync::oneshot;
use url::Url;

use crate::identifiers::AutomationHandle;
use crate::popup::NavigationContext;

// ============================================================================
// EngineEvent
// ============================================================================

/// A notification raised by an engine session.
///
/// State-change events carry no payload: the owner loop queries the session
/// for the current value while handling the event, so a burst of changes
/// collapses to the latest state.
#[derive(Debug)]
pub enum EngineEvent {
    /// A navigation began.
    NavigationStarted {
        /// Target of the navigation.
        url: Url,
    },

    /// A navigation completed.
    Navigated {
        /// Location navigated to.
        url: Url,
    },

    /// The document finished loading.
    DocumentCompleted {
        /// Location of the completed document.
        url: Url,
    },

    /// The status-bar text changed.
    StatusTextChanged,

    /// The document title changed.
    TitleChanged,

    /// Backward history availability changed.
    CanGoBackChanged,

    /// Forward history availability changed.
    CanGoForwardChanged,

    /// The busy state flipped.
    BusyChanged,

    /// A script raised a runtime error.
    ///
    /// The engine has already suppressed its own error dialog; the host
    /// records the error and treats it as handled.
    ScriptError {
        /// Page the error occurred on.
        url: Url,
        /// Error description.
        description: String,
        /// Line number within the script.
        line: u32,
    },

    /// A script closed the window (`window.close()`).
    Quit,

    /// The engine asks permission to open a new window.
    NewWindowRequested(NewWindowRequest),
}

impl EngineEvent {
    /// Returns a short name for logging.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::NavigationStarted { .. } => "navigationStarted",
            Self::Navigated { .. } => "navigated",
            Self::DocumentCompleted { .. } => "documentCompleted",
            Self::StatusTextChanged => "statusTextChanged",
            Self::TitleChanged => "titleChanged",
            Self::CanGoBackChanged => "canGoBackChanged",
            Self::CanGoForwardChanged => "canGoForwardChanged",
            Self::BusyChanged => "busyChanged",
            Self::ScriptError { .. } => "scriptError",
            Self::Quit => "quit",
            Self::NewWindowRequested(_) => "newWindowRequested",
        }
    }
}

// ============================================================================
// NewWindowRequest
// ============================================================================

/// A pop-up request awaiting a filter verdict.
///
/// Carries the provenance flags the filter decides on and a reply slot the
/// owner loop answers through. The raising engine callback blocks on the
/// reply, so the hand-off is synchronous request-response.
#[derive(Debug)]
pub struct NewWindowRequest {
    /// Target of the requested window, when known.
    url: Option<Url>,

    /// Name of the target frame, when known.
    frame: Option<String>,

    /// How the request originated.
    context: NavigationContext,

    /// Reply slot answered by the owner loop.
    reply: oneshot::Sender<PopupResponse>,
}

impl NewWindowRequest {
    /// Creates a request and the receiver its answer arrives on.
    #[must_use]
    pub fn new(
        url: Option<Url>,
        frame: Option<String>,
        context: NavigationContext,
    ) -> (Self, oneshot::Receiver<PopupResponse>) {
        let (reply, rx) = oneshot::channel();
        (
            Self {
                url,
                frame,
                context,
                reply,
            },
            rx,
        )
    }

    /// Returns the target URL, when known.
    #[inline]
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Returns the target frame name, when known.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> Option<&str> {
        self.frame.as_deref()
    }

    /// Returns the provenance flags.
    #[inline]
    #[must_use]
    pub fn context(&self) -> NavigationContext {
        self.context
    }

    /// Answers the request.
    ///
    /// Dropping the request without responding reads as [`PopupResponse::Cancel`]
    /// on the engine side.
    pub fn respond(self, response: PopupResponse) {
        // The engine may have stopped waiting; nothing to do then.
        let _ = self.reply.send(response);
    }
}

// ============================================================================
// PopupResponse
// ============================================================================

/// The host's answer to a [`NewWindowRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupResponse {
    /// Permitted: a tab was materialized; attach the new window to this
    /// automation object.
    Attach(AutomationHandle),

    /// Permitted HTML dialog: navigate in place, no tab was created.
    ProceedInPlace,

    /// Denied: cancel the navigation.
    Cancel,
}

impl PopupResponse {
    /// Returns `true` for [`PopupResponse::Cancel`].
    #[inline]
    #[must_use]
    pub fn is_cancelled(self) -> bool {
        matches!(self, Self::Cancel)
    }
}

// ============================================================================
// Tests
// ============================================================================
