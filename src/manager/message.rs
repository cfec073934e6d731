//! Owner-loop message types.
//!
//! Every mutation of tab state is a [`ManagerCommand`] processed in order by
//! the owner loop. Public [`WindowManager`] operations enqueue a command
//! carrying a oneshot reply slot and block on it; engine sessions enqueue
//! through the [`EngineEventSink`] they receive at creation.
//!
//! [`WindowManager`]: crate::manager::WindowManager

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use url::Url;

use crate::engine::{EngineEvent, NewWindowRequest, PopupResponse};
use crate::error::Result;
use crate::identifiers::BrowserId;
use crate::manager::host::BrowserHandle;
use crate::popup::NavigationContext;

// ============================================================================
// ManagerCommand
// ============================================================================

/// A message for the owner loop.
///
/// Reply slots make the hand-off synchronous: the sender blocks until the
/// loop has processed the command and answered.
pub(crate) enum ManagerCommand {
    /// Create a tab and make it active.
    NewTab {
        navigate_home: bool,
        title: String,
        reply: oneshot::Sender<Result<BrowserHandle>>,
    },

    /// Close the tab at `index`; no-op when out of range.
    Close {
        index: usize,
        reply: oneshot::Sender<()>,
    },

    /// Close every tab, highest index first.
    CloseAll { reply: oneshot::Sender<()> },

    /// Make the tab at `index` active; no-op when out of range.
    ChangeActive {
        index: usize,
        reply: oneshot::Sender<()>,
    },

    /// Hand out the active tab's browser.
    ActiveBrowser {
        reply: oneshot::Sender<Option<BrowserHandle>>,
    },

    /// Hand out the browser at `index`.
    BrowserAt {
        index: usize,
        reply: oneshot::Sender<Option<BrowserHandle>>,
    },

    /// Set the label of the tab at `index`; no-op when out of range.
    SetTitle {
        index: usize,
        title: String,
        reply: oneshot::Sender<()>,
    },

    /// Read the label of the tab at `index`.
    GetTitle {
        index: usize,
        reply: oneshot::Sender<Option<String>>,
    },

    /// Read the full-title tooltip of the tab at `index`.
    GetTooltip {
        index: usize,
        reply: oneshot::Sender<Option<String>>,
    },

    /// Read the highest tab index.
    LastTabIndex {
        reply: oneshot::Sender<Option<usize>>,
    },

    /// Read the number of tabs.
    TabCount { reply: oneshot::Sender<usize> },

    /// Read the strip visibility flag.
    IsVisible { reply: oneshot::Sender<bool> },

    /// An engine session raised an event.
    Engine {
        id: BrowserId,
        event: EngineEvent,
    },

    /// Stop the loop; remaining tabs are disposed.
    Shutdown,
}

// ============================================================================
// EngineEventSink
// ============================================================================

/// The channel an engine session pushes its events into.
///
/// Bound to one [`BrowserId`]; the owner loop uses the id to find the owning
/// tab. Cheap to clone. Events raised after the manager has shut down are
/// dropped silently.
///
/// Both [`emit`](Self::emit) and
/// [`request_new_window`](Self::request_new_window) are meant for engine
/// callback threads; calling `request_new_window` from the owner thread
/// itself would wait on the very loop meant to answer it.
#[derive(Clone)]
pub struct EngineEventSink {
    /// Session this sink is bound to.
    id: BrowserId,
    /// Sender into the owner loop.
    tx: mpsc::UnboundedSender<ManagerCommand>,
}

impl EngineEventSink {
    /// Creates a sink bound to `id`.
    pub(crate) fn new(id: BrowserId, tx: mpsc::UnboundedSender<ManagerCommand>) -> Self {
        Self { id, tx }
    }

    /// Returns the session id this sink is bound to.
    #[inline]
    #[must_use]
    pub fn browser_id(&self) -> BrowserId {
        self.id
    }

    /// Pushes an event into the owner loop.
    pub fn emit(&self, event: EngineEvent) {
        let name = event.name();
        if self
            .tx
            .send(ManagerCommand::Engine {
                id: self.id,
                event,
            })
            .is_err()
        {
            debug!(id = %self.id, event = name, "Event dropped, manager closed");
        }
    }

    /// Asks permission to open a new window and waits for the verdict.
    ///
    /// Marshals a [`NewWindowRequest`] onto the owner loop and blocks until
    /// the pop-up filter has decided. A manager that is gone (or shuts down
    /// mid-request) answers [`PopupResponse::Cancel`]: nothing happens rather
    /// than an unmanaged window.
    #[must_use]
    pub fn request_new_window(
        &self,
        url: Option<Url>,
        frame: Option<String>,
        context: NavigationContext,
    ) -> PopupResponse {
        let (request, rx) = NewWindowRequest::new(url, frame, context);

        if self
            .tx
            .send(ManagerCommand::Engine {
                id: self.id,
                event: EngineEvent::NewWindowRequested(request),
            })
            .is_err()
        {
            debug!(id = %self.id, "New-window request dropped, manager closed");
            return PopupResponse::Cancel;
        }

        rx.blocking_recv().unwrap_or(PopupResponse::Cancel)
    }
}

impl fmt::Debug for EngineEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineEventSink")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
