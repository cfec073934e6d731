//! Window manager: public handle, builder, and owner loop.
//!
//! [`WindowManager`] is a cheap-to-clone handle over a command queue. A
//! dedicated owner thread consumes the queue and is the only place tab state
//! is ever touched; public operations enqueue a [`ManagerCommand`] and block
//! until the loop answers. Engine events enter through the same queue, so
//! host commands and browser activity interleave in one deterministic order.
//!
//! # Example
//!
//! ```ignore
//! let manager = WindowManager::builder()
//!     .engine_factory(factory)
//!     .filter_level(FilterLevel::Medium)
//!     .build()?;
//!
//! let browser = manager.new_tab(true, "Home")?;
//! manager.open(&"https://example.com".parse()?)?;
//! manager.close_all_tabs()?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use url::Url;

use crate::commands::{BrowserCommands, HostNotification, NotificationHandler};
use crate::engine::{BrowserEngine, EngineEvent, EngineFactory, NewWindowRequest, PopupResponse};
use crate::error::{Error, Result};
use crate::identifiers::{AutomationHandle, BrowserId};
use crate::popup::{self, FilterLevel, NavigationContext, PopupDecision};
use crate::script_error::ScriptErrorRegister;

use super::message::{EngineEventSink, ManagerCommand};
use super::strip::{TabEntry, TabStrip};

// ============================================================================
// Constants
// ============================================================================

/// Label given to tabs materialized for permitted pop-ups.
const POPUP_TITLE: &str = "Popup";

/// Name of the owner thread.
const OWNER_THREAD_NAME: &str = "tabhost-owner";

// ============================================================================
// BrowserHandle
// ============================================================================

/// A handle to one browser instance living in a tab.
///
/// Returned by [`WindowManager::new_tab`] and the accessors. Navigation
/// requests go straight to the engine; everything that touches tab state
/// goes through the manager.
#[derive(Clone)]
pub struct BrowserHandle {
    /// Identity of the instance.
    id: BrowserId,
    /// The engine session.
    engine: Arc<dyn BrowserEngine>,
}

impl BrowserHandle {
    /// Returns the instance identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> BrowserId {
        self.id
    }

    /// Requests navigation to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Engine`] if the engine rejects the request.
    pub fn navigate(&self, url: &Url) -> Result<()> {
        self.engine.navigate(url)
    }

    /// Requests navigation to the engine's home page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Engine`] if the engine rejects the request.
    pub fn go_home(&self) -> Result<()> {
        self.engine.go_home()
    }

    /// Returns the automation object reference of this instance.
    #[must_use]
    pub fn automation_handle(&self) -> AutomationHandle {
        self.engine.automation_handle()
    }

    /// Returns the underlying engine session.
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &Arc<dyn BrowserEngine> {
        &self.engine
    }
}

impl fmt::Debug for BrowserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserHandle")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Shared State
// ============================================================================

/// State shared between the public handle and the owner loop.
struct ManagerShared {
    /// Pop-up filter strictness, read fresh at each decision.
    filter_level: Mutex<FilterLevel>,
    /// Host notification callback.
    handler: Mutex<Option<NotificationHandler>>,
    /// Script error collector.
    script_errors: Arc<ScriptErrorRegister>,
}

// ============================================================================
// WindowManager
// ============================================================================

/// Manages the tabs, and their contents.
///
/// Clone freely; all clones address the same owner loop. Operations block
/// until the loop has processed them, so they must not be called from the
/// owner thread itself, in particular not from inside the notification
/// handler.
#[derive(Clone)]
pub struct WindowManager {
    /// Sender into the owner loop.
    tx: mpsc::UnboundedSender<ManagerCommand>,
    /// State shared with the loop.
    shared: Arc<ManagerShared>,
}

impl fmt::Debug for WindowManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowManager")
            .field("filter_level", &self.filter_level())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// WindowManager - Construction
// ============================================================================

impl WindowManager {
    /// Creates a configuration builder for the manager.
    #[must_use]
    pub fn builder() -> WindowManagerBuilder {
        WindowManagerBuilder::new()
    }
}

// ============================================================================
// WindowManager - Tab Operations
// ============================================================================

impl WindowManager {
    /// Opens a new browser tab and makes it active.
    ///
    /// The strip becomes visible, the previous active tab is displaced, and
    /// when `navigate_home` is set a home-navigation request is issued before
    /// this call returns.
    ///
    /// # Errors
    ///
    /// - [`Error::Engine`] if the engine factory fails
    /// - [`Error::ManagerClosed`] if the manager has shut down
    pub fn new_tab(&self, navigate_home: bool, title: &str) -> Result<BrowserHandle> {
        self.request(|reply| ManagerCommand::NewTab {
            navigate_home,
            title: title.to_string(),
            reply,
        })?
    }

    /// Opens a new tab and navigates it to `url`.
    ///
    /// # Errors
    ///
    /// - [`Error::Engine`] if the engine factory or the navigation fails
    /// - [`Error::ManagerClosed`] if the manager has shut down
    pub fn open(&self, url: &Url) -> Result<BrowserHandle> {
        let browser = self.new_tab(false, url.as_str())?;
        browser.navigate(url)?;
        Ok(browser)
    }

    /// Closes the tab at `index`.
    ///
    /// Disposes the browser instance and removes the tab; the strip hides
    /// itself when the last tab goes. Out-of-range indexes do nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManagerClosed`] if the manager has shut down.
    pub fn close(&self, index: usize) -> Result<()> {
        self.request(|reply| ManagerCommand::Close { index, reply })
    }

    /// Closes every tab, highest index first, until none remain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManagerClosed`] if the manager has shut down.
    pub fn close_all_tabs(&self) -> Result<()> {
        self.request(|reply| ManagerCommand::CloseAll { reply })
    }

    /// Makes the tab at `index` active.
    ///
    /// Out-of-range indexes do nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManagerClosed`] if the manager has shut down.
    pub fn change_active_browser(&self, index: usize) -> Result<()> {
        self.request(|reply| ManagerCommand::ChangeActive { index, reply })
    }

    /// Returns the active tab's browser, if any tab exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManagerClosed`] if the manager has shut down.
    pub fn active_browser(&self) -> Result<Option<BrowserHandle>> {
        self.request(|reply| ManagerCommand::ActiveBrowser { reply })
    }

    /// Returns the browser at `index`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManagerClosed`] if the manager has shut down.
    pub fn browser_at(&self, index: usize) -> Result<Option<BrowserHandle>> {
        self.request(|reply| ManagerCommand::BrowserAt { index, reply })
    }

    /// Sets the label of the tab at `index` verbatim.
    ///
    /// Out-of-range indexes do nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManagerClosed`] if the manager has shut down.
    pub fn set_title_name(&self, index: usize, title: &str) -> Result<()> {
        self.request(|reply| ManagerCommand::SetTitle {
            index,
            title: title.to_string(),
            reply,
        })
    }

    /// Returns the label of the tab at `index`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManagerClosed`] if the manager has shut down.
    pub fn get_title_name(&self, index: usize) -> Result<Option<String>> {
        self.request(|reply| ManagerCommand::GetTitle { index, reply })
    }

    /// Returns the full-title tooltip of the tab at `index`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManagerClosed`] if the manager has shut down.
    pub fn get_tooltip(&self, index: usize) -> Result<Option<String>> {
        self.request(|reply| ManagerCommand::GetTooltip { index, reply })
    }

    /// Returns the highest tab index, or `None` when no tabs exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManagerClosed`] if the manager has shut down.
    pub fn last_tab_index(&self) -> Result<Option<usize>> {
        self.request(|reply| ManagerCommand::LastTabIndex { reply })
    }

    /// Returns the number of tabs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManagerClosed`] if the manager has shut down.
    pub fn tab_count(&self) -> Result<usize> {
        self.request(|reply| ManagerCommand::TabCount { reply })
    }

    /// Returns the strip visibility flag (`true` iff tabs exist).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManagerClosed`] if the manager has shut down.
    pub fn is_visible(&self) -> Result<bool> {
        self.request(|reply| ManagerCommand::IsVisible { reply })
    }
}

// ============================================================================
// WindowManager - Configuration
// ============================================================================

impl WindowManager {
    /// Sets the pop-up filter strictness.
    ///
    /// Takes effect for the next decision; nothing is cached.
    pub fn set_filter_level(&self, level: FilterLevel) {
        *self.shared.filter_level.lock() = level;
    }

    /// Returns the pop-up filter strictness.
    #[must_use]
    pub fn filter_level(&self) -> FilterLevel {
        *self.shared.filter_level.lock()
    }

    /// Returns the script error register this manager records into.
    #[must_use]
    pub fn script_errors(&self) -> Arc<ScriptErrorRegister> {
        Arc::clone(&self.shared.script_errors)
    }

    /// Sets the notification callback.
    ///
    /// The handler runs on the owner thread and must not call back into the
    /// manager.
    pub fn set_notification_handler(&self, handler: NotificationHandler) {
        *self.shared.handler.lock() = Some(handler);
    }

    /// Clears the notification callback.
    pub fn clear_notification_handler(&self) {
        *self.shared.handler.lock() = None;
    }

    /// Stops the owner loop.
    ///
    /// Remaining tabs are disposed. Operations after shutdown return
    /// [`Error::ManagerClosed`].
    pub fn shutdown(&self) {
        let _ = self.tx.send(ManagerCommand::Shutdown);
    }
}

// ============================================================================
// WindowManager - Internal
// ============================================================================

impl WindowManager {
    /// Marshals a command onto the owner thread and blocks for the answer.
    fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> ManagerCommand,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(make(reply)).map_err(|_| Error::ManagerClosed)?;
        rx.blocking_recv().map_err(|_| Error::ManagerClosed)
    }
}

// ============================================================================
// WindowManagerBuilder
// ============================================================================

/// Builder for [`WindowManager`].
///
/// # Example
///
/// ```ignore
/// let manager = WindowManager::builder()
///     .engine_factory(factory)
///     .script_errors(register)
///     .filter_level(FilterLevel::High)
///     .build()?;
/// ```
#[derive(Default)]
pub struct WindowManagerBuilder {
    /// Creates engine sessions for new tabs.
    factory: Option<Arc<dyn EngineFactory>>,
    /// Script error collector; a fresh one is created when not supplied.
    script_errors: Option<Arc<ScriptErrorRegister>>,
    /// Initial pop-up filter strictness.
    filter_level: FilterLevel,
}

impl WindowManagerBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the engine factory. Required.
    #[must_use]
    pub fn engine_factory(mut self, factory: Arc<dyn EngineFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Shares a script error register with the manager.
    ///
    /// Without one, the manager creates its own, reachable through
    /// [`WindowManager::script_errors`].
    #[must_use]
    pub fn script_errors(mut self, register: Arc<ScriptErrorRegister>) -> Self {
        self.script_errors = Some(register);
        self
    }

    /// Sets the initial pop-up filter strictness.
    #[must_use]
    pub fn filter_level(mut self, level: FilterLevel) -> Self {
        self.filter_level = level;
        self
    }

    /// Builds the manager and starts its owner thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no engine factory was supplied or the
    /// owner thread cannot be spawned.
    pub fn build(self) -> Result<WindowManager> {
        let factory = self
            .factory
            .ok_or_else(|| Error::config("engine factory is required"))?;
        let script_errors = self
            .script_errors
            .unwrap_or_else(|| Arc::new(ScriptErrorRegister::new()));

        let (tx, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(ManagerShared {
            filter_level: Mutex::new(self.filter_level),
            handler: Mutex::new(None),
            script_errors,
        });

        let owner_loop = ManagerLoop {
            rx,
            tx: tx.clone(),
            strip: TabStrip::new(),
            factory,
            shared: Arc::clone(&shared),
        };

        std::thread::Builder::new()
            .name(OWNER_THREAD_NAME.to_string())
            .spawn(move || owner_loop.run())
            .map_err(|e| Error::config(format!("failed to spawn owner thread: {e}")))?;

        Ok(WindowManager { tx, shared })
    }
}

// ============================================================================
// ManagerLoop
// ============================================================================

/// The owner loop: sole owner of the tab strip.
struct ManagerLoop {
    /// Command queue.
    rx: mpsc::UnboundedReceiver<ManagerCommand>,
    /// Sender handed to engine event sinks.
    tx: mpsc::UnboundedSender<ManagerCommand>,
    /// Tab state.
    strip: TabStrip,
    /// Creates engine sessions.
    factory: Arc<dyn EngineFactory>,
    /// State shared with the public handle.
    shared: Arc<ManagerShared>,
}

impl ManagerLoop {
    /// Processes commands until shutdown, then disposes remaining tabs.
    fn run(mut self) {
        debug!("Owner loop started");

        while let Some(command) = self.rx.blocking_recv() {
            match command {
                ManagerCommand::NewTab {
                    navigate_home,
                    title,
                    reply,
                } => {
                    let _ = reply.send(self.handle_new_tab(navigate_home, &title));
                }
                ManagerCommand::Close { index, reply } => {
                    self.handle_close(index);
                    let _ = reply.send(());
                }
                ManagerCommand::CloseAll { reply } => {
                    self.handle_close_all();
                    let _ = reply.send(());
                }
                ManagerCommand::ChangeActive { index, reply } => {
                    if self.strip.activate_at(index) {
                        self.broadcast_command_state();
                    }
                    let _ = reply.send(());
                }
                ManagerCommand::ActiveBrowser { reply } => {
                    let _ = reply.send(self.strip.active_entry().map(handle_of));
                }
                ManagerCommand::BrowserAt { index, reply } => {
                    let _ = reply.send(self.strip.get(index).map(handle_of));
                }
                ManagerCommand::SetTitle {
                    index,
                    title,
                    reply,
                } => {
                    if let Some(entry) = self.strip.get_mut(index) {
                        entry.set_label(&title);
                    }
                    let _ = reply.send(());
                }
                ManagerCommand::GetTitle { index, reply } => {
                    let _ = reply.send(self.strip.get(index).map(|e| e.label().to_string()));
                }
                ManagerCommand::GetTooltip { index, reply } => {
                    let _ = reply.send(self.strip.get(index).map(|e| e.tooltip().to_string()));
                }
                ManagerCommand::LastTabIndex { reply } => {
                    let _ = reply.send(self.strip.last_index());
                }
                ManagerCommand::TabCount { reply } => {
                    let _ = reply.send(self.strip.len());
                }
                ManagerCommand::IsVisible { reply } => {
                    let _ = reply.send(self.strip.visible());
                }
                ManagerCommand::Engine { id, event } => {
                    self.handle_engine_event(id, event);
                }
                ManagerCommand::Shutdown => {
                    debug!("Shutdown command received");
                    break;
                }
            }
        }

        self.dispose_remaining();
        debug!("Owner loop terminated");
    }

    // ------------------------------------------------------------------------
    // Tab operations
    // ------------------------------------------------------------------------

    /// Creates a tab: engine session, wiring, strip entry, activation.
    fn handle_new_tab(&mut self, navigate_home: bool, title: &str) -> Result<BrowserHandle> {
        let id = BrowserId::generate();
        let sink = EngineEventSink::new(id, self.tx.clone());
        let engine = self.factory.create(id, sink)?;

        if navigate_home
            && let Err(e) = engine.go_home()
        {
            warn!(%id, error = %e, "Home navigation rejected");
        }

        let index = self
            .strip
            .insert(TabEntry::new(id, Arc::clone(&engine), title));
        info!(%id, index, title, "Tab created");

        self.broadcast_command_state();
        Ok(BrowserHandle { id, engine })
    }

    /// Closes the tab at `index`; out-of-range indexes fall through.
    fn handle_close(&mut self, index: usize) {
        let Some(removed) = self.strip.remove_at(index) else {
            return;
        };

        removed.entry.engine().dispose();
        info!(id = %removed.entry.id(), index, "Tab closed");

        if removed.was_active {
            self.broadcast_command_state();
        }
    }

    /// Closes the highest-indexed tab until none remain.
    fn handle_close_all(&mut self) {
        while let Some(last) = self.strip.last_index() {
            self.handle_close(last);
        }
    }

    // ------------------------------------------------------------------------
    // Engine events
    // ------------------------------------------------------------------------

    /// Routes one engine event; unknown sources fall through silently.
    fn handle_engine_event(&mut self, id: BrowserId, event: EngineEvent) {
        match event {
            EngineEvent::StatusTextChanged => {
                // Only the active tab's status reaches the host.
                if self.strip.active_id() == Some(id)
                    && let Some(entry) = self.strip.entry(id)
                {
                    let text = entry.engine().status_text();
                    self.notify(HostNotification::StatusTextChanged(text));
                }
            }

            EngineEvent::TitleChanged => {
                let title = self.strip.entry(id).map(|e| e.engine().document_title());
                if let Some(title) = title
                    && let Some(entry) = self.strip.entry_mut(id)
                {
                    entry.apply_title(&title);
                }
            }

            EngineEvent::NavigationStarted { url }
            | EngineEvent::Navigated { url }
            | EngineEvent::DocumentCompleted { url } => {
                debug!(%id, %url, "Navigation activity");
                self.recompute_if_active(id);
            }

            EngineEvent::CanGoBackChanged
            | EngineEvent::CanGoForwardChanged
            | EngineEvent::BusyChanged => {
                self.recompute_if_active(id);
            }

            EngineEvent::ScriptError {
                url,
                description,
                line,
            } => {
                // Recorded and considered handled; never reaches navigation.
                self.shared.script_errors.register(url, description, line);
            }

            EngineEvent::Quit => self.handle_quit(id),

            EngineEvent::NewWindowRequested(request) => self.handle_new_window(id, request),
        }
    }

    /// Script called `window.close()`: remove the owning tab, active or not.
    fn handle_quit(&mut self, id: BrowserId) {
        let Some(removed) = self.strip.remove_id(id) else {
            return;
        };

        removed.entry.engine().dispose();
        info!(%id, "Tab closed by script");

        if removed.was_active {
            self.broadcast_command_state();
        }
    }

    /// Runs the pop-up filter and answers the engine's request.
    fn handle_new_window(&mut self, source: BrowserId, request: NewWindowRequest) {
        let level = *self.shared.filter_level.lock();
        let encryption = self
            .strip
            .entry(source)
            .map(|e| e.engine().encryption_level())
            .unwrap_or_default();
        let context = request.context();

        let decision = popup::decide(level, context, encryption);
        debug!(%source, %level, ?context, ?decision, "Pop-up decision");

        match decision {
            PopupDecision::Allow => {
                if context.contains(NavigationContext::HTML_DIALOG) {
                    // HTML dialog: permitted, but no tab is materialized.
                    request.respond(PopupResponse::ProceedInPlace);
                } else {
                    match self.handle_new_tab(false, POPUP_TITLE) {
                        Ok(browser) => {
                            request.respond(PopupResponse::Attach(browser.automation_handle()));
                        }
                        Err(e) => {
                            warn!(%source, error = %e, "Pop-up tab creation failed");
                            request.respond(PopupResponse::Cancel);
                        }
                    }
                }
            }
            PopupDecision::Deny => {
                // A suppressed-pop-up notification could be raised here.
                request.respond(PopupResponse::Cancel);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------------

    /// Recomputes the command set when `id` is the active tab.
    fn recompute_if_active(&self, id: BrowserId) {
        if self.strip.active_id() == Some(id) {
            self.broadcast_command_state();
        }
    }

    /// Broadcasts the enabled-command set for the active browser.
    fn broadcast_command_state(&self) {
        let mut commands = BrowserCommands::NONE;

        if let Some(entry) = self.strip.active_entry() {
            let engine = entry.engine();
            if engine.can_go_back() {
                commands |= BrowserCommands::BACK;
            }
            if engine.can_go_forward() {
                commands |= BrowserCommands::FORWARD;
            }
            if engine.is_busy() {
                commands |= BrowserCommands::STOP;
            }
            commands |= BrowserCommands::DEFAULTS;
        }

        self.notify(HostNotification::CommandStateChanged(commands));
    }

    /// Invokes the registered notification handler, if any.
    fn notify(&self, notification: HostNotification) {
        let handler = self.shared.handler.lock();
        if let Some(handler) = handler.as_ref() {
            handler(notification);
        }
    }

    /// Disposes every remaining tab without notifying.
    fn dispose_remaining(&mut self) {
        while let Some(last) = self.strip.last_index() {
            if let Some(removed) = self.strip.remove_at(last) {
                removed.entry.engine().dispose();
            }
        }
    }
}

/// Builds a handle for a strip entry.
fn handle_of(entry: &TabEntry) -> BrowserHandle {
    BrowserHandle {
        id: entry.id(),
        engine: Arc::clone(entry.engine()),
    }
}

// ============================================================================
// Tests
// ============================================================================
