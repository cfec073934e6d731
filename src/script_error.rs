//! Script error capture.
//!
//! Script runtime errors arrive asynchronously from any tab and aggregate
//! into one [`ScriptErrorRegister`]. The register is an explicitly shared
//! object: the hosting application creates it, hands an `Arc` to the window
//! manager (and to anything that displays errors), and owns its lifetime.
//! There is no ambient global.
//!
//! Errors are recorded and considered handled; they never propagate into the
//! navigation flow, and the engine's own error dialog stays suppressed.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

// ============================================================================
// ScriptError
// ============================================================================

/// One recorded script error.
///
/// Immutable once registered; the register keeps records in registration
/// order and never removes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptError {
    /// Page the error occurred on.
    url: Url,
    /// Error description reported by the engine.
    description: String,
    /// Line number within the failing script.
    line: u32,
}

impl ScriptError {
    /// Creates a new record.
    #[must_use]
    pub fn new(url: Url, description: impl Into<String>, line: u32) -> Self {
        Self {
            url,
            description: description.into(),
            line,
        }
    }

    /// Returns the page the error occurred on.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the error description.
    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the line number.
    #[inline]
    #[must_use]
    pub fn line(&self) -> u32 {
        self.line
    }
}

// ============================================================================
// ErrorSurface
// ============================================================================

/// A display surface for recorded script errors.
///
/// The register shows the surface when errors should be visible and asks a
/// fresh one from its [`SurfaceFactory`] when the previous surface reports
/// itself disposed (the host may have closed the window it lived in).
pub trait ErrorSurface: Send {
    /// Brings the surface to front.
    fn show(&mut self);

    /// Returns `true` once the surface has been destroyed by the host.
    fn is_disposed(&self) -> bool;
}

/// Creates error surfaces on demand.
pub type SurfaceFactory = Box<dyn Fn() -> Box<dyn ErrorSurface> + Send + Sync>;

// ============================================================================
// ScriptErrorRegister
// ============================================================================

/// Insertion-ordered collector of script errors.
///
/// Shared via `Arc` between the window manager (which records) and the host
/// (which reads and toggles visibility). Lives as long as the process wants
/// it to; there is no teardown.
pub struct ScriptErrorRegister {
    /// Recorded errors, in registration order.
    errors: Mutex<Vec<ScriptError>>,
    /// Whether newly recorded errors pop the display surface.
    show_errors: AtomicBool,
    /// Current display surface, if one was ever created.
    surface: Mutex<Option<Box<dyn ErrorSurface>>>,
    /// Factory for (re-)creating the display surface.
    factory: Mutex<Option<SurfaceFactory>>,
}

impl Default for ScriptErrorRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptErrorRegister {
    /// Creates an empty register with no display surface.
    #[must_use]
    pub fn new() -> Self {
        Self {
            errors: Mutex::new(Vec::new()),
            show_errors: AtomicBool::new(false),
            surface: Mutex::new(None),
            factory: Mutex::new(None),
        }
    }

    /// Creates an empty register that can display errors through `factory`.
    #[must_use]
    pub fn with_surface_factory(factory: SurfaceFactory) -> Self {
        let register = Self::new();
        *register.factory.lock() = Some(factory);
        register
    }

    /// Replaces the surface factory.
    pub fn set_surface_factory(&self, factory: SurfaceFactory) {
        *self.factory.lock() = Some(factory);
    }

    /// Sets whether registering an error pops the display surface.
    pub fn set_show_errors(&self, show: bool) {
        self.show_errors.store(show, Ordering::Relaxed);
    }

    /// Returns whether registering an error pops the display surface.
    #[inline]
    #[must_use]
    pub fn show_errors(&self) -> bool {
        self.show_errors.load(Ordering::Relaxed)
    }

    /// Records a script error.
    ///
    /// Appends to the ordered collection and, when the show-errors flag is
    /// set, brings the display surface up.
    pub fn register(&self, url: Url, description: impl Into<String>, line: u32) {
        let error = ScriptError::new(url, description, line);
        debug!(url = %error.url(), line = error.line(), "Script error recorded");
        self.errors.lock().push(error);

        if self.show_errors() {
            self.show_window();
        }
    }

    /// Returns a snapshot of all recorded errors, in registration order.
    #[must_use]
    pub fn errors(&self) -> Vec<ScriptError> {
        self.errors.lock().clone()
    }

    /// Returns the number of recorded errors.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.lock().is_empty()
    }

    /// Brings the display surface up, re-creating it if the previous one was
    /// disposed.
    pub fn show_window(&self) {
        let mut surface = self.surface.lock();

        let needs_new = match surface.as_ref() {
            Some(existing) => existing.is_disposed(),
            None => true,
        };

        if needs_new {
            let factory = self.factory.lock();
            match factory.as_ref() {
                Some(create) => *surface = Some(create()),
                None => {
                    warn!("No error surface factory configured; errors stay hidden");
                    return;
                }
            }
        }

        if let Some(surface) = surface.as_mut() {
            surface.show();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    fn page(path: &str) -> Url {
        format!("https://example.com/{path}").parse().expect("url")
    }

    /// Surface that counts `show` calls and can be flagged disposed.
    struct CountingSurface {
        shows: Arc<AtomicUsize>,
        disposed: Arc<AtomicBool>,
    }

    impl ErrorSurface for CountingSurface {
        fn show(&mut self) {
            self.shows.fetch_add(1, Ordering::SeqCst);
        }

        fn is_disposed(&self) -> bool {
            self.disposed.load(Ordering::SeqCst)
        }
    }

    struct SurfaceProbe {
        shows: Arc<AtomicUsize>,
        disposed: Arc<AtomicBool>,
        created: Arc<AtomicUsize>,
    }

    fn probed_register() -> (ScriptErrorRegister, SurfaceProbe) {
        let shows = Arc::new(AtomicUsize::new(0));
        let disposed = Arc::new(AtomicBool::new(false));
        let created = Arc::new(AtomicUsize::new(0));

        let probe = SurfaceProbe {
            shows: Arc::clone(&shows),
            disposed: Arc::clone(&disposed),
            created: Arc::clone(&created),
        };

        let register = ScriptErrorRegister::with_surface_factory(Box::new(move || {
            created.fetch_add(1, Ordering::SeqCst);
            Box::new(CountingSurface {
                shows: Arc::clone(&shows),
                disposed: Arc::clone(&disposed),
            })
        }));

        (register, probe)
    }

    #[test]
    fn test_errors_kept_in_registration_order() {
        let register = ScriptErrorRegister::new();

        register.register(page("a"), "first", 1);
        register.register(page("b"), "second", 2);
        register.register(page("c"), "third", 3);

        let errors = register.errors();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].description(), "first");
        assert_eq!(errors[1].description(), "second");
        assert_eq!(errors[2].description(), "third");
        assert_eq!(errors[2].line(), 3);
    }

    #[test]
    fn test_surface_shown_iff_flag_set() {
        let (register, probe) = probed_register();

        register.register(page("hidden"), "quiet", 1);
        assert_eq!(probe.shows.load(Ordering::SeqCst), 0);

        register.set_show_errors(true);
        register.register(page("visible"), "loud", 2);
        assert_eq!(probe.shows.load(Ordering::SeqCst), 1);

        assert_eq!(register.len(), 2);
    }

    #[test]
    fn test_disposed_surface_is_recreated() {
        let (register, probe) = probed_register();
        register.set_show_errors(true);

        register.register(page("one"), "first", 1);
        assert_eq!(probe.created.load(Ordering::SeqCst), 1);

        register.register(page("two"), "second", 2);
        assert_eq!(probe.created.load(Ordering::SeqCst), 1, "surface reused");

        probe.disposed.store(true, Ordering::SeqCst);
        register.register(page("three"), "third", 3);
        assert_eq!(probe.created.load(Ordering::SeqCst), 2, "surface recreated");
    }

    #[test]
    fn test_show_without_factory_is_a_no_op() {
        let register = ScriptErrorRegister::new();
        register.set_show_errors(true);
        register.register(page("x"), "no surface", 7);
        assert_eq!(register.len(), 1);
    }

    #[test]
    fn test_concurrent_registration_keeps_every_record() {
        let register = Arc::new(ScriptErrorRegister::new());
        let mut handles = Vec::new();

        for t in 0..4 {
            let register = Arc::clone(&register);
            handles.push(std::thread::spawn(move || {
                for i in 0..25 {
                    register.register(page("thread"), format!("t{t}-{i}"), i);
                }
            }));
        }

        for handle in handles {
            handle.join().expect("thread");
        }

        assert_eq!(register.len(), 100);
    }
}
