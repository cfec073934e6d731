//! Tab strip bookkeeping.
//!
//! [`TabStrip`] is the owner loop's private state: an ordered list of tabs,
//! each owning one engine session, with single-active-tab semantics and the
//! visibility flag tied to emptiness.
//!
//! Invariants (checked by the tests after every mutation):
//!
//! - exactly one tab is [`TabState::Active`] when the strip is non-empty,
//!   zero when empty;
//! - the visibility flag is `true` iff the strip is non-empty.
//!
//! Reverse lookup from an engine-raised event to the owning tab goes through
//! the [`BrowserId`] index; positions shift on removal, ids never do.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::engine::BrowserEngine;
use crate::identifiers::BrowserId;

// ============================================================================
// Constants
// ============================================================================

/// Longest label shown on a tab before truncation.
pub(crate) const TITLE_DISPLAY_LIMIT: usize = 30;

/// Marker appended to truncated labels.
pub(crate) const TITLE_ELLIPSIS: &str = "...";

// ============================================================================
// Title Truncation
// ============================================================================

/// Renders a display label from a full title.
///
/// Titles longer than [`TITLE_DISPLAY_LIMIT`] characters keep their first 30
/// characters and gain a `...` marker; the cut respects character
/// boundaries, not bytes.
pub(crate) fn truncate_title(full: &str) -> String {
    let mut chars = full.char_indices();
    match chars.nth(TITLE_DISPLAY_LIMIT) {
        // A character exists past the limit: cut before it.
        Some((cut, _)) => format!("{}{}", &full[..cut], TITLE_ELLIPSIS),
        None => full.to_string(),
    }
}

// ============================================================================
// TabState
// ============================================================================

/// Lifecycle state of a tab.
///
/// `Created → Active | Inactive → Closed`; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TabState {
    /// Just built, not yet in the strip.
    Created,
    /// The selected tab.
    Active,
    /// In the strip, not selected.
    Inactive,
    /// Removed; resources released. Terminal.
    Closed,
}

// ============================================================================
// TabEntry
// ============================================================================

/// One tab: a label, a tooltip, and the engine session it owns.
pub(crate) struct TabEntry {
    /// Identity of the owned session.
    id: BrowserId,
    /// The owned session.
    engine: Arc<dyn BrowserEngine>,
    /// Display label, truncated.
    label: String,
    /// Untruncated title.
    tooltip: String,
    /// Lifecycle state.
    state: TabState,
}

impl TabEntry {
    /// Creates a tab in the [`TabState::Created`] state.
    pub(crate) fn new(id: BrowserId, engine: Arc<dyn BrowserEngine>, title: &str) -> Self {
        Self {
            id,
            engine,
            label: truncate_title(title),
            tooltip: title.to_string(),
            state: TabState::Created,
        }
    }

    /// Returns the session identity.
    #[inline]
    pub(crate) fn id(&self) -> BrowserId {
        self.id
    }

    /// Returns the owned session.
    #[inline]
    pub(crate) fn engine(&self) -> &Arc<dyn BrowserEngine> {
        &self.engine
    }

    /// Returns the display label.
    #[inline]
    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    /// Returns the untruncated title.
    #[inline]
    pub(crate) fn tooltip(&self) -> &str {
        &self.tooltip
    }

    /// Returns the lifecycle state.
    #[inline]
    pub(crate) fn state(&self) -> TabState {
        self.state
    }

    /// Sets the label verbatim, leaving the tooltip untouched.
    pub(crate) fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }

    /// Applies a document title: truncated label, full tooltip.
    pub(crate) fn apply_title(&mut self, full: &str) {
        self.label = truncate_title(full);
        self.tooltip = full.to_string();
    }

    fn activate(&mut self) {
        if self.state != TabState::Closed {
            self.state = TabState::Active;
        }
    }

    fn deactivate(&mut self) {
        if self.state != TabState::Closed {
            self.state = TabState::Inactive;
        }
    }

    fn close(&mut self) {
        self.state = TabState::Closed;
    }
}

// ============================================================================
// RemovedTab
// ============================================================================

/// Outcome of removing a tab from the strip.
pub(crate) struct RemovedTab {
    /// The removed tab, already in [`TabState::Closed`].
    pub(crate) entry: TabEntry,
    /// Whether the removed tab was the active one.
    pub(crate) was_active: bool,
}

// ============================================================================
// TabStrip
// ============================================================================

/// Ordered collection of tabs with single-active-tab semantics.
pub(crate) struct TabStrip {
    /// Tab order; position is the public tab index.
    order: Vec<BrowserId>,
    /// Tab contents, keyed by session identity.
    entries: FxHashMap<BrowserId, TabEntry>,
    /// Shown iff non-empty.
    visible: bool,
}

impl TabStrip {
    /// Creates an empty, hidden strip.
    pub(crate) fn new() -> Self {
        Self {
            order: Vec::new(),
            entries: FxHashMap::default(),
            visible: false,
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Returns the number of tabs.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` when no tabs exist.
    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the visibility flag.
    #[inline]
    pub(crate) fn visible(&self) -> bool {
        self.visible
    }

    /// Returns the highest tab index.
    #[inline]
    pub(crate) fn last_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// Returns the id at `index`.
    #[inline]
    pub(crate) fn id_at(&self, index: usize) -> Option<BrowserId> {
        self.order.get(index).copied()
    }

    /// Returns the position of `id`.
    #[inline]
    pub(crate) fn index_of(&self, id: BrowserId) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == id)
    }

    /// Returns the tab at `index`.
    pub(crate) fn get(&self, index: usize) -> Option<&TabEntry> {
        self.id_at(index).and_then(|id| self.entries.get(&id))
    }

    /// Returns the tab at `index`, mutably.
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut TabEntry> {
        let id = self.id_at(index)?;
        self.entries.get_mut(&id)
    }

    /// Returns the tab owning `id`.
    pub(crate) fn entry(&self, id: BrowserId) -> Option<&TabEntry> {
        self.entries.get(&id)
    }

    /// Returns the tab owning `id`, mutably.
    pub(crate) fn entry_mut(&mut self, id: BrowserId) -> Option<&mut TabEntry> {
        self.entries.get_mut(&id)
    }

    /// Returns the active tab's id.
    pub(crate) fn active_id(&self) -> Option<BrowserId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.entries.get(id).is_some_and(|e| e.state() == TabState::Active))
    }

    /// Returns the active tab.
    pub(crate) fn active_entry(&self) -> Option<&TabEntry> {
        self.active_id().and_then(|id| self.entries.get(&id))
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Appends a tab, makes it active, and shows the strip.
    ///
    /// Returns the new tab's index.
    pub(crate) fn insert(&mut self, mut entry: TabEntry) -> usize {
        if let Some(active) = self.active_id()
            && let Some(previous) = self.entries.get_mut(&active)
        {
            previous.deactivate();
        }

        entry.activate();
        let id = entry.id();
        self.order.push(id);
        self.entries.insert(id, entry);
        self.visible = true;
        self.order.len() - 1
    }

    /// Makes the tab at `index` active.
    ///
    /// Returns `true` when the active tab changed; out-of-range indexes and
    /// re-selecting the active tab are no-ops.
    pub(crate) fn activate_at(&mut self, index: usize) -> bool {
        let Some(id) = self.id_at(index) else {
            return false;
        };
        let previous = self.active_id();
        if previous == Some(id) {
            return false;
        }

        if let Some(previous) = previous
            && let Some(entry) = self.entries.get_mut(&previous)
        {
            entry.deactivate();
        }
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.activate();
        }
        true
    }

    /// Removes the tab at `index`; no-op when out of range.
    pub(crate) fn remove_at(&mut self, index: usize) -> Option<RemovedTab> {
        let id = self.id_at(index)?;
        self.remove_id(id)
    }

    /// Removes the tab owning `id`; no-op when unknown.
    ///
    /// When the active tab is removed, the tab sliding into its index (or
    /// the new last tab) becomes active, so exactly one tab stays active
    /// while any exist. The strip hides itself when it becomes empty.
    pub(crate) fn remove_id(&mut self, id: BrowserId) -> Option<RemovedTab> {
        let position = self.index_of(id)?;
        self.order.remove(position);
        let mut entry = self.entries.remove(&id)?;

        let was_active = entry.state() == TabState::Active;
        entry.close();

        if was_active
            && let Some(&successor) = self.order.get(position.min(self.order.len().wrapping_sub(1)))
            && let Some(next) = self.entries.get_mut(&successor)
        {
            next.activate();
        }

        self.visible = !self.is_empty();
        Some(RemovedTab { entry, was_active })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use url::Url;

    use crate::engine::EncryptionLevel;
    use crate::error::Result;
    use crate::identifiers::AutomationHandle;

    /// Inert engine session for strip bookkeeping tests.
    struct StubEngine;

    impl BrowserEngine for StubEngine {
        fn navigate(&self, _url: &Url) -> Result<()> {
            Ok(())
        }
        fn go_home(&self) -> Result<()> {
            Ok(())
        }
        fn document_title(&self) -> String {
            String::new()
        }
        fn status_text(&self) -> String {
            String::new()
        }
        fn encryption_level(&self) -> EncryptionLevel {
            EncryptionLevel::Unknown
        }
        fn can_go_back(&self) -> bool {
            false
        }
        fn can_go_forward(&self) -> bool {
            false
        }
        fn is_busy(&self) -> bool {
            false
        }
        fn automation_handle(&self) -> AutomationHandle {
            AutomationHandle::generate()
        }
        fn dispose(&self) {}
    }

    fn entry(title: &str) -> TabEntry {
        TabEntry::new(BrowserId::generate(), Arc::new(StubEngine), title)
    }

    fn active_index(strip: &TabStrip) -> Option<usize> {
        strip.active_id().and_then(|id| strip.index_of(id))
    }

    fn assert_invariants(strip: &TabStrip) {
        let active = strip
            .order
            .iter()
            .filter(|id| strip.entries[*id].state() == TabState::Active)
            .count();
        if strip.is_empty() {
            assert_eq!(active, 0, "empty strip must have no active tab");
        } else {
            assert_eq!(active, 1, "non-empty strip must have one active tab");
        }
        assert_eq!(strip.visible(), !strip.is_empty());
        assert_eq!(strip.order.len(), strip.entries.len());
    }

    // ------------------------------------------------------------------------
    // Title truncation
    // ------------------------------------------------------------------------

    #[test]
    fn test_short_title_untouched() {
        assert_eq!(truncate_title("Example"), "Example");
    }

    #[test]
    fn test_exactly_thirty_chars_untouched() {
        let title = "a".repeat(30);
        assert_eq!(truncate_title(&title), title);
    }

    #[test]
    fn test_long_title_truncated_with_ellipsis() {
        let title = "a".repeat(45);
        let label = truncate_title(&title);
        assert_eq!(label, format!("{}...", "a".repeat(30)));
        assert_eq!(label.chars().count(), 33);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let title = "é".repeat(40);
        let label = truncate_title(&title);
        assert_eq!(label, format!("{}...", "é".repeat(30)));
    }

    #[test]
    fn test_entry_keeps_full_title_as_tooltip() {
        let title = "b".repeat(45);
        let mut tab = entry("start");
        tab.apply_title(&title);
        assert_eq!(tab.label().chars().count(), 33);
        assert_eq!(tab.tooltip(), title);
    }

    // ------------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------------

    #[test]
    fn test_new_entry_starts_created() {
        assert_eq!(entry("x").state(), TabState::Created);
    }

    #[test]
    fn test_insert_promotes_to_active() {
        let mut strip = TabStrip::new();
        let index = strip.insert(entry("first"));
        assert_eq!(index, 0);
        assert_eq!(strip.get(0).expect("tab").state(), TabState::Active);
        assert_invariants(&strip);
    }

    #[test]
    fn test_insert_displaces_previous_active() {
        let mut strip = TabStrip::new();
        strip.insert(entry("first"));
        strip.insert(entry("second"));

        assert_eq!(strip.get(0).expect("tab").state(), TabState::Inactive);
        assert_eq!(strip.get(1).expect("tab").state(), TabState::Active);
        assert_eq!(active_index(&strip), Some(1));
        assert_invariants(&strip);
    }

    #[test]
    fn test_closed_is_terminal() {
        let mut tab = entry("x");
        tab.close();
        tab.activate();
        assert_eq!(tab.state(), TabState::Closed);
        tab.deactivate();
        assert_eq!(tab.state(), TabState::Closed);
    }

    #[test]
    fn test_removed_tab_reports_closed() {
        let mut strip = TabStrip::new();
        strip.insert(entry("x"));
        let removed = strip.remove_at(0).expect("removed");
        assert_eq!(removed.entry.state(), TabState::Closed);
        assert!(removed.was_active);
        assert_invariants(&strip);
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    #[test]
    fn test_activate_at_switches_active() {
        let mut strip = TabStrip::new();
        strip.insert(entry("a"));
        strip.insert(entry("b"));

        assert!(strip.activate_at(0));
        assert_eq!(active_index(&strip), Some(0));
        assert_invariants(&strip);
    }

    #[test]
    fn test_activate_at_same_tab_is_noop() {
        let mut strip = TabStrip::new();
        strip.insert(entry("a"));
        assert!(!strip.activate_at(0));
        assert_invariants(&strip);
    }

    #[test]
    fn test_activate_at_out_of_range_is_noop() {
        let mut strip = TabStrip::new();
        strip.insert(entry("a"));
        assert!(!strip.activate_at(7));
        assert_eq!(active_index(&strip), Some(0));
        assert_invariants(&strip);
    }

    // ------------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------------

    #[test]
    fn test_remove_out_of_range_is_noop() {
        let mut strip = TabStrip::new();
        strip.insert(entry("a"));
        assert!(strip.remove_at(3).is_none());
        assert_eq!(strip.len(), 1);
        assert_invariants(&strip);
    }

    #[test]
    fn test_remove_inactive_keeps_active() {
        let mut strip = TabStrip::new();
        strip.insert(entry("a"));
        strip.insert(entry("b"));
        strip.insert(entry("c"));
        let active = strip.active_id().expect("active");

        let removed = strip.remove_at(0).expect("removed");
        assert!(!removed.was_active);
        assert_eq!(strip.active_id(), Some(active));
        assert_eq!(strip.len(), 2);
        assert_invariants(&strip);
    }

    #[test]
    fn test_remove_active_promotes_successor_at_same_index() {
        let mut strip = TabStrip::new();
        strip.insert(entry("a"));
        strip.insert(entry("b"));
        strip.insert(entry("c"));
        strip.activate_at(1);
        let successor = strip.id_at(2).expect("id");

        let removed = strip.remove_at(1).expect("removed");
        assert!(removed.was_active);
        assert_eq!(strip.active_id(), Some(successor));
        assert_eq!(active_index(&strip), Some(1));
        assert_invariants(&strip);
    }

    #[test]
    fn test_remove_last_active_promotes_new_last() {
        let mut strip = TabStrip::new();
        strip.insert(entry("a"));
        strip.insert(entry("b"));

        strip.remove_at(1).expect("removed");
        assert_eq!(active_index(&strip), Some(0));
        assert_invariants(&strip);
    }

    #[test]
    fn test_remove_only_tab_hides_strip() {
        let mut strip = TabStrip::new();
        strip.insert(entry("a"));
        strip.remove_at(0).expect("removed");

        assert!(strip.is_empty());
        assert!(!strip.visible());
        assert_eq!(strip.last_index(), None);
        assert_invariants(&strip);
    }

    #[test]
    fn test_remove_by_unknown_id_is_noop() {
        let mut strip = TabStrip::new();
        strip.insert(entry("a"));
        assert!(strip.remove_id(BrowserId::generate()).is_none());
        assert_eq!(strip.len(), 1);
        assert_invariants(&strip);
    }

    #[test]
    fn test_close_all_descending_empties_strip() {
        let mut strip = TabStrip::new();
        for i in 0..5 {
            strip.insert(entry(&format!("tab {i}")));
        }

        while let Some(last) = strip.last_index() {
            strip.remove_at(last).expect("removed");
            assert_invariants(&strip);
        }
        assert!(strip.is_empty());
        assert!(!strip.visible());
    }

    // ------------------------------------------------------------------------
    // Labels
    // ------------------------------------------------------------------------

    #[test]
    fn test_set_label_is_verbatim() {
        let mut strip = TabStrip::new();
        strip.insert(entry("a"));
        strip.get_mut(0).expect("tab").set_label("renamed");
        assert_eq!(strip.get(0).expect("tab").label(), "renamed");
        assert_eq!(strip.get(0).expect("tab").tooltip(), "a");
    }

    #[test]
    fn test_creation_title_truncated() {
        let title = "c".repeat(40);
        let mut strip = TabStrip::new();
        strip.insert(TabEntry::new(
            BrowserId::generate(),
            Arc::new(StubEngine),
            &title,
        ));
        assert_eq!(strip.get(0).expect("tab").label().chars().count(), 33);
        assert_eq!(strip.get(0).expect("tab").tooltip(), title);
    }

    // ------------------------------------------------------------------------
    // Property tests
    // ------------------------------------------------------------------------

    proptest! {
        /// Closing in any index order always drains the strip and keeps the
        /// invariants at every step.
        #[test]
        fn prop_arbitrary_close_order_drains(
            tabs in 1usize..8,
            picks in prop::collection::vec(0usize..8, 0..24),
        ) {
            let mut strip = TabStrip::new();
            for i in 0..tabs {
                strip.insert(entry(&format!("tab {i}")));
                assert_invariants(&strip);
            }

            for pick in picks {
                strip.remove_at(pick);
                assert_invariants(&strip);
            }

            while let Some(last) = strip.last_index() {
                prop_assert!(strip.remove_at(last).is_some());
                assert_invariants(&strip);
            }
            prop_assert!(strip.is_empty());
            prop_assert!(!strip.visible());
        }

        /// Selection changes never break the single-active invariant.
        #[test]
        fn prop_selection_keeps_invariants(
            tabs in 1usize..6,
            picks in prop::collection::vec(0usize..8, 0..16),
        ) {
            let mut strip = TabStrip::new();
            for i in 0..tabs {
                strip.insert(entry(&format!("tab {i}")));
            }
            for pick in picks {
                strip.activate_at(pick);
                assert_invariants(&strip);
            }
        }
    }
}
