use super::draft::{Drafted, SearchBox};
use super::filter::{compute_visible_with, DistanceSource, FilterConfig};
use crate::model::Cafe;
use tracing::{debug, warn};

/// Discovery state for one browsing session.
///
/// Holds the full café set, the filter panel, the search box and the derived
/// visible set. The visible set is recomputed only when one of its three
/// inputs changes: the café set, the committed search or the committed filters.
pub struct DiscoveryEngine {
    all: Vec<Cafe>,
    filters: Drafted<FilterConfig>,
    search: SearchBox,
    distance: Option<Box<dyn DistanceSource>>,
    visible: Vec<Cafe>,
    loaded: bool,
}

impl Default for DiscoveryEngine {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl DiscoveryEngine {
    pub fn new(initial_filters: FilterConfig) -> Self {
        Self {
            all: Vec::new(),
            filters: Drafted::new(initial_filters.normalized()),
            search: SearchBox::new(),
            distance: None,
            visible: Vec::new(),
            loaded: false,
        }
    }

    pub fn with_distance_source(mut self, source: Box<dyn DistanceSource>) -> Self {
        self.distance = Some(source);
        self.recompute();
        self
    }

    pub fn visible(&self) -> &[Cafe] {
        &self.visible
    }

    pub fn all(&self) -> &[Cafe] {
        &self.all
    }

    /// Whether a café set has ever been loaded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn committed_filters(&self) -> &FilterConfig {
        self.filters.committed()
    }

    pub fn draft_filters(&self) -> Option<&FilterConfig> {
        self.filters.draft()
    }

    pub fn is_panel_open(&self) -> bool {
        self.filters.is_open()
    }

    pub fn committed_search(&self) -> &str {
        self.search.committed()
    }

    pub fn pending_search(&self) -> &str {
        self.search.pending()
    }

    /// Replaces the full set after a (re)fetch. Recomputes against the current
    /// committed inputs; an open panel's draft is left alone.
    pub fn replace_cafes(&mut self, cafes: Vec<Cafe>) {
        debug!(count = cafes.len(), "replacing café set");
        self.all = cafes;
        self.loaded = true;
        self.recompute();
    }

    /// A fetch failed: keep showing the previous (stale but valid) set.
    pub fn record_fetch_failure(&mut self, error: &dyn std::fmt::Display) {
        warn!(
            %error,
            kept = self.visible.len(),
            "café fetch failed, keeping previous results"
        );
    }

    pub fn open_filters(&mut self) -> &FilterConfig {
        self.filters.open()
    }

    /// Edits the open panel's draft. The result is normalized so the draft
    /// always holds values the panel controls could produce.
    pub fn edit_filters<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut FilterConfig),
    {
        self.filters.edit(|draft| {
            f(draft);
            *draft = draft.clone().normalized();
        })
    }

    /// Commits the draft, closes the panel and recomputes.
    pub fn apply_filters(&mut self) -> bool {
        let was_open = self.filters.is_open();
        let changed = self.filters.apply();
        if was_open {
            self.recompute();
        }
        changed
    }

    pub fn cancel_filters(&mut self) {
        self.filters.cancel();
    }

    pub fn type_search(&mut self, text: impl Into<String>) {
        self.search.type_text(text);
    }

    /// Commits the pending search text and recomputes.
    pub fn submit_search(&mut self) -> bool {
        let changed = self.search.submit();
        self.recompute();
        changed
    }

    pub fn clear_search(&mut self) -> bool {
        let changed = self.search.clear();
        self.recompute();
        changed
    }

    fn recompute(&mut self) {
        self.visible = compute_visible_with(
            &self.all,
            self.search.committed(),
            self.filters.committed(),
            self.distance.as_deref(),
        );
        debug!(
            visible = self.visible.len(),
            total = self.all.len(),
            "recomputed visible cafés"
        );
    }
}
