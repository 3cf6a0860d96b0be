//! Draft/commit holders.
//!
//! Every discovery input has a *committed* value (what filtering uses) and a
//! value the user is still editing. Edits never leak into filtering until an
//! explicit commit.

/// Two-slot holder for a value edited in an open panel.
///
/// - [`open`](Self::open) seeds the draft from the committed value.
/// - [`edit`](Self::edit) touches the draft only.
/// - [`apply`](Self::apply) promotes the draft and closes.
/// - [`cancel`](Self::cancel) drops the draft.
#[derive(Debug, Clone, PartialEq)]
pub struct Drafted<T> {
    committed: T,
    draft: Option<T>,
}

impl<T: Clone + PartialEq> Drafted<T> {
    pub fn new(committed: T) -> Self {
        Self {
            committed,
            draft: None,
        }
    }

    pub fn committed(&self) -> &T {
        &self.committed
    }

    pub fn draft(&self) -> Option<&T> {
        self.draft.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    /// Opens the panel. Re-opening after a cancel or apply shows the committed
    /// value; opening an already open panel keeps the edits in progress.
    pub fn open(&mut self) -> &T {
        self.draft.get_or_insert_with(|| self.committed.clone())
    }

    /// Mutates the draft. Returns `false` when the panel is closed.
    pub fn edit<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        match self.draft.as_mut() {
            Some(draft) => {
                f(draft);
                true
            }
            None => false,
        }
    }

    /// Commits the draft and closes. Returns `true` when the committed value
    /// changed. Applying a closed panel is a no-op.
    pub fn apply(&mut self) -> bool {
        let Some(draft) = self.draft.take() else {
            return false;
        };
        let changed = draft != self.committed;
        self.committed = draft;
        changed
    }

    /// Discards the draft. The committed value is untouched.
    pub fn cancel(&mut self) {
        self.draft = None;
    }
}

/// Search text box: typing updates `pending`, only a submit (button or Enter)
/// updates `committed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchBox {
    pending: String,
    committed: String,
}

impl SearchBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn type_text(&mut self, text: impl Into<String>) {
        self.pending = text.into();
    }

    /// Commits the pending text. Returns `true` when the committed text changed.
    pub fn submit(&mut self) -> bool {
        if self.pending == self.committed {
            return false;
        }
        self.committed = self.pending.clone();
        true
    }

    pub fn clear(&mut self) -> bool {
        self.pending.clear();
        self.submit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_requires_open_panel() {
        let mut holder = Drafted::new(1);
        assert!(!holder.edit(|v| *v = 5));
        assert_eq!(*holder.committed(), 1);
    }

    #[test]
    fn apply_promotes_draft() {
        let mut holder = Drafted::new(1);
        holder.open();
        assert!(holder.edit(|v| *v = 2));
        assert_eq!(*holder.committed(), 1);
        assert!(holder.apply());
        assert_eq!(*holder.committed(), 2);
        assert!(!holder.is_open());
    }

    #[test]
    fn apply_without_change_reports_false() {
        let mut holder = Drafted::new(1);
        holder.open();
        assert!(!holder.apply());
        assert!(!holder.apply());
    }

    #[test]
    fn cancel_discards_edits() {
        let mut holder = Drafted::new(1);
        holder.open();
        holder.edit(|v| *v = 9);
        holder.cancel();
        assert_eq!(*holder.committed(), 1);
        assert_eq!(holder.draft(), None);
    }

    #[test]
    fn reopen_after_cancel_shows_committed_not_stale_edit() {
        let mut holder = Drafted::new(1);
        holder.open();
        holder.edit(|v| *v = 2);
        holder.apply();

        holder.open();
        holder.edit(|v| *v = 7);
        holder.cancel();

        assert_eq!(*holder.open(), 2);
    }

    #[test]
    fn open_twice_keeps_edits() {
        let mut holder = Drafted::new(1);
        holder.open();
        holder.edit(|v| *v = 3);
        assert_eq!(*holder.open(), 3);
    }

    #[test]
    fn search_box_commits_only_on_submit() {
        let mut search = SearchBox::new();
        search.type_text("ja");
        search.type_text("java");
        assert_eq!(search.committed(), "");
        assert!(search.submit());
        assert_eq!(search.committed(), "java");
        assert!(!search.submit());
    }

    #[test]
    fn search_box_clear() {
        let mut search = SearchBox::new();
        search.type_text("java");
        search.submit();
        assert!(search.clear());
        assert_eq!(search.committed(), "");
        assert_eq!(search.pending(), "");
    }
}
