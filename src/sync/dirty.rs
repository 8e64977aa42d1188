//! Dirty-state tracking for domain entities.
//!
//! Every entity owns a [`DirtyState`]: one object-level flag plus a set of
//! field names modified since the last successful sync. The engine consults
//! it before building any request and clears it only after a request
//! succeeds, so a clean entity round-trips with zero network writes.

use std::collections::BTreeSet;

/// Tracks which fields of an entity changed since the last successful sync.
///
/// Updated only through the entity's designated mutation entry points;
/// hydration from a response does not mark anything dirty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyState {
    dirty: bool,
    fields: BTreeSet<String>,
}

impl DirtyState {
    /// Creates a clean state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a single field (and the object) dirty.
    pub fn mark(&mut self, field: &str) {
        self.dirty = true;
        self.fields.insert(field.to_string());
    }

    /// Returns `true` if any field has been modified.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns `true` if the given field has been modified.
    #[must_use]
    pub fn is_field_dirty(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// Clears all dirty flags after a successful persistence round-trip.
    pub fn clear(&mut self) {
        self.dirty = false;
        self.fields.clear();
    }

    /// Clears the flag for a single field.
    ///
    /// The object-level flag drops only when no dirty fields remain.
    pub fn clear_field(&mut self, field: &str) {
        self.fields.remove(field);
        if self.fields.is_empty() {
            self.dirty = false;
        }
    }

    /// Returns the names of all dirty fields in sorted order.
    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_clean() {
        let state = DirtyState::new();
        assert!(!state.is_dirty());
        assert!(!state.is_field_dirty("Name"));
    }

    #[test]
    fn test_mark_sets_object_and_field_flags() {
        let mut state = DirtyState::new();
        state.mark("Name");

        assert!(state.is_dirty());
        assert!(state.is_field_dirty("Name"));
        assert!(!state.is_field_dirty("Email"));
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut state = DirtyState::new();
        state.mark("Name");
        state.mark("Email");

        state.clear();
        assert!(!state.is_dirty());
        assert!(!state.is_field_dirty("Name"));
        assert!(!state.is_field_dirty("Email"));
    }

    #[test]
    fn test_clear_field_keeps_other_fields_dirty() {
        let mut state = DirtyState::new();
        state.mark("Name");
        state.mark("Email");

        state.clear_field("Name");
        assert!(state.is_dirty());
        assert!(!state.is_field_dirty("Name"));
        assert!(state.is_field_dirty("Email"));
    }

    #[test]
    fn test_clear_last_field_drops_object_flag() {
        let mut state = DirtyState::new();
        state.mark("Name");

        state.clear_field("Name");
        assert!(!state.is_dirty());
    }

    #[test]
    fn test_dirty_fields_iterates_sorted() {
        let mut state = DirtyState::new();
        state.mark("Name");
        state.mark("Email");

        let fields: Vec<&str> = state.dirty_fields().collect();
        assert_eq!(fields, vec!["Email", "Name"]);
    }
}
