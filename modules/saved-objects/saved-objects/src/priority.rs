//! Priority-ordered registry of client wrappers.
//!
//! Entries are kept sorted by priority, highest first. Priorities and ids are unique, so
//! the order is total and does not depend on the order of registration.

use std::sync::Arc;

use saved_objects_sdk::SetupError;

/// A registered value with its priority and id.
#[derive(Clone)]
pub struct PriorityEntry<T> {
    pub priority: i64,
    pub id: Arc<str>,
    pub value: T,
}

impl<T> std::fmt::Debug for PriorityEntry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityEntry")
            .field("priority", &self.priority)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Append-only collection ordered by descending priority.
pub struct PriorityCollection<T> {
    entries: Vec<PriorityEntry<T>>,
}

impl<T> Default for PriorityCollection<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> PriorityCollection<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` at its priority.
    ///
    /// # Errors
    /// Fails without modifying the collection when `priority` or `id` is already taken.
    pub fn add(&mut self, priority: i64, id: &str, value: T) -> Result<(), SetupError> {
        if self.entries.iter().any(|e| &*e.id == id) {
            return Err(SetupError::DuplicateWrapperId { id: id.to_owned() });
        }

        // Sorted descending: search with reversed comparison.
        match self
            .entries
            .binary_search_by(|e| priority.cmp(&e.priority))
        {
            Ok(pos) => Err(SetupError::DuplicatePriority {
                priority,
                id: id.to_owned(),
                existing_id: self.entries[pos].id.to_string(),
            }),
            Err(pos) => {
                self.entries.insert(
                    pos,
                    PriorityEntry {
                        priority,
                        id: Arc::from(id),
                        value,
                    },
                );
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn has(&self, id: &str) -> bool {
        self.entries.iter().any(|e| &*e.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from the highest to the lowest priority.
    #[must_use]
    pub fn to_prioritized(&self) -> &[PriorityEntry<T>] {
        &self.entries
    }

    /// Freeze into an immutable, shareable slice ordered like [`Self::to_prioritized`].
    #[must_use]
    pub fn into_frozen(self) -> Arc<[PriorityEntry<T>]> {
        self.entries.into()
    }
}
