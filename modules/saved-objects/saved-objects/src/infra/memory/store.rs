use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use saved_objects_sdk::{NamespaceType, SavedObject};

type Documents = BTreeMap<String, SavedObject>;

/// Process-local document store shared by all repositories of a service.
///
/// Guards are never held across an `.await`.
#[derive(Default)]
pub struct DocumentStore {
    docs: RwLock<Documents>,
    seq: AtomicU64,
}

impl DocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next optimistic-concurrency version token.
    pub(crate) fn next_version(&self) -> String {
        let n = self.seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!("v{n}")
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Documents> {
        self.docs.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Documents> {
        self.docs.write()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

/// Storage key of an object.
///
/// Single-namespace objects outside the default space are prefixed with their namespace so
/// the same id can exist once per space.
pub(crate) fn raw_id(
    namespace_type: NamespaceType,
    namespace: Option<&str>,
    object_type: &str,
    id: &str,
) -> String {
    match (namespace_type, namespace) {
        (NamespaceType::Single, Some(ns)) => format!("{ns}:{object_type}:{id}"),
        _ => format!("{object_type}:{id}"),
    }
}
