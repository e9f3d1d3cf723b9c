//! Configuration for the saved-objects module.

use serde::Deserialize;

/// Module configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SavedObjectsConfig {
    /// Page size used by `find` when the caller does not set one.
    pub default_per_page: usize,

    /// Largest page size `find` accepts.
    pub max_per_page: usize,
}

impl Default for SavedObjectsConfig {
    fn default() -> Self {
        Self {
            default_per_page: 20,
            max_per_page: 10_000,
        }
    }
}
