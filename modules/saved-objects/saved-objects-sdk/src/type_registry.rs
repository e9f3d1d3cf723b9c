//! Registry of saved-object types known to the service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;

/// How objects of a type relate to spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamespaceType {
    /// The object lives in exactly one space.
    #[default]
    Single,
    /// The object can be shared to several spaces.
    Multiple,
    /// The object exists outside of any space.
    Agnostic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedObjectsType {
    pub name: String,
    /// Hidden types are only reachable by clients that explicitly include them.
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub namespace_type: NamespaceType,
}

impl SavedObjectsType {
    #[must_use]
    pub fn new(name: &str, namespace_type: NamespaceType) -> Self {
        Self {
            name: name.to_owned(),
            hidden: false,
            namespace_type,
        }
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Type registry populated during setup and shared read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct SavedObjectTypeRegistry {
    types: BTreeMap<String, SavedObjectsType>,
}

impl SavedObjectTypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type.
    ///
    /// # Errors
    /// Returns [`SetupError::TypeAlreadyRegistered`] if a type with the same name exists.
    pub fn register_type(&mut self, object_type: SavedObjectsType) -> Result<(), SetupError> {
        if self.types.contains_key(&object_type.name) {
            return Err(SetupError::TypeAlreadyRegistered {
                name: object_type.name,
            });
        }
        self.types.insert(object_type.name.clone(), object_type);
        Ok(())
    }

    #[must_use]
    pub fn get_type(&self, name: &str) -> Option<&SavedObjectsType> {
        self.types.get(name)
    }

    pub fn get_all_types(&self) -> impl Iterator<Item = &SavedObjectsType> {
        self.types.values()
    }

    pub fn get_visible_types(&self) -> impl Iterator<Item = &SavedObjectsType> {
        self.types.values().filter(|t| !t.hidden)
    }

    #[must_use]
    pub fn is_hidden(&self, name: &str) -> bool {
        self.types.get(name).is_some_and(|t| t.hidden)
    }

    /// Namespace type of `name`; unknown types are treated as single-namespace.
    #[must_use]
    pub fn namespace_type(&self, name: &str) -> NamespaceType {
        self.types
            .get(name)
            .map(|t| t.namespace_type)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_single_namespace(&self, name: &str) -> bool {
        self.namespace_type(name) == NamespaceType::Single
    }

    #[must_use]
    pub fn is_multi_namespace(&self, name: &str) -> bool {
        self.namespace_type(name) == NamespaceType::Multiple
    }

    #[must_use]
    pub fn is_namespace_agnostic(&self, name: &str) -> bool {
        self.namespace_type(name) == NamespaceType::Agnostic
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn registry() -> SavedObjectTypeRegistry {
        let mut registry = SavedObjectTypeRegistry::new();
        registry
            .register_type(SavedObjectsType::new("dashboard", NamespaceType::Single))
            .unwrap();
        registry
            .register_type(SavedObjectsType::new("index-pattern", NamespaceType::Multiple))
            .unwrap();
        registry
            .register_type(SavedObjectsType::new("config", NamespaceType::Agnostic).hidden())
            .unwrap();
        registry
    }

    #[test]
    fn duplicate_type_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register_type(SavedObjectsType::new("dashboard", NamespaceType::Multiple))
            .unwrap_err();

        assert_eq!(
            err,
            SetupError::TypeAlreadyRegistered {
                name: "dashboard".to_owned()
            }
        );
        assert!(registry.is_single_namespace("dashboard"));
    }

    #[test]
    fn visible_types_skip_hidden_ones() {
        let registry = registry();
        let visible: Vec<_> = registry.get_visible_types().map(|t| t.name.as_str()).collect();

        assert_eq!(visible, vec!["dashboard", "index-pattern"]);
        assert!(registry.is_hidden("config"));
        assert!(!registry.is_hidden("unknown"));
    }

    #[test]
    fn namespace_type_queries() {
        let registry = registry();

        assert!(registry.is_multi_namespace("index-pattern"));
        assert!(registry.is_namespace_agnostic("config"));
        assert!(registry.is_single_namespace("not-registered"));
    }
}
