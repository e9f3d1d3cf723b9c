//! Saved-object documents, operation options and responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SavedObjectsErrorPayload;

/// A named reference from one saved object to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedObjectReference {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
}

/// A persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedObject {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
    /// Owning tenant; nil for objects written through an internal repository.
    pub tenant_id: Uuid,
    /// Space ids the object lives in. Empty for namespace-agnostic types.
    #[serde(default)]
    pub namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub attributes: serde_json::Value,
    #[serde(default)]
    pub references: Vec<SavedObjectReference>,
}

/// Options shared by single-object reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseOptions {
    /// Namespace to operate in; `None` is the default space.
    pub namespace: Option<String>,
}

impl BaseOptions {
    #[must_use]
    pub fn in_namespace(namespace: &str) -> Self {
        Self {
            namespace: Some(namespace.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOptions {
    /// Explicit object id; generated when absent.
    pub id: Option<String>,
    pub namespace: Option<String>,
    /// Replace an existing object with the same id instead of failing with a conflict.
    pub overwrite: bool,
    /// Spaces a multi-namespace object is created in, in addition to `namespace`.
    pub initial_namespaces: Vec<String>,
    pub references: Vec<SavedObjectReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkCreateObject {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub object_type: String,
    pub attributes: serde_json::Value,
    #[serde(default)]
    pub references: Vec<SavedObjectReference>,
    #[serde(default)]
    pub initial_namespaces: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkCreateOptions {
    pub namespace: Option<String>,
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkGetObject {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
}

impl BulkGetObject {
    #[must_use]
    pub fn new(object_type: &str, id: &str) -> Self {
        Self {
            id: id.to_owned(),
            object_type: object_type.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOptions {
    pub types: Vec<String>,
    /// Case-insensitive substring matched against string attributes.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: usize,
    /// Page size; `None` uses the repository default.
    pub per_page: Option<usize>,
    pub namespace: Option<String>,
    /// Space ids to search; `"*"` matches all. Takes precedence over `namespace`.
    pub namespaces: Option<Vec<String>>,
    /// Per-type restriction of the space ids searched.
    pub type_to_namespaces: Option<BTreeMap<String, Vec<String>>>,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            types: Vec::new(),
            search: None,
            page: 1,
            per_page: None,
            namespace: None,
            namespaces: None,
            type_to_namespaces: None,
        }
    }
}

impl FindOptions {
    #[must_use]
    pub fn for_types(types: &[&str]) -> Self {
        Self {
            types: types.iter().map(|t| (*t).to_owned()).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindResponse {
    pub saved_objects: Vec<SavedObject>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOptions {
    pub namespace: Option<String>,
    /// Expected current version; a mismatch fails with a conflict.
    pub version: Option<String>,
    pub references: Option<Vec<SavedObjectReference>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOptions {
    pub namespace: Option<String>,
    /// Delete a multi-namespace object even if it exists in several spaces.
    pub force: bool,
}

/// One entry of a bulk response, in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BulkItem {
    Found(SavedObject),
    Error {
        id: String,
        #[serde(rename = "type")]
        object_type: String,
        error: SavedObjectsErrorPayload,
    },
}

impl BulkItem {
    #[must_use]
    pub fn saved_object(&self) -> Option<&SavedObject> {
        match self {
            Self::Found(obj) => Some(obj),
            Self::Error { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkResponse {
    pub saved_objects: Vec<BulkItem>,
}
