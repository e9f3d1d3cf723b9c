use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use saved_objects_sdk::utils::{
    ALL_NAMESPACES_STRING, create_empty_find_response, namespace_id_to_string,
    namespace_string_to_id,
};
use saved_objects_sdk::{
    AccessScope, BaseOptions, BulkCreateObject, BulkCreateOptions, BulkGetObject, BulkItem,
    BulkResponse, CreateOptions, DefaultErrorHelpers, DeleteOptions, FindOptions, FindResponse,
    NamespaceType, SavedObject, SavedObjectReference, SavedObjectTypeRegistry,
    SavedObjectsClientContract, SavedObjectsError, SavedObjectsErrorHelpers, UpdateOptions,
};
use uuid::Uuid;

use super::store::{DocumentStore, raw_id};
use crate::config::SavedObjectsConfig;

/// Which documents a repository can see and who owns what it writes.
#[derive(Debug, Clone)]
pub(crate) enum Visibility {
    /// Internal repository: every document, writes owned by nobody (nil tenant).
    Unrestricted,
    /// Scoped repository: documents of the scope's tenants, writes owned by `owner`.
    Scoped { scope: AccessScope, owner: Uuid },
}

/// Repository over a [`DocumentStore`].
pub struct InMemoryRepository {
    store: Arc<DocumentStore>,
    type_registry: Arc<SavedObjectTypeRegistry>,
    allowed_types: Vec<String>,
    visibility: Visibility,
    config: SavedObjectsConfig,
    errors: DefaultErrorHelpers,
}

struct NewObject<'a> {
    object_type: &'a str,
    id: Option<String>,
    attributes: serde_json::Value,
    references: Vec<SavedObjectReference>,
    initial_namespaces: Vec<String>,
}

impl InMemoryRepository {
    pub(crate) fn new(
        store: Arc<DocumentStore>,
        type_registry: Arc<SavedObjectTypeRegistry>,
        allowed_types: Vec<String>,
        visibility: Visibility,
        config: SavedObjectsConfig,
    ) -> Self {
        Self {
            store,
            type_registry,
            allowed_types,
            visibility,
            config,
            errors: DefaultErrorHelpers,
        }
    }

    #[must_use]
    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    #[must_use]
    pub fn is_scoped(&self) -> bool {
        matches!(self.visibility, Visibility::Scoped { .. })
    }

    fn is_allowed(&self, object_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == object_type)
    }

    fn is_visible(&self, obj: &SavedObject) -> bool {
        match &self.visibility {
            Visibility::Unrestricted => true,
            Visibility::Scoped { scope, .. } => scope.contains_tenant(obj.tenant_id),
        }
    }

    fn owner(&self) -> Uuid {
        match &self.visibility {
            Visibility::Unrestricted => Uuid::nil(),
            Visibility::Scoped { owner, .. } => *owner,
        }
    }

    fn normalize_namespace(
        &self,
        namespace: Option<&str>,
    ) -> Result<Option<String>, SavedObjectsError> {
        match namespace {
            None => Ok(None),
            Some(ns) => namespace_string_to_id(ns, &self.errors),
        }
    }

    fn key(&self, object_type: &str, id: &str, namespace: Option<&str>) -> String {
        raw_id(
            self.type_registry.namespace_type(object_type),
            namespace,
            object_type,
            id,
        )
    }

    /// Whether `obj` is reachable from `namespace`.
    fn in_namespace(&self, obj: &SavedObject, namespace: Option<&str>) -> bool {
        match self.type_registry.namespace_type(&obj.object_type) {
            // The namespace is part of the storage key.
            NamespaceType::Single | NamespaceType::Agnostic => true,
            NamespaceType::Multiple => {
                let ns = namespace_id_to_string(namespace);
                obj.namespaces
                    .iter()
                    .any(|n| *n == ns || n == ALL_NAMESPACES_STRING)
            }
        }
    }

    fn create_one(
        &self,
        new: NewObject<'_>,
        namespace: Option<&str>,
        overwrite: bool,
    ) -> Result<SavedObject, SavedObjectsError> {
        if !self.is_allowed(new.object_type) {
            return Err(self.errors.create_unsupported_type_error(new.object_type));
        }

        let namespace_type = self.type_registry.namespace_type(new.object_type);
        if !new.initial_namespaces.is_empty() && namespace_type != NamespaceType::Multiple {
            return Err(self
                .errors
                .create_bad_request_error("initialNamespaces can only be used on multi-namespace types"));
        }

        let namespaces = match namespace_type {
            NamespaceType::Single => vec![namespace_id_to_string(namespace)],
            NamespaceType::Multiple if new.initial_namespaces.is_empty() => {
                vec![namespace_id_to_string(namespace)]
            }
            NamespaceType::Multiple => {
                let mut namespaces = new.initial_namespaces;
                namespaces.sort();
                namespaces.dedup();
                namespaces
            }
            NamespaceType::Agnostic => Vec::new(),
        };

        let id = new.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let key = self.key(new.object_type, &id, namespace);

        let mut docs = self.store.write();
        if let Some(existing) = docs.get(&key) {
            let reachable = self.is_visible(existing) && self.in_namespace(existing, namespace);
            if !overwrite || !reachable {
                return Err(self.errors.create_conflict_error(new.object_type, &id));
            }
        }

        let obj = SavedObject {
            id,
            object_type: new.object_type.to_owned(),
            tenant_id: self.owner(),
            namespaces,
            version: Some(self.store.next_version()),
            updated_at: Some(Utc::now()),
            attributes: new.attributes,
            references: new.references,
        };
        docs.insert(key, obj.clone());
        Ok(obj)
    }

    fn get_one(
        &self,
        object_type: &str,
        id: &str,
        namespace: Option<&str>,
    ) -> Result<SavedObject, SavedObjectsError> {
        if !self.is_allowed(object_type) {
            return Err(self.errors.create_generic_not_found_error(object_type, id));
        }
        let key = self.key(object_type, id, namespace);
        self.store
            .read()
            .get(&key)
            .filter(|obj| self.is_visible(obj) && self.in_namespace(obj, namespace))
            .cloned()
            .ok_or_else(|| self.errors.create_generic_not_found_error(object_type, id))
    }

    fn matches_search(obj: &SavedObject, search: &str) -> bool {
        let needle = search.to_lowercase();
        match &obj.attributes {
            serde_json::Value::Object(map) => map.values().any(|v| {
                v.as_str()
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
            }),
            serde_json::Value::String(s) => s.to_lowercase().contains(&needle),
            _ => false,
        }
    }

    fn matches_namespaces(&self, obj: &SavedObject, namespaces: &[String]) -> bool {
        if self.type_registry.is_namespace_agnostic(&obj.object_type)
            || namespaces.iter().any(|n| n == ALL_NAMESPACES_STRING)
        {
            return true;
        }
        obj.namespaces
            .iter()
            .any(|n| n == ALL_NAMESPACES_STRING || namespaces.contains(n))
    }
}

#[async_trait]
impl SavedObjectsClientContract for InMemoryRepository {
    async fn create(
        &self,
        object_type: &str,
        attributes: serde_json::Value,
        options: CreateOptions,
    ) -> Result<SavedObject, SavedObjectsError> {
        let namespace = self.normalize_namespace(options.namespace.as_deref())?;
        self.create_one(
            NewObject {
                object_type,
                id: options.id,
                attributes,
                references: options.references,
                initial_namespaces: options.initial_namespaces,
            },
            namespace.as_deref(),
            options.overwrite,
        )
    }

    async fn bulk_create(
        &self,
        objects: Vec<BulkCreateObject>,
        options: BulkCreateOptions,
    ) -> Result<BulkResponse, SavedObjectsError> {
        let namespace = self.normalize_namespace(options.namespace.as_deref())?;
        let saved_objects = objects
            .into_iter()
            .map(|obj| {
                let id = obj.id.clone().unwrap_or_default();
                let object_type = obj.object_type.clone();
                let result = self.create_one(
                    NewObject {
                        object_type: &obj.object_type,
                        id: obj.id,
                        attributes: obj.attributes,
                        references: obj.references,
                        initial_namespaces: obj.initial_namespaces,
                    },
                    namespace.as_deref(),
                    options.overwrite,
                );
                match result {
                    Ok(created) => BulkItem::Found(created),
                    Err(err) => BulkItem::Error {
                        id,
                        object_type,
                        error: err.to_payload(),
                    },
                }
            })
            .collect();
        Ok(BulkResponse { saved_objects })
    }

    async fn get(
        &self,
        object_type: &str,
        id: &str,
        options: BaseOptions,
    ) -> Result<SavedObject, SavedObjectsError> {
        let namespace = self.normalize_namespace(options.namespace.as_deref())?;
        self.get_one(object_type, id, namespace.as_deref())
    }

    async fn bulk_get(
        &self,
        objects: Vec<BulkGetObject>,
        options: BaseOptions,
    ) -> Result<BulkResponse, SavedObjectsError> {
        let namespace = self.normalize_namespace(options.namespace.as_deref())?;
        let saved_objects = objects
            .into_iter()
            .map(|BulkGetObject { id, object_type }| {
                if !self.is_allowed(&object_type) {
                    let error = self.errors.create_unsupported_type_error(&object_type);
                    return BulkItem::Error {
                        id,
                        object_type,
                        error: error.to_payload(),
                    };
                }
                match self.get_one(&object_type, &id, namespace.as_deref()) {
                    Ok(obj) => BulkItem::Found(obj),
                    Err(err) => BulkItem::Error {
                        id,
                        object_type,
                        error: err.to_payload(),
                    },
                }
            })
            .collect();
        Ok(BulkResponse { saved_objects })
    }

    async fn find(&self, options: FindOptions) -> Result<FindResponse, SavedObjectsError> {
        if options.types.is_empty() {
            return Err(self
                .errors
                .create_bad_request_error("options.types must contain at least one type"));
        }
        if options.page == 0 {
            return Err(self
                .errors
                .create_bad_request_error("options.page must be greater than 0"));
        }
        let per_page = options.per_page.unwrap_or(self.config.default_per_page);
        if per_page > self.config.max_per_page {
            return Err(self.errors.create_bad_request_error(&format!(
                "options.per_page cannot exceed {}",
                self.config.max_per_page
            )));
        }

        let types: Vec<&str> = options
            .types
            .iter()
            .map(String::as_str)
            .filter(|t| self.is_allowed(t))
            .collect();
        if types.is_empty() {
            return Ok(create_empty_find_response(
                &options,
                self.config.default_per_page,
            ));
        }

        let namespaces = match &options.namespaces {
            Some(namespaces) if namespaces.is_empty() => {
                return Err(self
                    .errors
                    .create_bad_request_error("options.namespaces cannot be an empty array"));
            }
            Some(namespaces) => namespaces.clone(),
            None => vec![namespace_id_to_string(options.namespace.as_deref())],
        };

        let mut matches: Vec<SavedObject> = self
            .store
            .read()
            .values()
            .filter(|obj| types.contains(&obj.object_type.as_str()))
            .filter(|obj| self.is_visible(obj))
            .filter(|obj| self.matches_namespaces(obj, &namespaces))
            .filter(|obj| match &options.type_to_namespaces {
                None => true,
                Some(map) => map
                    .get(&obj.object_type)
                    .is_some_and(|allowed| self.matches_namespaces(obj, allowed)),
            })
            .filter(|obj| {
                options
                    .search
                    .as_deref()
                    .is_none_or(|search| Self::matches_search(obj, search))
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            (a.object_type.as_str(), a.id.as_str()).cmp(&(b.object_type.as_str(), b.id.as_str()))
        });

        let total = matches.len();
        let saved_objects = matches
            .into_iter()
            .skip((options.page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();

        Ok(FindResponse {
            saved_objects,
            total,
            page: options.page,
            per_page,
        })
    }

    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: serde_json::Value,
        options: UpdateOptions,
    ) -> Result<SavedObject, SavedObjectsError> {
        if !self.is_allowed(object_type) {
            return Err(self.errors.create_generic_not_found_error(object_type, id));
        }
        let namespace = self.normalize_namespace(options.namespace.as_deref())?;
        let key = self.key(object_type, id, namespace.as_deref());

        let mut docs = self.store.write();
        let existing = docs
            .get_mut(&key)
            .filter(|obj| self.is_visible(obj) && self.in_namespace(obj, namespace.as_deref()))
            .ok_or_else(|| self.errors.create_generic_not_found_error(object_type, id))?;

        if let Some(expected) = &options.version
            && existing.version.as_ref() != Some(expected)
        {
            return Err(self.errors.create_conflict_error(object_type, id));
        }

        match (&mut existing.attributes, attributes) {
            (serde_json::Value::Object(current), serde_json::Value::Object(patch)) => {
                current.extend(patch);
            }
            (current, replacement) => *current = replacement,
        }
        if let Some(references) = options.references {
            existing.references = references;
        }
        existing.version = Some(self.store.next_version());
        existing.updated_at = Some(Utc::now());

        Ok(existing.clone())
    }

    async fn delete(
        &self,
        object_type: &str,
        id: &str,
        options: DeleteOptions,
    ) -> Result<(), SavedObjectsError> {
        if !self.is_allowed(object_type) {
            return Err(self.errors.create_generic_not_found_error(object_type, id));
        }
        let namespace = self.normalize_namespace(options.namespace.as_deref())?;
        let key = self.key(object_type, id, namespace.as_deref());

        let mut docs = self.store.write();
        let existing = docs
            .get(&key)
            .filter(|obj| self.is_visible(obj) && self.in_namespace(obj, namespace.as_deref()))
            .ok_or_else(|| self.errors.create_generic_not_found_error(object_type, id))?;

        if self.type_registry.is_multi_namespace(object_type)
            && existing.namespaces.len() > 1
            && !options.force
        {
            return Err(self.errors.create_bad_request_error(
                "Unable to delete saved object that exists in multiple namespaces, use the `force` option to delete it anyway",
            ));
        }

        docs.remove(&key);
        Ok(())
    }
}
