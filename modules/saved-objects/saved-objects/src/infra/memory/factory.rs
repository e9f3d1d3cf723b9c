use std::sync::Arc;

use saved_objects_sdk::{
    DefaultErrorHelpers, RepositoryFactory, RequestContext, SavedObjectTypeRegistry,
    SavedObjectsClientRef, SavedObjectsError, SavedObjectsErrorHelpers,
};
use tracing::debug;

use super::repository::{InMemoryRepository, Visibility};
use super::store::DocumentStore;
use crate::config::SavedObjectsConfig;

/// [`RepositoryFactory`] over a shared [`DocumentStore`].
#[derive(Clone)]
pub struct InMemoryRepositoryFactory {
    store: Arc<DocumentStore>,
    type_registry: Arc<SavedObjectTypeRegistry>,
    config: SavedObjectsConfig,
}

impl InMemoryRepositoryFactory {
    #[must_use]
    pub fn new(
        store: Arc<DocumentStore>,
        type_registry: Arc<SavedObjectTypeRegistry>,
        config: SavedObjectsConfig,
    ) -> Self {
        Self {
            store,
            type_registry,
            config,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    /// Visible types plus the requested hidden ones.
    fn allowed_types(&self, included_hidden_types: &[String]) -> Result<Vec<String>, SavedObjectsError> {
        let mut missing: Vec<&str> = included_hidden_types
            .iter()
            .map(String::as_str)
            .filter(|t| self.type_registry.get_type(t).is_none())
            .collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            missing.dedup();
            return Err(DefaultErrorHelpers.create_bad_request_error(&format!(
                "Missing mappings for saved objects types: '{}'",
                missing.join(", ")
            )));
        }

        let mut allowed: Vec<String> = self
            .type_registry
            .get_visible_types()
            .map(|t| t.name.clone())
            .collect();
        for hidden in included_hidden_types {
            if !allowed.contains(hidden) {
                allowed.push(hidden.clone());
            }
        }
        Ok(allowed)
    }
}

impl RepositoryFactory for InMemoryRepositoryFactory {
    fn create_internal_repository(
        &self,
        included_hidden_types: &[String],
    ) -> Result<SavedObjectsClientRef, SavedObjectsError> {
        let allowed_types = self.allowed_types(included_hidden_types)?;
        debug!(types = allowed_types.len(), "creating internal repository");
        Ok(Arc::new(InMemoryRepository::new(
            Arc::clone(&self.store),
            Arc::clone(&self.type_registry),
            allowed_types,
            Visibility::Unrestricted,
            self.config.clone(),
        )))
    }

    fn create_scoped_repository(
        &self,
        request: &RequestContext,
        included_hidden_types: &[String],
    ) -> Result<SavedObjectsClientRef, SavedObjectsError> {
        let allowed_types = self.allowed_types(included_hidden_types)?;
        debug!(
            request_id = %request.request_id(),
            tenant_id = %request.tenant_id(),
            types = allowed_types.len(),
            "creating scoped repository"
        );
        Ok(Arc::new(InMemoryRepository::new(
            Arc::clone(&self.store),
            Arc::clone(&self.type_registry),
            allowed_types,
            Visibility::Scoped {
                scope: request.access_scope(),
                owner: request.tenant_id(),
            },
            self.config.clone(),
        )))
    }
}
