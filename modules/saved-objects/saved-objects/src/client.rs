//! The plain saved-objects client handed to callers before any wrapper applies.

use std::sync::Arc;

use async_trait::async_trait;
use saved_objects_sdk::{
    BaseOptions, BulkCreateObject, BulkCreateOptions, BulkGetObject, BulkResponse, CreateOptions,
    DefaultErrorHelpers, DeleteOptions, FindOptions, FindResponse, SavedObject,
    SavedObjectsClientContract, SavedObjectsClientRef, SavedObjectsError,
    SavedObjectsErrorHelpers, UpdateOptions,
};

/// Client delegating every operation to a repository.
pub struct SavedObjectsClient {
    repository: SavedObjectsClientRef,
}

impl SavedObjectsClient {
    #[must_use]
    pub fn new(repository: SavedObjectsClientRef) -> Self {
        Self { repository }
    }

    /// Error helpers used by every client built by this module.
    #[must_use]
    pub fn default_errors() -> Arc<dyn SavedObjectsErrorHelpers> {
        Arc::new(DefaultErrorHelpers)
    }
}

#[async_trait]
impl SavedObjectsClientContract for SavedObjectsClient {
    async fn create(
        &self,
        object_type: &str,
        attributes: serde_json::Value,
        options: CreateOptions,
    ) -> Result<SavedObject, SavedObjectsError> {
        self.repository.create(object_type, attributes, options).await
    }

    async fn bulk_create(
        &self,
        objects: Vec<BulkCreateObject>,
        options: BulkCreateOptions,
    ) -> Result<BulkResponse, SavedObjectsError> {
        self.repository.bulk_create(objects, options).await
    }

    async fn get(
        &self,
        object_type: &str,
        id: &str,
        options: BaseOptions,
    ) -> Result<SavedObject, SavedObjectsError> {
        self.repository.get(object_type, id, options).await
    }

    async fn bulk_get(
        &self,
        objects: Vec<BulkGetObject>,
        options: BaseOptions,
    ) -> Result<BulkResponse, SavedObjectsError> {
        if objects.is_empty() {
            return Ok(BulkResponse {
                saved_objects: Vec::new(),
            });
        }
        self.repository.bulk_get(objects, options).await
    }

    async fn find(&self, options: FindOptions) -> Result<FindResponse, SavedObjectsError> {
        self.repository.find(options).await
    }

    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: serde_json::Value,
        options: UpdateOptions,
    ) -> Result<SavedObject, SavedObjectsError> {
        self.repository
            .update(object_type, id, attributes, options)
            .await
    }

    async fn delete(
        &self,
        object_type: &str,
        id: &str,
        options: DeleteOptions,
    ) -> Result<(), SavedObjectsError> {
        self.repository.delete(object_type, id, options).await
    }

    fn errors(&self) -> Arc<dyn SavedObjectsErrorHelpers> {
        Self::default_errors()
    }
}
