//! Public contracts of the saved-objects module.
//!
//! - [`SavedObjectsClientContract`] - operations over persisted documents, implemented by
//!   repositories, the plain client and every wrapper
//! - [`RepositoryFactory`] - creates internal or request-scoped repositories
//! - [`SavedObjectsServiceSetup`] - registration surface used by other modules during setup

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::error::{DefaultErrorHelpers, SavedObjectsError, SavedObjectsErrorHelpers, SetupError};
use crate::models::{
    BaseOptions, BulkCreateObject, BulkCreateOptions, BulkGetObject, BulkResponse, CreateOptions,
    DeleteOptions, FindOptions, FindResponse, SavedObject, UpdateOptions,
};
use crate::type_registry::{SavedObjectTypeRegistry, SavedObjectsType};

/// Shared handle to any saved-objects client.
pub type SavedObjectsClientRef = Arc<dyn SavedObjectsClientContract>;

/// Operations over persisted saved objects.
///
/// Repositories, the plain client and decorating wrappers all implement this trait, so a
/// wrapper is a drop-in replacement for the client it wraps.
#[async_trait]
pub trait SavedObjectsClientContract: Send + Sync {
    /// Persist a new object.
    ///
    /// # Errors
    /// - `Conflict` if an object with the same id exists and `overwrite` is not set
    /// - `UnsupportedType` if the type is not available to this client
    async fn create(
        &self,
        object_type: &str,
        attributes: serde_json::Value,
        options: CreateOptions,
    ) -> Result<SavedObject, SavedObjectsError>;

    /// Persist several objects; per-object failures are reported inline.
    async fn bulk_create(
        &self,
        objects: Vec<BulkCreateObject>,
        options: BulkCreateOptions,
    ) -> Result<BulkResponse, SavedObjectsError>;

    /// # Errors
    /// - `NotFound` if the object does not exist or is not visible to this client
    async fn get(
        &self,
        object_type: &str,
        id: &str,
        options: BaseOptions,
    ) -> Result<SavedObject, SavedObjectsError>;

    /// Fetch several objects; missing ones are reported inline, in request order.
    async fn bulk_get(
        &self,
        objects: Vec<BulkGetObject>,
        options: BaseOptions,
    ) -> Result<BulkResponse, SavedObjectsError>;

    async fn find(&self, options: FindOptions) -> Result<FindResponse, SavedObjectsError>;

    /// Merge `attributes` into an existing object.
    ///
    /// # Errors
    /// - `NotFound` if the object does not exist or is not visible to this client
    /// - `Conflict` if `options.version` does not match the stored version
    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: serde_json::Value,
        options: UpdateOptions,
    ) -> Result<SavedObject, SavedObjectsError>;

    async fn delete(
        &self,
        object_type: &str,
        id: &str,
        options: DeleteOptions,
    ) -> Result<(), SavedObjectsError>;

    /// Error constructors of this client.
    fn errors(&self) -> Arc<dyn SavedObjectsErrorHelpers> {
        Arc::new(DefaultErrorHelpers)
    }
}

/// Creates persistence repositories.
///
/// Repositories are created fresh per request and never shared across requests.
pub trait RepositoryFactory: Send + Sync {
    /// Repository with full access, not filtered by any identity.
    ///
    /// # Errors
    /// Fails if a name in `included_hidden_types` is not a registered type.
    fn create_internal_repository(
        &self,
        included_hidden_types: &[String],
    ) -> Result<SavedObjectsClientRef, SavedObjectsError>;

    /// Repository restricted to the documents visible to the request's identity.
    ///
    /// # Errors
    /// Fails if a name in `included_hidden_types` is not a registered type.
    fn create_scoped_repository(
        &self,
        request: &RequestContext,
        included_hidden_types: &[String],
    ) -> Result<SavedObjectsClientRef, SavedObjectsError>;
}

/// Input of a [`ClientFactory`].
#[derive(Debug, Clone)]
pub struct ClientFactoryParams {
    pub request: RequestContext,
    pub included_hidden_types: Vec<String>,
}

/// Builds the base (unwrapped) client for a request.
pub type ClientFactory =
    Arc<dyn Fn(ClientFactoryParams) -> Result<SavedObjectsClientRef, SavedObjectsError> + Send + Sync>;

/// Turns the repository factory into a [`ClientFactory`]; invoked once when the service starts.
pub type ClientFactoryProvider = Box<dyn FnOnce(Arc<dyn RepositoryFactory>) -> ClientFactory + Send>;

/// Input of a [`ClientWrapperFactory`].
#[derive(Clone)]
pub struct ClientWrapperFactoryOptions {
    /// Output of the previous stage of the chain.
    pub client: SavedObjectsClientRef,
    pub request: RequestContext,
    pub type_registry: Arc<SavedObjectTypeRegistry>,
}

/// Decorates (or passes through) the client produced by the previous stage.
pub type ClientWrapperFactory = Arc<
    dyn Fn(ClientWrapperFactoryOptions) -> Result<SavedObjectsClientRef, SavedObjectsError>
        + Send
        + Sync,
>;

/// Registration surface of the saved-objects service, available during setup only.
pub trait SavedObjectsServiceSetup: Send {
    /// Replace the default client factory.
    ///
    /// # Errors
    /// Returns [`SetupError::ClientFactoryProviderAlreadySet`] on a second call.
    fn set_client_factory_provider(
        &mut self,
        provider: ClientFactoryProvider,
    ) -> Result<(), SetupError>;

    /// Register a client wrapper.
    ///
    /// Wrappers with a higher priority end up further out in the chain.
    ///
    /// # Errors
    /// Returns [`SetupError::DuplicatePriority`] or [`SetupError::DuplicateWrapperId`] on a
    /// collision; the registry is left unchanged.
    fn add_client_wrapper(
        &mut self,
        priority: i64,
        id: &str,
        factory: ClientWrapperFactory,
    ) -> Result<(), SetupError>;

    /// # Errors
    /// Returns [`SetupError::TypeAlreadyRegistered`] for a duplicate type name.
    fn register_type(&mut self, object_type: SavedObjectsType) -> Result<(), SetupError>;

    fn type_registry(&self) -> &SavedObjectTypeRegistry;
}
