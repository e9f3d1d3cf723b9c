//! Builds per-request clients: the base client from the client factory, then every
//! registered wrapper from the lowest priority (innermost) to the highest (outermost).

use std::sync::Arc;

use saved_objects_sdk::{
    ClientFactory, ClientFactoryParams, ClientWrapperFactory, ClientWrapperFactoryOptions,
    RepositoryFactory, RequestContext, SavedObjectTypeRegistry, SavedObjectsClientRef,
    SavedObjectsError,
};
use tracing::debug;

use crate::client::SavedObjectsClient;
use crate::priority::PriorityEntry;

/// Per-call options of [`SavedObjectsClientProvider::get_client`].
#[derive(Debug, Clone, Default)]
pub struct ClientProviderOptions {
    /// Hidden types the returned client may access.
    pub included_hidden_types: Vec<String>,
    /// Ids of wrappers to leave out of the chain.
    pub excluded_wrappers: Vec<String>,
}

/// Client factory used when no provider was registered: a plain client over a scoped
/// repository.
#[must_use]
pub fn default_client_factory(repository_factory: Arc<dyn RepositoryFactory>) -> ClientFactory {
    Arc::new(move |params: ClientFactoryParams| -> Result<SavedObjectsClientRef, SavedObjectsError> {
        let repository = repository_factory
            .create_scoped_repository(&params.request, &params.included_hidden_types)?;
        Ok(Arc::new(SavedObjectsClient::new(repository)))
    })
}

/// Immutable after start; cheap to clone and share.
#[derive(Clone)]
pub struct SavedObjectsClientProvider {
    client_factory: ClientFactory,
    wrappers: Arc<[PriorityEntry<ClientWrapperFactory>]>,
    type_registry: Arc<SavedObjectTypeRegistry>,
}

impl SavedObjectsClientProvider {
    #[must_use]
    pub fn new(
        client_factory: ClientFactory,
        wrappers: Arc<[PriorityEntry<ClientWrapperFactory>]>,
        type_registry: Arc<SavedObjectTypeRegistry>,
    ) -> Self {
        Self {
            client_factory,
            wrappers,
            type_registry,
        }
    }

    /// Wrapper ids from the outermost to the innermost.
    #[must_use]
    pub fn wrapper_ids(&self) -> Vec<&str> {
        self.wrappers.iter().map(|w| &*w.id).collect()
    }

    /// Build the client for `request`.
    ///
    /// # Errors
    /// Returns the first error raised by the client factory or a wrapper factory; no
    /// partially wrapped client is returned.
    pub fn get_client(
        &self,
        request: &RequestContext,
        options: &ClientProviderOptions,
    ) -> Result<SavedObjectsClientRef, SavedObjectsError> {
        let mut client = (self.client_factory)(ClientFactoryParams {
            request: request.clone(),
            included_hidden_types: options.included_hidden_types.clone(),
        })?;

        for wrapper in self.wrappers.iter().rev() {
            if options.excluded_wrappers.iter().any(|id| *id == *wrapper.id) {
                debug!(wrapper = %wrapper.id, "skipping excluded client wrapper");
                continue;
            }
            debug!(wrapper = %wrapper.id, priority = wrapper.priority, "applying client wrapper");
            client = (wrapper.value)(ClientWrapperFactoryOptions {
                client,
                request: request.clone(),
                type_registry: Arc::clone(&self.type_registry),
            })?;
        }

        Ok(client)
    }
}
