//! Lifecycle of the saved-objects service.
//!
//! [`SavedObjectsSetup`] collects registrations from other modules. [`SavedObjectsSetup::start`]
//! consumes it, so nothing can be registered once clients are being handed out.

use std::sync::Arc;

use saved_objects_sdk::{
    ClientFactoryProvider, ClientWrapperFactory, RepositoryFactory, RequestContext,
    SavedObjectTypeRegistry, SavedObjectsClientRef, SavedObjectsError, SavedObjectsServiceSetup,
    SavedObjectsType, SetupError,
};
use tracing::{debug, info};

use crate::client_provider::{
    ClientProviderOptions, SavedObjectsClientProvider, default_client_factory,
};
use crate::config::SavedObjectsConfig;
use crate::infra::memory::{DocumentStore, InMemoryRepositoryFactory};
use crate::priority::PriorityCollection;

/// Setup phase of the service.
pub struct SavedObjectsSetup {
    config: SavedObjectsConfig,
    client_factory_provider: Option<ClientFactoryProvider>,
    wrappers: PriorityCollection<ClientWrapperFactory>,
    type_registry: SavedObjectTypeRegistry,
}

impl SavedObjectsSetup {
    #[must_use]
    pub fn new(config: SavedObjectsConfig) -> Self {
        Self {
            config,
            client_factory_provider: None,
            wrappers: PriorityCollection::new(),
            type_registry: SavedObjectTypeRegistry::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SavedObjectsConfig {
        &self.config
    }

    /// Ids of the registered wrappers, outermost first.
    #[must_use]
    pub fn wrapper_ids(&self) -> Vec<String> {
        self.wrappers
            .to_prioritized()
            .iter()
            .map(|w| w.id.to_string())
            .collect()
    }

    /// Start over a fresh process-local document store.
    #[must_use]
    pub fn start(self) -> SavedObjectsStart {
        let store = Arc::new(DocumentStore::new());
        self.start_with(|type_registry, config| {
            Arc::new(InMemoryRepositoryFactory::new(store, type_registry, config.clone()))
                as Arc<dyn RepositoryFactory>
        })
    }

    /// Start with the repository factory returned by `build_repository_factory`.
    #[tracing::instrument(skip_all)]
    pub fn start_with<F>(self, build_repository_factory: F) -> SavedObjectsStart
    where
        F: FnOnce(Arc<SavedObjectTypeRegistry>, &SavedObjectsConfig) -> Arc<dyn RepositoryFactory>,
    {
        let type_registry = Arc::new(self.type_registry);
        let repository_factory = build_repository_factory(Arc::clone(&type_registry), &self.config);

        let custom_provider = self.client_factory_provider.is_some();
        let client_factory = match self.client_factory_provider {
            Some(provider) => provider(Arc::clone(&repository_factory)),
            None => default_client_factory(Arc::clone(&repository_factory)),
        };

        let wrappers = self.wrappers.into_frozen();
        info!(
            types = type_registry.get_all_types().count(),
            wrappers = wrappers.len(),
            custom_client_factory = custom_provider,
            "saved objects service started"
        );

        SavedObjectsStart {
            repository_factory,
            client_provider: SavedObjectsClientProvider::new(
                client_factory,
                wrappers,
                Arc::clone(&type_registry),
            ),
            type_registry,
        }
    }
}

impl Default for SavedObjectsSetup {
    fn default() -> Self {
        Self::new(SavedObjectsConfig::default())
    }
}

impl SavedObjectsServiceSetup for SavedObjectsSetup {
    fn set_client_factory_provider(
        &mut self,
        provider: ClientFactoryProvider,
    ) -> Result<(), SetupError> {
        if self.client_factory_provider.is_some() {
            return Err(SetupError::ClientFactoryProviderAlreadySet);
        }
        debug!("client factory provider registered");
        self.client_factory_provider = Some(provider);
        Ok(())
    }

    fn add_client_wrapper(
        &mut self,
        priority: i64,
        id: &str,
        factory: ClientWrapperFactory,
    ) -> Result<(), SetupError> {
        self.wrappers.add(priority, id, factory)?;
        debug!(wrapper = id, priority, "client wrapper registered");
        Ok(())
    }

    fn register_type(&mut self, object_type: SavedObjectsType) -> Result<(), SetupError> {
        self.type_registry.register_type(object_type)
    }

    fn type_registry(&self) -> &SavedObjectTypeRegistry {
        &self.type_registry
    }
}

/// Running service.
#[derive(Clone)]
pub struct SavedObjectsStart {
    repository_factory: Arc<dyn RepositoryFactory>,
    client_provider: SavedObjectsClientProvider,
    type_registry: Arc<SavedObjectTypeRegistry>,
}

impl SavedObjectsStart {
    /// Client for `request` with every non-excluded wrapper applied.
    ///
    /// # Errors
    /// Propagates the first failure of the client factory or of a wrapper factory.
    pub fn get_scoped_client(
        &self,
        request: &RequestContext,
        options: &ClientProviderOptions,
    ) -> Result<SavedObjectsClientRef, SavedObjectsError> {
        self.client_provider.get_client(request, options)
    }

    /// # Errors
    /// Fails if a name in `included_hidden_types` is not a registered type.
    pub fn create_internal_repository(
        &self,
        included_hidden_types: &[String],
    ) -> Result<SavedObjectsClientRef, SavedObjectsError> {
        self.repository_factory
            .create_internal_repository(included_hidden_types)
    }

    /// # Errors
    /// Fails if a name in `included_hidden_types` is not a registered type.
    pub fn create_scoped_repository(
        &self,
        request: &RequestContext,
        included_hidden_types: &[String],
    ) -> Result<SavedObjectsClientRef, SavedObjectsError> {
        self.repository_factory
            .create_scoped_repository(request, included_hidden_types)
    }

    #[must_use]
    pub fn client_provider(&self) -> &SavedObjectsClientProvider {
        &self.client_provider
    }

    #[must_use]
    pub fn type_registry(&self) -> &Arc<SavedObjectTypeRegistry> {
        &self.type_registry
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use saved_objects_sdk::{ClientWrapperFactoryOptions, NamespaceType};

    fn passthrough() -> ClientWrapperFactory {
        Arc::new(
            |options: ClientWrapperFactoryOptions| -> Result<SavedObjectsClientRef, SavedObjectsError> {
                Ok(options.client)
            },
        )
    }

    #[test]
    fn client_factory_provider_can_only_be_set_once() {
        let mut setup = SavedObjectsSetup::default();
        setup
            .set_client_factory_provider(Box::new(default_client_factory))
            .unwrap();

        let err = setup
            .set_client_factory_provider(Box::new(default_client_factory))
            .unwrap_err();
        assert_eq!(err, SetupError::ClientFactoryProviderAlreadySet);
    }

    #[test]
    fn duplicate_wrapper_priority_leaves_registry_unchanged() {
        let mut setup = SavedObjectsSetup::default();
        setup.add_client_wrapper(10, "spaces", passthrough()).unwrap();

        let err = setup
            .add_client_wrapper(10, "tagging", passthrough())
            .unwrap_err();

        assert!(matches!(err, SetupError::DuplicatePriority { priority: 10, .. }));
        assert_eq!(setup.wrapper_ids(), vec!["spaces".to_owned()]);
    }

    #[test]
    fn types_are_visible_through_the_setup_registry() {
        let mut setup = SavedObjectsSetup::default();
        setup
            .register_type(SavedObjectsType::new("dashboard", NamespaceType::Single))
            .unwrap();
        let err = setup
            .register_type(SavedObjectsType::new("dashboard", NamespaceType::Multiple))
            .unwrap_err();

        assert!(matches!(err, SetupError::TypeAlreadyRegistered { .. }));
        assert!(setup.type_registry().get_type("dashboard").is_some());
    }

    #[test]
    fn start_freezes_registrations() {
        let mut setup = SavedObjectsSetup::default();
        setup.add_client_wrapper(1, "low", passthrough()).unwrap();
        setup.add_client_wrapper(5, "high", passthrough()).unwrap();

        let start = setup.start();
        assert_eq!(start.client_provider().wrapper_ids(), vec!["high", "low"]);
    }
}
