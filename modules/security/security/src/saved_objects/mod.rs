//! Wiring of the security layer into the saved-objects service.
//!
//! [`setup_saved_objects`] installs a client factory provider and the `security` client
//! wrapper. Requests that fall under RBAC get an internal (unfiltered) repository wrapped by
//! [`SecureSavedObjectsClientWrapper`]; all other requests keep the identity-scoped
//! repository and are passed through untouched.

pub mod ensure_authorized;
pub mod secure_client_wrapper;


use std::sync::Arc;

use saved_objects::SavedObjectsClient;
use saved_objects_sdk::{
    ClientFactory, ClientFactoryParams, ClientFactoryProvider, ClientWrapperFactory,
    ClientWrapperFactoryOptions, RepositoryFactory, SavedObjectsClientRef, SavedObjectsError,
    SavedObjectsServiceSetup, SetupError,
};
use tracing::{debug, info};

pub use ensure_authorized::{
    AuthorizationStatus, EnsureAuthorizedActionResult, EnsureAuthorizedError,
    EnsureAuthorizedOptions, EnsureAuthorizedResult, TypeActionMap, check_authorization,
    ensure_authorized, get_ensure_authorized_action_result,
    is_authorized_for_object_in_all_spaces,
};
pub use secure_client_wrapper::{SecureClientWrapperOptions, SecureSavedObjectsClientWrapper};

use crate::audit::{AuditServiceSetup, SecurityAuditLogger};
use crate::authorization::{Actions, AuthorizationMode, CheckSavedObjectsPrivilegesWithRequest};
use crate::spaces::{GetSpacesService, SpacesService};

/// Id of the client wrapper registered by [`setup_saved_objects`].
pub const SECURITY_WRAPPER_ID: &str = "security";

/// Priority of the `security` wrapper: outside of every other wrapper but one slot.
pub const SECURITY_WRAPPER_PRIORITY: i64 = i64::MAX - 1;

/// Collaborators of [`setup_saved_objects`].
#[derive(Clone)]
pub struct SetupSavedObjectsParams {
    pub legacy_audit_logger: Arc<dyn SecurityAuditLogger>,
    pub audit: Arc<dyn AuditServiceSetup>,
    pub authz_mode: Arc<dyn AuthorizationMode>,
    pub actions: Arc<Actions>,
    pub check_saved_objects_privileges: Arc<dyn CheckSavedObjectsPrivilegesWithRequest>,
    /// Read on every operation; the spaces subsystem may attach after setup.
    pub get_spaces_service: GetSpacesService,
}

impl SetupSavedObjectsParams {
    #[must_use]
    pub fn builder() -> SetupSavedObjectsParamsBuilder {
        SetupSavedObjectsParamsBuilder::default()
    }
}

#[derive(Default)]
pub struct SetupSavedObjectsParamsBuilder {
    legacy_audit_logger: Option<Arc<dyn SecurityAuditLogger>>,
    audit: Option<Arc<dyn AuditServiceSetup>>,
    authz_mode: Option<Arc<dyn AuthorizationMode>>,
    actions: Option<Arc<Actions>>,
    check_saved_objects_privileges: Option<Arc<dyn CheckSavedObjectsPrivilegesWithRequest>>,
    get_spaces_service: Option<GetSpacesService>,
}

impl SetupSavedObjectsParamsBuilder {
    #[must_use]
    pub fn legacy_audit_logger(mut self, logger: Arc<dyn SecurityAuditLogger>) -> Self {
        self.legacy_audit_logger = Some(logger);
        self
    }

    #[must_use]
    pub fn audit(mut self, audit: Arc<dyn AuditServiceSetup>) -> Self {
        self.audit = Some(audit);
        self
    }

    #[must_use]
    pub fn authz_mode(mut self, mode: Arc<dyn AuthorizationMode>) -> Self {
        self.authz_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn actions(mut self, actions: Arc<Actions>) -> Self {
        self.actions = Some(actions);
        self
    }

    #[must_use]
    pub fn check_saved_objects_privileges(
        mut self,
        checker: Arc<dyn CheckSavedObjectsPrivilegesWithRequest>,
    ) -> Self {
        self.check_saved_objects_privileges = Some(checker);
        self
    }

    #[must_use]
    pub fn get_spaces_service(mut self, accessor: GetSpacesService) -> Self {
        self.get_spaces_service = Some(accessor);
        self
    }

    /// Without a spaces accessor, the spaces service is treated as never available.
    ///
    /// # Errors
    /// Returns [`SetupError::MissingCollaborator`] naming the first collaborator not set.
    pub fn build(self) -> Result<SetupSavedObjectsParams, SetupError> {
        Ok(SetupSavedObjectsParams {
            legacy_audit_logger: self
                .legacy_audit_logger
                .ok_or(SetupError::MissingCollaborator("legacy audit logger"))?,
            audit: self
                .audit
                .ok_or(SetupError::MissingCollaborator("audit service"))?,
            authz_mode: self
                .authz_mode
                .ok_or(SetupError::MissingCollaborator("authorization mode"))?,
            actions: self
                .actions
                .ok_or(SetupError::MissingCollaborator("actions"))?,
            check_saved_objects_privileges: self
                .check_saved_objects_privileges
                .ok_or(SetupError::MissingCollaborator("privilege checker"))?,
            get_spaces_service: self.get_spaces_service.unwrap_or_else(no_spaces_service),
        })
    }
}

fn no_spaces_service() -> GetSpacesService {
    Arc::new(|| -> Option<Arc<dyn SpacesService>> { None })
}

/// Install the security client factory provider and the `security` wrapper.
///
/// # Errors
/// Propagates the [`SetupError`] of the saved-objects service, e.g. when another module
/// already set a client factory provider or took the wrapper's priority.
#[tracing::instrument(skip_all)]
pub fn setup_saved_objects(
    params: SetupSavedObjectsParams,
    saved_objects: &mut dyn SavedObjectsServiceSetup,
) -> Result<(), SetupError> {
    saved_objects.set_client_factory_provider(client_factory_provider(Arc::clone(
        &params.authz_mode,
    )))?;
    saved_objects.add_client_wrapper(
        SECURITY_WRAPPER_PRIORITY,
        SECURITY_WRAPPER_ID,
        client_wrapper_factory(params),
    )?;
    info!(
        wrapper = SECURITY_WRAPPER_ID,
        priority = SECURITY_WRAPPER_PRIORITY,
        "saved objects security installed"
    );
    Ok(())
}

fn client_factory_provider(authz_mode: Arc<dyn AuthorizationMode>) -> ClientFactoryProvider {
    Box::new(
        move |repository_factory: Arc<dyn RepositoryFactory>| -> ClientFactory {
            Arc::new(
                move |params: ClientFactoryParams| -> Result<SavedObjectsClientRef, SavedObjectsError> {
                    let repository = if authz_mode.use_rbac_for_request(&params.request) {
                        debug!("rbac request, using the internal repository");
                        repository_factory
                            .create_internal_repository(&params.included_hidden_types)?
                    } else {
                        repository_factory.create_scoped_repository(
                            &params.request,
                            &params.included_hidden_types,
                        )?
                    };
                    Ok(Arc::new(SavedObjectsClient::new(repository)))
                },
            )
        },
    )
}

fn client_wrapper_factory(params: SetupSavedObjectsParams) -> ClientWrapperFactory {
    Arc::new(
        move |options: ClientWrapperFactoryOptions| -> Result<SavedObjectsClientRef, SavedObjectsError> {
            if !params.authz_mode.use_rbac_for_request(&options.request) {
                return Ok(options.client);
            }
            let errors = options.client.errors();
            let wrapper = SecureSavedObjectsClientWrapper::new(SecureClientWrapperOptions {
                actions: Arc::clone(&params.actions),
                legacy_audit_logger: Arc::clone(&params.legacy_audit_logger),
                audit_logger: params.audit.as_scoped(&options.request),
                base_client: options.client,
                check_privileges: params
                    .check_saved_objects_privileges
                    .check_saved_objects_privileges_with_request(&options.request),
                errors,
                get_spaces_service: Arc::clone(&params.get_spaces_service),
                type_registry: options.type_registry,
            });
            Ok(Arc::new(wrapper))
        },
    )
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::audit::{AuditService, MemoryAuditSink, MemorySecurityAuditLogger};
    use crate::authorization::StaticPrivilegeChecker;
    use crate::config::{AuditConfig, StaticAuthzConfig};
    use parking_lot::Mutex;
    use saved_objects::{
        DocumentStore, InMemoryRepositoryFactory, SavedObjectsConfig, SavedObjectsSetup,
    };
    use saved_objects_sdk::{
        NamespaceType, RequestContext, SavedObjectTypeRegistry, SavedObjectsType,
    };
    use uuid::Uuid;

    /// Records which kind of repository was requested, then delegates.
    struct RecordingFactory {
        inner: InMemoryRepositoryFactory,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingFactory {
        fn new() -> Self {
            let mut registry = SavedObjectTypeRegistry::new();
            registry
                .register_type(SavedObjectsType::new("dashboard", NamespaceType::Single))
                .unwrap();
            Self {
                inner: InMemoryRepositoryFactory::new(
                    Arc::new(DocumentStore::new()),
                    Arc::new(registry),
                    SavedObjectsConfig::default(),
                ),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl RepositoryFactory for RecordingFactory {
        fn create_internal_repository(
            &self,
            included_hidden_types: &[String],
        ) -> Result<SavedObjectsClientRef, SavedObjectsError> {
            self.calls.lock().push("internal".to_owned());
            self.inner.create_internal_repository(included_hidden_types)
        }

        fn create_scoped_repository(
            &self,
            request: &RequestContext,
            included_hidden_types: &[String],
        ) -> Result<SavedObjectsClientRef, SavedObjectsError> {
            self.calls
                .lock()
                .push(format!("scoped:{}", request.request_id()));
            self.inner
                .create_scoped_repository(request, included_hidden_types)
        }
    }

    fn rbac_for_authenticated() -> Arc<dyn AuthorizationMode> {
        Arc::new(|request: &RequestContext| request.is_authenticated())
    }

    fn params(request: RequestContext, hidden: &[&str]) -> ClientFactoryParams {
        ClientFactoryParams {
            request,
            included_hidden_types: hidden.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    fn builder() -> SetupSavedObjectsParamsBuilder {
        SetupSavedObjectsParams::builder()
            .legacy_audit_logger(Arc::new(MemorySecurityAuditLogger::new()))
            .audit(Arc::new(AuditService::new(
                AuditConfig::default(),
                Arc::new(MemoryAuditSink::new()),
            )))
            .authz_mode(Arc::new(|_: &saved_objects_sdk::RequestContext| true))
            .actions(Arc::new(Actions::new("1.0.0")))
            .check_saved_objects_privileges(Arc::new(StaticPrivilegeChecker::from_config(
                &StaticAuthzConfig::default(),
            )))
    }

    #[test]
    fn rbac_requests_get_the_internal_repository() {
        let factory = Arc::new(RecordingFactory::new());
        let client_factory = client_factory_provider(rbac_for_authenticated())(
            Arc::clone(&factory) as Arc<dyn RepositoryFactory>,
        );

        let request = RequestContext::builder().subject_id(Uuid::new_v4()).build();
        client_factory(params(request, &[])).unwrap();

        assert_eq!(*factory.calls.lock(), vec!["internal".to_owned()]);
    }

    #[test]
    fn other_requests_get_a_repository_scoped_to_that_request() {
        let factory = Arc::new(RecordingFactory::new());
        let client_factory = client_factory_provider(rbac_for_authenticated())(
            Arc::clone(&factory) as Arc<dyn RepositoryFactory>,
        );

        let request = RequestContext::anonymous();
        client_factory(params(request.clone(), &[])).unwrap();

        assert_eq!(
            *factory.calls.lock(),
            vec![format!("scoped:{}", request.request_id())]
        );
    }

    #[test]
    fn repository_errors_propagate_unchanged() {
        let factory = Arc::new(RecordingFactory::new());
        let client_factory = client_factory_provider(rbac_for_authenticated())(
            Arc::clone(&factory) as Arc<dyn RepositoryFactory>,
        );

        let request = RequestContext::builder().subject_id(Uuid::new_v4()).build();
        let err = client_factory(params(request, &["alert"])).err().unwrap();

        assert_eq!(
            err.to_string(),
            "Missing mappings for saved objects types: 'alert': Bad Request"
        );
    }

    #[test]
    fn builder_reports_missing_collaborators() {
        let err = SetupSavedObjectsParams::builder()
            .actions(Arc::new(Actions::new("1.0.0")))
            .build()
            .err()
            .unwrap();
        assert_eq!(err, SetupError::MissingCollaborator("legacy audit logger"));
    }

    #[test]
    fn spaces_accessor_defaults_to_unavailable() {
        let params = builder().build().unwrap();
        assert!((params.get_spaces_service)().is_none());
    }

    #[test]
    fn setup_registers_provider_and_wrapper() {
        let mut setup = SavedObjectsSetup::default();
        setup_saved_objects(builder().build().unwrap(), &mut setup).unwrap();

        assert_eq!(setup.wrapper_ids(), vec![SECURITY_WRAPPER_ID.to_owned()]);
    }

    #[test]
    fn second_setup_fails_on_the_provider() {
        let mut setup = SavedObjectsSetup::default();
        setup_saved_objects(builder().build().unwrap(), &mut setup).unwrap();

        let err = setup_saved_objects(builder().build().unwrap(), &mut setup).unwrap_err();
        assert_eq!(err, SetupError::ClientFactoryProviderAlreadySet);
    }
}
