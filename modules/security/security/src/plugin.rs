//! Security plugin: builds the collaborators from [`SecurityConfig`] and installs the
//! saved-objects integration.

use std::sync::Arc;

use saved_objects_sdk::{SavedObjectsServiceSetup, SetupError};
use tracing::info;

use crate::audit::{
    AuditService, AuditServiceSetup, AuditSink, SecurityAuditLogger, TracingAuditSink,
    TracingSecurityAuditLogger,
};
use crate::authorization::{
    Actions, AuthorizationMode, CheckSavedObjectsPrivilegesWithRequest, ConfiguredMode,
    StaticPrivilegeChecker,
};
use crate::config::SecurityConfig;
use crate::saved_objects::{SetupSavedObjectsParams, setup_saved_objects};
use crate::spaces::{LateBoundSpacesService, SpacesService};

pub struct SecurityPlugin {
    config: SecurityConfig,
    audit_sink: Arc<dyn AuditSink>,
    legacy_audit_logger: Option<Arc<dyn SecurityAuditLogger>>,
    check_privileges: Option<Arc<dyn CheckSavedObjectsPrivilegesWithRequest>>,
}

impl SecurityPlugin {
    /// Plugin writing audit events through `tracing`.
    #[must_use]
    pub fn new(config: SecurityConfig) -> Self {
        Self {
            config,
            audit_sink: Arc::new(TracingAuditSink),
            legacy_audit_logger: None,
            check_privileges: None,
        }
    }

    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = sink;
        self
    }

    #[must_use]
    pub fn with_legacy_audit_logger(mut self, logger: Arc<dyn SecurityAuditLogger>) -> Self {
        self.legacy_audit_logger = Some(logger);
        self
    }

    /// Replace the checker built from `static_authz`.
    #[must_use]
    pub fn with_privilege_checker(
        mut self,
        checker: Arc<dyn CheckSavedObjectsPrivilegesWithRequest>,
    ) -> Self {
        self.check_privileges = Some(checker);
        self
    }

    /// Wire the security layer into the saved-objects service.
    ///
    /// # Errors
    /// Propagates the [`SetupError`] of [`setup_saved_objects`].
    #[tracing::instrument(skip_all)]
    pub fn setup(
        self,
        saved_objects: &mut dyn SavedObjectsServiceSetup,
    ) -> Result<SecuritySetup, SetupError> {
        let authorization = &self.config.authorization;
        let actions = Arc::new(Actions::new(&authorization.version));
        let authz_mode: Arc<dyn AuthorizationMode> =
            Arc::new(ConfiguredMode::new(authorization.rbac_enabled));
        let audit: Arc<dyn AuditServiceSetup> = Arc::new(AuditService::new(
            self.config.audit.clone(),
            Arc::clone(&self.audit_sink),
        ));
        let legacy_audit_logger = self.legacy_audit_logger.unwrap_or_else(|| {
            Arc::new(TracingSecurityAuditLogger::new(self.config.legacy_audit.enabled))
        });
        let check_privileges = self.check_privileges.unwrap_or_else(|| {
            Arc::new(StaticPrivilegeChecker::from_config(&self.config.static_authz))
        });
        let spaces = Arc::new(LateBoundSpacesService::new());

        let params = SetupSavedObjectsParams::builder()
            .legacy_audit_logger(legacy_audit_logger)
            .audit(Arc::clone(&audit))
            .authz_mode(Arc::clone(&authz_mode))
            .actions(Arc::clone(&actions))
            .check_saved_objects_privileges(check_privileges)
            .get_spaces_service(spaces.accessor())
            .build()?;
        setup_saved_objects(params, saved_objects)?;

        info!(
            rbac_enabled = authorization.rbac_enabled,
            audit_enabled = self.config.audit.enabled,
            legacy_audit_enabled = self.config.legacy_audit.enabled,
            "security plugin set up"
        );

        Ok(SecuritySetup {
            actions,
            authz_mode,
            audit,
            spaces,
        })
    }
}

/// Handle returned by [`SecurityPlugin::setup`].
#[derive(Clone)]
pub struct SecuritySetup {
    actions: Arc<Actions>,
    authz_mode: Arc<dyn AuthorizationMode>,
    audit: Arc<dyn AuditServiceSetup>,
    spaces: Arc<LateBoundSpacesService>,
}

impl SecuritySetup {
    #[must_use]
    pub fn actions(&self) -> &Arc<Actions> {
        &self.actions
    }

    #[must_use]
    pub fn authz_mode(&self) -> &Arc<dyn AuthorizationMode> {
        &self.authz_mode
    }

    #[must_use]
    pub fn audit(&self) -> &Arc<dyn AuditServiceSetup> {
        &self.audit
    }

    /// Attach the spaces subsystem; wrappers created afterwards start redacting namespaces.
    ///
    /// # Errors
    /// Returns [`SetupError::AlreadyAttached`] on a second call.
    pub fn register_spaces_service(&self, service: Arc<dyn SpacesService>) -> Result<(), SetupError> {
        self.spaces.attach(service)?;
        info!("spaces service attached");
        Ok(())
    }
}
