//! Saved-objects client that enforces privileges and records audit events.
//!
//! Each operation is authorized for the requested types and spaces before the base client
//! is called. A denial never reaches the base client. Audit records are written once the
//! outcome is known: a dropped (cancelled or timed-out) operation records nothing after its
//! authorization succeeded. Scoped events follow what the caller receives, so namespace
//! redaction runs before a success is recorded. Audit sink failures are logged and otherwise
//! ignored.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use saved_objects_sdk::utils::{ALL_NAMESPACES_STRING, UNKNOWN_SPACE, namespace_id_to_string};
use saved_objects_sdk::{
    BaseOptions, BulkCreateObject, BulkCreateOptions, BulkGetObject, BulkItem, BulkResponse,
    CreateOptions, DeleteOptions, FindOptions, FindResponse, SavedObject,
    SavedObjectTypeRegistry, SavedObjectsClientContract, SavedObjectsClientRef,
    SavedObjectsError, SavedObjectsErrorHelpers, UpdateOptions,
};
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use super::ensure_authorized::{
    AuthorizationStatus, EnsureAuthorizedError, EnsureAuthorizedOptions, EnsureAuthorizedResult,
    ensure_authorized, get_ensure_authorized_action_result,
};
use crate::audit::{
    AuditLogger, ErrorDetails, MissingPrivilege, SavedObjectAction, SavedObjectDescriptor,
    SavedObjectEventParams, SecurityAuditLogger, saved_object_event,
};
use crate::authorization::{Actions, CheckSavedObjectsPrivileges};
use crate::spaces::GetSpacesService;

/// Collaborators of [`SecureSavedObjectsClientWrapper`].
pub struct SecureClientWrapperOptions {
    pub actions: Arc<Actions>,
    pub legacy_audit_logger: Arc<dyn SecurityAuditLogger>,
    pub audit_logger: Arc<dyn AuditLogger>,
    pub base_client: SavedObjectsClientRef,
    /// Privilege checker bound to the identity of the current request.
    pub check_privileges: Arc<dyn CheckSavedObjectsPrivileges>,
    /// Error helpers of the base client; every error this wrapper raises is built with them.
    pub errors: Arc<dyn SavedObjectsErrorHelpers>,
    pub get_spaces_service: GetSpacesService,
    pub type_registry: Arc<SavedObjectTypeRegistry>,
}

pub struct SecureSavedObjectsClientWrapper {
    actions: Arc<Actions>,
    legacy_audit_logger: Arc<dyn SecurityAuditLogger>,
    audit_logger: Arc<dyn AuditLogger>,
    base_client: SavedObjectsClientRef,
    check_privileges: Arc<dyn CheckSavedObjectsPrivileges>,
    errors: Arc<dyn SavedObjectsErrorHelpers>,
    get_spaces_service: GetSpacesService,
    type_registry: Arc<SavedObjectTypeRegistry>,
}

/// What one operation has to be authorized for.
struct Authorization {
    operation: &'static str,
    action: SavedObjectAction,
    types: Vec<String>,
    spaces: Vec<String>,
    args: serde_json::Value,
}

fn unique<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values
        .into_iter()
        .map(Into::into)
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

fn descriptor(obj: &SavedObject) -> SavedObjectDescriptor {
    SavedObjectDescriptor::new(&obj.object_type, &obj.id)
}

impl SecureSavedObjectsClientWrapper {
    #[must_use]
    pub fn new(options: SecureClientWrapperOptions) -> Self {
        Self {
            actions: options.actions,
            legacy_audit_logger: options.legacy_audit_logger,
            audit_logger: options.audit_logger,
            base_client: options.base_client,
            check_privileges: options.check_privileges,
            errors: options.errors,
            get_spaces_service: options.get_spaces_service,
            type_registry: options.type_registry,
        }
    }

    fn space_id(&self, namespace: Option<&str>) -> String {
        match (self.get_spaces_service)() {
            Some(spaces) => spaces.namespace_to_space_id(namespace),
            None => namespace_id_to_string(namespace),
        }
    }

    fn audit(
        &self,
        action: SavedObjectAction,
        saved_object: Option<SavedObjectDescriptor>,
        error: Option<ErrorDetails>,
    ) {
        let event = saved_object_event(SavedObjectEventParams {
            action,
            outcome: None,
            saved_object,
            error,
        });
        if let Err(err) = self.audit_logger.log(event) {
            warn!(error = %err, action = action.as_str(), "failed to write audit event");
        }
    }

    /// One event per target, or a single event without target.
    fn audit_each(
        &self,
        action: SavedObjectAction,
        targets: &[SavedObjectDescriptor],
        error: Option<&SavedObjectsError>,
    ) {
        let details = error.map(ErrorDetails::from);
        if targets.is_empty() {
            self.audit(action, None, details);
            return;
        }
        for target in targets {
            self.audit(action, Some(target.clone()), details.clone());
        }
    }

    fn audit_success<I>(&self, action: SavedObjectAction, objects: I)
    where
        I: IntoIterator<Item = SavedObjectDescriptor>,
    {
        for object in objects {
            self.audit(action, Some(object), None);
        }
    }

    /// One event per item, in response order; error items are recorded as failures.
    fn audit_bulk(&self, action: SavedObjectAction, response: &BulkResponse) {
        for item in &response.saved_objects {
            match item {
                BulkItem::Found(obj) => self.audit(action, Some(descriptor(obj)), None),
                BulkItem::Error {
                    id,
                    object_type,
                    error,
                } => self.audit(
                    action,
                    Some(SavedObjectDescriptor::new(object_type, id)),
                    Some(ErrorDetails::from(error)),
                ),
            }
        }
    }

    fn legacy_failure(&self, username: &str, auth: &Authorization, missing: &[MissingPrivilege]) {
        if let Err(err) = self.legacy_audit_logger.saved_objects_authorization_failure(
            username,
            auth.operation,
            &auth.types,
            &auth.spaces,
            missing,
            &auth.args,
        ) {
            warn!(error = %err, operation = auth.operation, "failed to write legacy audit record");
        }
    }

    fn legacy_success(&self, username: &str, auth: &Authorization) {
        if let Err(err) = self.legacy_audit_logger.saved_objects_authorization_success(
            username,
            auth.operation,
            &auth.types,
            &auth.spaces,
            &auth.args,
        ) {
            warn!(error = %err, operation = auth.operation, "failed to write legacy audit record");
        }
    }

    /// Deny: audit, then return a forbidden error built with the base client's helpers.
    fn deny(
        &self,
        auth: &Authorization,
        targets: &[SavedObjectDescriptor],
        message: &str,
        result: &EnsureAuthorizedResult,
    ) -> SavedObjectsError {
        warn!(
            username = %result.username,
            operation = auth.operation,
            types = %auth.types.join(","),
            "{message}"
        );
        let error = self.errors.decorate_forbidden_error(message);
        self.legacy_failure(&result.username, auth, &result.missing_privileges);
        self.audit_each(auth.action, targets, Some(&error));
        error
    }

    async fn ensure_authorized(
        &self,
        auth: &Authorization,
        targets: &[SavedObjectDescriptor],
        require_full_authorization: bool,
    ) -> Result<EnsureAuthorizedResult, SavedObjectsError> {
        let types: Vec<&str> = auth.types.iter().map(String::as_str).collect();
        match ensure_authorized(
            self.check_privileges.as_ref(),
            &self.actions,
            &types,
            &[auth.operation],
            &auth.spaces,
            EnsureAuthorizedOptions {
                require_full_authorization,
            },
        )
        .await
        {
            Ok(result) => {
                debug!(
                    username = %result.username,
                    operation = auth.operation,
                    status = ?result.status,
                    "saved objects operation authorized"
                );
                Ok(result)
            }
            Err(EnsureAuthorizedError::Check(err)) => {
                Err(self.errors.decorate_general_error(&err, None))
            }
            Err(EnsureAuthorizedError::Unauthorized { message, result }) => {
                Err(self.deny(auth, targets, &message, &result))
            }
        }
    }

    /// Base call failed: audit and hand the error back unchanged.
    fn failed(
        &self,
        auth: &Authorization,
        targets: &[SavedObjectDescriptor],
        error: SavedObjectsError,
    ) -> SavedObjectsError {
        self.audit_each(auth.action, targets, Some(&error));
        error
    }

    fn is_multi_namespace(&self, object_type: &str) -> bool {
        self.type_registry.is_multi_namespace(object_type)
    }

    /// Spaces of multi-namespace objects whose visibility has to be checked.
    fn spaces_to_redact<'a, I>(&self, objects: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a SavedObject>,
    {
        unique(
            objects
                .into_iter()
                .filter(|o| self.is_multi_namespace(&o.object_type))
                .flat_map(|o| o.namespaces.iter())
                .filter(|ns| ns.as_str() != ALL_NAMESPACES_STRING)
                .cloned(),
        )
    }

    /// Spaces among `spaces` the identity may enter, or `None` when nothing is redacted.
    ///
    /// Redaction needs the spaces service; without it namespaces are returned as stored.
    async fn enterable_spaces(
        &self,
        spaces: &[String],
    ) -> Result<Option<BTreeSet<String>>, SavedObjectsError> {
        if spaces.is_empty() || (self.get_spaces_service)().is_none() {
            return Ok(None);
        }
        let response = self
            .check_privileges
            .check(std::slice::from_ref(&self.actions.login), spaces)
            .await
            .map_err(|err| self.errors.decorate_general_error(&err, None))?;
        Ok(Some(
            response
                .privileges
                .into_iter()
                .filter(|p| p.authorized)
                .filter_map(|p| p.resource)
                .collect(),
        ))
    }

    /// Replace the spaces the identity cannot enter with `?`, listed last.
    fn redact_object(&self, obj: &mut SavedObject, enterable: &BTreeSet<String>) {
        if !self.is_multi_namespace(&obj.object_type) {
            return;
        }
        for ns in &mut obj.namespaces {
            if ns.as_str() != ALL_NAMESPACES_STRING && !enterable.contains(ns.as_str()) {
                *ns = UNKNOWN_SPACE.to_owned();
            }
        }
        obj.namespaces.sort_by_key(|ns| (ns == UNKNOWN_SPACE, ns.clone()));
    }

    async fn redact_one(&self, mut obj: SavedObject) -> Result<SavedObject, SavedObjectsError> {
        let spaces = self.spaces_to_redact(std::iter::once(&obj));
        if let Some(enterable) = self.enterable_spaces(&spaces).await? {
            self.redact_object(&mut obj, &enterable);
        }
        Ok(obj)
    }

    async fn redact_many(
        &self,
        mut objects: Vec<SavedObject>,
    ) -> Result<Vec<SavedObject>, SavedObjectsError> {
        let spaces = self.spaces_to_redact(&objects);
        if let Some(enterable) = self.enterable_spaces(&spaces).await? {
            for obj in &mut objects {
                self.redact_object(obj, &enterable);
            }
        }
        Ok(objects)
    }

    /// Redacts the found items; error items keep their position.
    async fn redact_bulk(
        &self,
        mut response: BulkResponse,
    ) -> Result<BulkResponse, SavedObjectsError> {
        let spaces =
            self.spaces_to_redact(response.saved_objects.iter().filter_map(BulkItem::saved_object));
        if let Some(enterable) = self.enterable_spaces(&spaces).await? {
            for item in &mut response.saved_objects {
                if let BulkItem::Found(obj) = item {
                    self.redact_object(obj, &enterable);
                }
            }
        }
        Ok(response)
    }

    /// Redact a single returned object, then record the outcome the caller sees.
    async fn complete_one(
        &self,
        auth: &Authorization,
        username: &str,
        obj: SavedObject,
    ) -> Result<SavedObject, SavedObjectsError> {
        self.legacy_success(username, auth);
        let targets = [descriptor(&obj)];
        match self.redact_one(obj).await {
            Ok(obj) => {
                self.audit_success(auth.action, targets);
                Ok(obj)
            }
            Err(err) => Err(self.failed(auth, &targets, err)),
        }
    }

    /// `type_to_namespaces` for a partially authorized find; types without any authorized
    /// space are left out.
    fn authorized_find_namespaces(
        auth: &Authorization,
        result: &EnsureAuthorizedResult,
    ) -> BTreeMap<String, Vec<String>> {
        let wildcard = auth.spaces.iter().any(|s| s == ALL_NAMESPACES_STRING);
        auth.types
            .iter()
            .filter_map(|object_type| {
                let entry = get_ensure_authorized_action_result(
                    object_type,
                    auth.operation,
                    &result.type_map,
                );
                let spaces: Vec<String> = if entry.is_globally_authorized {
                    auth.spaces.clone()
                } else if wildcard {
                    entry.authorized_spaces
                } else {
                    auth.spaces
                        .iter()
                        .filter(|s| entry.authorized_spaces.contains(s))
                        .cloned()
                        .collect()
                };
                (!spaces.is_empty()).then(|| (object_type.clone(), spaces))
            })
            .collect()
    }
}

#[async_trait]
impl SavedObjectsClientContract for SecureSavedObjectsClientWrapper {
    async fn create(
        &self,
        object_type: &str,
        attributes: serde_json::Value,
        mut options: CreateOptions,
    ) -> Result<SavedObject, SavedObjectsError> {
        let id = options
            .id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        let mut spaces = vec![self.space_id(options.namespace.as_deref())];
        spaces.extend(options.initial_namespaces.iter().cloned());
        let auth = Authorization {
            operation: "create",
            action: SavedObjectAction::Create,
            types: vec![object_type.to_owned()],
            spaces: unique(spaces),
            args: json!({ "type": object_type, "attributes": &attributes, "options": &options }),
        };
        let targets = [SavedObjectDescriptor::new(object_type, &id)];

        let authorized = self.ensure_authorized(&auth, &targets, true).await?;
        match self.base_client.create(object_type, attributes, options).await {
            Ok(obj) => self.complete_one(&auth, &authorized.username, obj).await,
            Err(err) => Err(self.failed(&auth, &targets, err)),
        }
    }

    async fn bulk_create(
        &self,
        mut objects: Vec<BulkCreateObject>,
        options: BulkCreateOptions,
    ) -> Result<BulkResponse, SavedObjectsError> {
        for obj in &mut objects {
            obj.id.get_or_insert_with(|| Uuid::new_v4().to_string());
        }
        let mut spaces = vec![self.space_id(options.namespace.as_deref())];
        spaces.extend(
            objects
                .iter()
                .flat_map(|o| o.initial_namespaces.iter().cloned()),
        );
        let auth = Authorization {
            operation: "bulk_create",
            action: SavedObjectAction::Create,
            types: unique(objects.iter().map(|o| o.object_type.as_str())),
            spaces: unique(spaces),
            args: json!({ "objects": &objects, "options": &options }),
        };
        let targets: Vec<SavedObjectDescriptor> = objects
            .iter()
            .map(|o| {
                SavedObjectDescriptor::new(&o.object_type, o.id.as_deref().unwrap_or_default())
            })
            .collect();

        let authorized = self.ensure_authorized(&auth, &targets, true).await?;
        match self.base_client.bulk_create(objects, options).await {
            Ok(response) => {
                self.legacy_success(&authorized.username, &auth);
                self.audit_bulk(auth.action, &response);
                Ok(response)
            }
            Err(err) => Err(self.failed(&auth, &targets, err)),
        }
    }

    async fn get(
        &self,
        object_type: &str,
        id: &str,
        options: BaseOptions,
    ) -> Result<SavedObject, SavedObjectsError> {
        let auth = Authorization {
            operation: "get",
            action: SavedObjectAction::Get,
            types: vec![object_type.to_owned()],
            spaces: vec![self.space_id(options.namespace.as_deref())],
            args: json!({ "type": object_type, "id": id, "options": &options }),
        };
        let targets = [SavedObjectDescriptor::new(object_type, id)];

        let authorized = self.ensure_authorized(&auth, &targets, true).await?;
        match self.base_client.get(object_type, id, options).await {
            Ok(obj) => self.complete_one(&auth, &authorized.username, obj).await,
            Err(err) => Err(self.failed(&auth, &targets, err)),
        }
    }

    async fn bulk_get(
        &self,
        objects: Vec<BulkGetObject>,
        options: BaseOptions,
    ) -> Result<BulkResponse, SavedObjectsError> {
        if objects.is_empty() {
            return self.base_client.bulk_get(objects, options).await;
        }

        let auth = Authorization {
            operation: "bulk_get",
            action: SavedObjectAction::Get,
            types: unique(objects.iter().map(|o| o.object_type.as_str())),
            spaces: vec![self.space_id(options.namespace.as_deref())],
            args: json!({ "objects": &objects, "options": &options }),
        };
        let targets: Vec<SavedObjectDescriptor> = objects
            .iter()
            .map(|o| SavedObjectDescriptor::new(&o.object_type, &o.id))
            .collect();

        let authorized = self.ensure_authorized(&auth, &targets, true).await?;
        match self.base_client.bulk_get(objects, options).await {
            Ok(response) => {
                self.legacy_success(&authorized.username, &auth);
                match self.redact_bulk(response).await {
                    Ok(response) => {
                        self.audit_bulk(auth.action, &response);
                        Ok(response)
                    }
                    Err(err) => Err(self.failed(&auth, &targets, err)),
                }
            }
            Err(err) => Err(self.failed(&auth, &targets, err)),
        }
    }

    async fn find(&self, mut options: FindOptions) -> Result<FindResponse, SavedObjectsError> {
        let spaces = match &options.namespaces {
            Some(namespaces) if !namespaces.is_empty() => unique(namespaces.iter().cloned()),
            _ => vec![self.space_id(options.namespace.as_deref())],
        };
        let auth = Authorization {
            operation: "find",
            action: SavedObjectAction::Find,
            types: unique(options.types.iter().cloned()),
            spaces,
            args: json!({ "options": &options }),
        };

        let authorized = self.ensure_authorized(&auth, &[], false).await?;
        if authorized.status == AuthorizationStatus::PartiallyAuthorized {
            let type_to_namespaces = Self::authorized_find_namespaces(&auth, &authorized);
            if type_to_namespaces.is_empty() {
                let message = format!("Unable to find {}", auth.types.join(","));
                return Err(self.deny(&auth, &[], &message, &authorized));
            }
            debug!(
                types = type_to_namespaces.len(),
                "find restricted to authorized types and spaces"
            );
            options.types = type_to_namespaces.keys().cloned().collect();
            options.type_to_namespaces = Some(type_to_namespaces);
        }

        match self.base_client.find(options).await {
            Ok(response) => {
                self.legacy_success(&authorized.username, &auth);
                let FindResponse {
                    saved_objects,
                    total,
                    page,
                    per_page,
                } = response;
                let saved_objects = match self.redact_many(saved_objects).await {
                    Ok(saved_objects) => saved_objects,
                    Err(err) => return Err(self.failed(&auth, &[], err)),
                };
                self.audit_success(auth.action, saved_objects.iter().map(descriptor));
                Ok(FindResponse {
                    saved_objects,
                    total,
                    page,
                    per_page,
                })
            }
            Err(err) => Err(self.failed(&auth, &[], err)),
        }
    }

    async fn update(
        &self,
        object_type: &str,
        id: &str,
        attributes: serde_json::Value,
        options: UpdateOptions,
    ) -> Result<SavedObject, SavedObjectsError> {
        let auth = Authorization {
            operation: "update",
            action: SavedObjectAction::Update,
            types: vec![object_type.to_owned()],
            spaces: vec![self.space_id(options.namespace.as_deref())],
            args: json!({
                "type": object_type,
                "id": id,
                "attributes": &attributes,
                "options": &options,
            }),
        };
        let targets = [SavedObjectDescriptor::new(object_type, id)];

        let authorized = self.ensure_authorized(&auth, &targets, true).await?;
        match self
            .base_client
            .update(object_type, id, attributes, options)
            .await
        {
            Ok(obj) => self.complete_one(&auth, &authorized.username, obj).await,
            Err(err) => Err(self.failed(&auth, &targets, err)),
        }
    }

    async fn delete(
        &self,
        object_type: &str,
        id: &str,
        options: DeleteOptions,
    ) -> Result<(), SavedObjectsError> {
        let auth = Authorization {
            operation: "delete",
            action: SavedObjectAction::Delete,
            types: vec![object_type.to_owned()],
            spaces: vec![self.space_id(options.namespace.as_deref())],
            args: json!({ "type": object_type, "id": id, "options": &options }),
        };
        let targets = [SavedObjectDescriptor::new(object_type, id)];

        let authorized = self.ensure_authorized(&auth, &targets, true).await?;
        match self.base_client.delete(object_type, id, options).await {
            Ok(()) => {
                self.legacy_success(&authorized.username, &auth);
                self.audit_success(auth.action, targets);
                Ok(())
            }
            Err(err) => Err(self.failed(&auth, &targets, err)),
        }
    }

    fn errors(&self) -> Arc<dyn SavedObjectsErrorHelpers> {
        Arc::clone(&self.errors)
    }
}
