//! Contract of the privilege checker bound to a request.

use std::sync::Arc;

use async_trait::async_trait;
use saved_objects_sdk::RequestContext;
use serde::{Deserialize, Serialize};

/// Outcome of one privilege in one space (`resource`), or globally when `resource` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeCheckResult {
    pub resource: Option<String>,
    pub privilege: String,
    pub authorized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckPrivilegesResponse {
    pub has_all_requested: bool,
    pub username: String,
    pub privileges: Vec<PrivilegeCheckResult>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CheckPrivilegesError {
    #[error("privilege check unavailable: {0}")]
    Unavailable(String),

    #[error("invalid privilege check: {0}")]
    InvalidRequest(String),
}

/// Checks saved-object privileges of one identity.
#[async_trait]
pub trait CheckSavedObjectsPrivileges: Send + Sync {
    /// Check `privileges` in each of `space_ids`.
    ///
    /// An empty list, or one containing `*`, checks the privileges globally.
    ///
    /// # Errors
    /// Returns [`CheckPrivilegesError`] when the check could not be performed.
    async fn check(
        &self,
        privileges: &[String],
        space_ids: &[String],
    ) -> Result<CheckPrivilegesResponse, CheckPrivilegesError>;
}

/// Binds a [`CheckSavedObjectsPrivileges`] to the identity of a request.
pub trait CheckSavedObjectsPrivilegesWithRequest: Send + Sync {
    fn check_saved_objects_privileges_with_request(
        &self,
        request: &RequestContext,
    ) -> Arc<dyn CheckSavedObjectsPrivileges>;
}
