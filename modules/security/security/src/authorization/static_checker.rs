//! Privilege checker backed by per-user grants from configuration.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use saved_objects_sdk::RequestContext;
use saved_objects_sdk::utils::ALL_NAMESPACES_STRING;
use tracing::debug;

use super::check_privileges::{
    CheckPrivilegesError, CheckPrivilegesResponse, CheckSavedObjectsPrivileges,
    CheckSavedObjectsPrivilegesWithRequest, PrivilegeCheckResult,
};
use crate::config::{PrivilegeGrant, StaticAuthzConfig};

/// Grants keyed by username.
#[derive(Debug, Clone, Default)]
pub struct StaticPrivilegeChecker {
    users: HashMap<String, Arc<[PrivilegeGrant]>>,
}

impl StaticPrivilegeChecker {
    #[must_use]
    pub fn from_config(cfg: &StaticAuthzConfig) -> Self {
        let users = cfg
            .users
            .iter()
            .map(|u| (u.username.clone(), Arc::from(u.grants.clone())))
            .collect();
        Self { users }
    }
}

impl CheckSavedObjectsPrivilegesWithRequest for StaticPrivilegeChecker {
    fn check_saved_objects_privileges_with_request(
        &self,
        request: &RequestContext,
    ) -> Arc<dyn CheckSavedObjectsPrivileges> {
        let username = request.username().unwrap_or_default().to_owned();
        let grants = self
            .users
            .get(&username)
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new()));
        Arc::new(BoundStaticChecker { username, grants })
    }
}

struct BoundStaticChecker {
    username: String,
    grants: Arc<[PrivilegeGrant]>,
}

fn privilege_matches(granted: &str, requested: &str) -> bool {
    match granted.strip_suffix('*') {
        Some(prefix) => requested.starts_with(prefix),
        None => granted == requested,
    }
}

impl BoundStaticChecker {
    /// Granted in `space`, or globally when `space` is `None`.
    fn is_granted(&self, privilege: &str, space: Option<&str>) -> bool {
        self.grants.iter().any(|grant| {
            let in_scope = match (&grant.space, space) {
                (None, _) => true,
                (Some(granted), Some(requested)) => granted == requested,
                (Some(_), None) => false,
            };
            in_scope && grant.privileges.iter().any(|p| privilege_matches(p, privilege))
        })
    }
}

#[async_trait]
impl CheckSavedObjectsPrivileges for BoundStaticChecker {
    async fn check(
        &self,
        privileges: &[String],
        space_ids: &[String],
    ) -> Result<CheckPrivilegesResponse, CheckPrivilegesError> {
        if space_ids.iter().any(String::is_empty) {
            return Err(CheckPrivilegesError::InvalidRequest(
                "space id cannot be empty".to_owned(),
            ));
        }

        let global = space_ids.is_empty() || space_ids.iter().any(|s| s == ALL_NAMESPACES_STRING);
        let resources: Vec<Option<&str>> = if global {
            vec![None]
        } else {
            space_ids.iter().map(|s| Some(s.as_str())).collect()
        };

        let results: Vec<PrivilegeCheckResult> = resources
            .iter()
            .flat_map(|resource| {
                privileges.iter().map(move |privilege| PrivilegeCheckResult {
                    resource: resource.map(str::to_owned),
                    privilege: privilege.clone(),
                    authorized: self.is_granted(privilege, *resource),
                })
            })
            .collect();

        let has_all_requested = results.iter().all(|r| r.authorized);
        debug!(
            username = %self.username,
            privileges = privileges.len(),
            has_all_requested,
            "static privilege check"
        );

        Ok(CheckPrivilegesResponse {
            has_all_requested,
            username: self.username.clone(),
            privileges: results,
        })
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::UserGrants;

    fn checker() -> StaticPrivilegeChecker {
        StaticPrivilegeChecker::from_config(&StaticAuthzConfig {
            users: vec![UserGrants {
                username: "analyst".to_owned(),
                grants: vec![
                    PrivilegeGrant {
                        space: None,
                        privileges: vec!["saved_object:dashboard/get".to_owned()],
                    },
                    PrivilegeGrant {
                        space: Some("sales".to_owned()),
                        privileges: vec!["saved_object:*".to_owned(), "login:".to_owned()],
                    },
                ],
            }],
        })
    }

    fn bound(username: &str) -> Arc<dyn CheckSavedObjectsPrivileges> {
        let request = RequestContext::builder().username(username).build();
        checker().check_saved_objects_privileges_with_request(&request)
    }

    #[tokio::test]
    async fn space_grants_apply_only_in_their_space() {
        let privileges = vec!["saved_object:dashboard/create".to_owned()];
        let response = bound("analyst")
            .check(&privileges, &["sales".to_owned(), "ops".to_owned()])
            .await
            .unwrap();

        assert!(!response.has_all_requested);
        assert_eq!(response.username, "analyst");
        assert_eq!(
            response.privileges,
            vec![
                PrivilegeCheckResult {
                    resource: Some("sales".to_owned()),
                    privilege: "saved_object:dashboard/create".to_owned(),
                    authorized: true,
                },
                PrivilegeCheckResult {
                    resource: Some("ops".to_owned()),
                    privilege: "saved_object:dashboard/create".to_owned(),
                    authorized: false,
                },
            ]
        );
    }

    #[tokio::test]
    async fn wildcard_space_requires_a_global_grant() {
        let checker = bound("analyst");
        let get = vec!["saved_object:dashboard/get".to_owned()];
        let create = vec!["saved_object:dashboard/create".to_owned()];

        let response = checker.check(&get, &["*".to_owned()]).await.unwrap();
        assert!(response.has_all_requested);
        assert_eq!(response.privileges[0].resource, None);

        let response = checker.check(&create, &["*".to_owned()]).await.unwrap();
        assert!(!response.has_all_requested);
    }

    #[tokio::test]
    async fn unknown_users_have_no_privileges() {
        let response = bound("intruder")
            .check(&["login:".to_owned()], &["sales".to_owned()])
            .await
            .unwrap();
        assert!(!response.has_all_requested);
    }

    #[tokio::test]
    async fn empty_space_id_is_rejected() {
        let result = bound("analyst")
            .check(&["login:".to_owned()], &[String::new()])
            .await;
        assert!(matches!(result, Err(CheckPrivilegesError::InvalidRequest(_))));
    }
}
