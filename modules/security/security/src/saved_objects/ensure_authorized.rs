//! Authorization of saved-object operations across types and spaces.
//!
//! [`check_authorization`] asks the privilege checker about every `(type, operation)` pair
//! and folds the answer into a [`TypeActionMap`]. [`ensure_authorized`] additionally turns an
//! insufficient answer into [`EnsureAuthorizedError::Unauthorized`].

use std::collections::{BTreeMap, BTreeSet};

use saved_objects_sdk::utils::ALL_NAMESPACES_STRING;

use crate::audit::MissingPrivilege;
use crate::authorization::{Actions, CheckPrivilegesError, CheckSavedObjectsPrivileges};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    FullyAuthorized,
    PartiallyAuthorized,
    Unauthorized,
}

/// Where one operation on one type is authorized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnsureAuthorizedActionResult {
    pub authorized_spaces: Vec<String>,
    pub is_globally_authorized: bool,
}

impl EnsureAuthorizedActionResult {
    fn is_authorized_anywhere(&self) -> bool {
        self.is_globally_authorized || !self.authorized_spaces.is_empty()
    }
}

/// type -> operation -> authorization.
pub type TypeActionMap = BTreeMap<String, BTreeMap<String, EnsureAuthorizedActionResult>>;

#[derive(Debug, Clone)]
pub struct EnsureAuthorizedResult {
    pub status: AuthorizationStatus,
    pub type_map: TypeActionMap,
    pub username: String,
    pub missing_privileges: Vec<MissingPrivilege>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnsureAuthorizedOptions {
    /// Treat partial authorization as a denial.
    pub require_full_authorization: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum EnsureAuthorizedError {
    #[error(transparent)]
    Check(#[from] CheckPrivilegesError),

    #[error("{message}")]
    Unauthorized {
        message: String,
        result: Box<EnsureAuthorizedResult>,
    },
}

/// Check every `(type, operation)` pair in `space_ids`.
///
/// # Errors
/// Propagates the privilege checker's failure.
pub async fn check_authorization(
    checker: &dyn CheckSavedObjectsPrivileges,
    actions: &Actions,
    types: &[&str],
    operations: &[&str],
    space_ids: &[String],
) -> Result<EnsureAuthorizedResult, CheckPrivilegesError> {
    let mut privilege_map: BTreeMap<String, (&str, &str)> = BTreeMap::new();
    for &object_type in types {
        for &operation in operations {
            privilege_map.insert(
                actions.saved_object.get(object_type, operation),
                (object_type, operation),
            );
        }
    }
    let privileges: Vec<String> = privilege_map.keys().cloned().collect();

    let response = checker.check(&privileges, space_ids).await?;

    let mut type_map = TypeActionMap::new();
    let mut missing_privileges = Vec::new();
    for result in response.privileges {
        let Some(&(object_type, operation)) = privilege_map.get(&result.privilege) else {
            continue;
        };
        if !result.authorized {
            missing_privileges.push(MissingPrivilege {
                space_id: result.resource,
                privilege: result.privilege,
            });
            continue;
        }
        let entry = type_map
            .entry(object_type.to_owned())
            .or_default()
            .entry(operation.to_owned())
            .or_default();
        match result.resource {
            None => entry.is_globally_authorized = true,
            Some(space) => entry.authorized_spaces.push(space),
        }
    }

    let status = if response.has_all_requested {
        AuthorizationStatus::FullyAuthorized
    } else if type_map
        .values()
        .flat_map(BTreeMap::values)
        .any(EnsureAuthorizedActionResult::is_authorized_anywhere)
    {
        AuthorizationStatus::PartiallyAuthorized
    } else {
        AuthorizationStatus::Unauthorized
    };

    Ok(EnsureAuthorizedResult {
        status,
        type_map,
        username: response.username,
        missing_privileges,
    })
}

/// Like [`check_authorization`], failing when the status is not good enough.
///
/// The failure message names every operation and the types it is denied for, e.g.
/// `Unable to bulk_get dashboard,index-pattern`.
///
/// # Errors
/// - [`EnsureAuthorizedError::Check`] if the privilege check fails
/// - [`EnsureAuthorizedError::Unauthorized`] if the identity is unauthorized, or only
///   partially authorized while `options.require_full_authorization` is set
pub async fn ensure_authorized(
    checker: &dyn CheckSavedObjectsPrivileges,
    actions: &Actions,
    types: &[&str],
    operations: &[&str],
    space_ids: &[String],
    options: EnsureAuthorizedOptions,
) -> Result<EnsureAuthorizedResult, EnsureAuthorizedError> {
    let result = check_authorization(checker, actions, types, operations, space_ids).await?;

    let denied = match result.status {
        AuthorizationStatus::FullyAuthorized => false,
        AuthorizationStatus::PartiallyAuthorized => options.require_full_authorization,
        AuthorizationStatus::Unauthorized => true,
    };
    if !denied {
        return Ok(result);
    }

    let message = unauthorized_message(&result.type_map, types, operations, space_ids);
    Err(EnsureAuthorizedError::Unauthorized {
        message,
        result: Box::new(result),
    })
}

fn unauthorized_message(
    type_map: &TypeActionMap,
    types: &[&str],
    operations: &[&str],
    space_ids: &[String],
) -> String {
    let parts: Vec<String> = operations
        .iter()
        .filter_map(|&operation| {
            let denied: BTreeSet<&str> = types
                .iter()
                .copied()
                .filter(|t| {
                    !is_authorized_for_object_in_all_spaces(t, operation, type_map, space_ids)
                })
                .collect();
            (!denied.is_empty()).then(|| {
                format!(
                    "{operation} {}",
                    denied.into_iter().collect::<Vec<_>>().join(",")
                )
            })
        })
        .collect();
    format!("Unable to {}", parts.join(", "))
}

/// Authorization of `operation` on `object_type`; empty when nothing was granted.
#[must_use]
pub fn get_ensure_authorized_action_result(
    object_type: &str,
    operation: &str,
    type_map: &TypeActionMap,
) -> EnsureAuthorizedActionResult {
    type_map
        .get(object_type)
        .and_then(|actions| actions.get(operation))
        .cloned()
        .unwrap_or_default()
}

/// Whether `operation` on `object_type` is allowed in every one of `spaces_to_authorize`.
///
/// `*` requires global authorization.
#[must_use]
pub fn is_authorized_for_object_in_all_spaces(
    object_type: &str,
    operation: &str,
    type_map: &TypeActionMap,
    spaces_to_authorize: &[String],
) -> bool {
    let result = get_ensure_authorized_action_result(object_type, operation, type_map);
    if result.is_globally_authorized {
        return true;
    }
    spaces_to_authorize.iter().all(|space| {
        space != ALL_NAMESPACES_STRING && result.authorized_spaces.contains(space)
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::authorization::{CheckPrivilegesResponse, PrivilegeCheckResult};
    use async_trait::async_trait;

    /// Grants exactly the listed `(space, privilege)` pairs; `None` is global.
    struct Grants(Vec<(Option<&'static str>, &'static str)>);

    #[async_trait]
    impl CheckSavedObjectsPrivileges for Grants {
        async fn check(
            &self,
            privileges: &[String],
            space_ids: &[String],
        ) -> Result<CheckPrivilegesResponse, CheckPrivilegesError> {
            let resources: Vec<Option<String>> =
                if space_ids.is_empty() || space_ids.iter().any(|s| s == "*") {
                    vec![None]
                } else {
                    space_ids.iter().cloned().map(Some).collect()
                };
            let mut results = Vec::new();
            for resource in &resources {
                for privilege in privileges {
                    let authorized = self.0.iter().any(|(space, granted)| {
                        *granted == privilege
                            && (space.is_none() || space.map(str::to_owned) == *resource)
                    });
                    results.push(PrivilegeCheckResult {
                        resource: resource.clone(),
                        privilege: privilege.clone(),
                        authorized,
                    });
                }
            }
            Ok(CheckPrivilegesResponse {
                has_all_requested: results.iter().all(|r| r.authorized),
                username: "elastic".to_owned(),
                privileges: results,
            })
        }
    }

    fn spaces(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_owned()).collect()
    }

    #[tokio::test]
    async fn full_grant_is_fully_authorized() {
        let checker = Grants(vec![(None, "saved_object:dashboard/get")]);
        let result = ensure_authorized(
            &checker,
            &Actions::new("1"),
            &["dashboard"],
            &["get"],
            &spaces(&["default"]),
            EnsureAuthorizedOptions {
                require_full_authorization: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.status, AuthorizationStatus::FullyAuthorized);
        assert!(result.missing_privileges.is_empty());
        assert_eq!(result.username, "elastic");
    }

    #[tokio::test]
    async fn partial_grant_is_reported_per_type_and_space() {
        let checker = Grants(vec![(Some("sales"), "saved_object:dashboard/find")]);
        let result = check_authorization(
            &checker,
            &Actions::new("1"),
            &["dashboard", "index-pattern"],
            &["find"],
            &spaces(&["sales", "ops"]),
        )
        .await
        .unwrap();

        assert_eq!(result.status, AuthorizationStatus::PartiallyAuthorized);
        assert_eq!(
            get_ensure_authorized_action_result("dashboard", "find", &result.type_map),
            EnsureAuthorizedActionResult {
                authorized_spaces: vec!["sales".to_owned()],
                is_globally_authorized: false,
            }
        );
        assert_eq!(
            get_ensure_authorized_action_result("index-pattern", "find", &result.type_map),
            EnsureAuthorizedActionResult::default()
        );
        assert!(is_authorized_for_object_in_all_spaces(
            "dashboard",
            "find",
            &result.type_map,
            &spaces(&["sales"])
        ));
        assert!(!is_authorized_for_object_in_all_spaces(
            "dashboard",
            "find",
            &result.type_map,
            &spaces(&["sales", "ops"])
        ));
        assert_eq!(result.missing_privileges.len(), 3);
    }

    #[tokio::test]
    async fn denial_message_lists_sorted_types_per_operation() {
        let checker = Grants(vec![]);
        let err = ensure_authorized(
            &checker,
            &Actions::new("1"),
            &["index-pattern", "dashboard"],
            &["bulk_get"],
            &spaces(&["default"]),
            EnsureAuthorizedOptions::default(),
        )
        .await
        .unwrap_err();

        match err {
            EnsureAuthorizedError::Unauthorized { message, result } => {
                assert_eq!(message, "Unable to bulk_get dashboard,index-pattern");
                assert_eq!(result.status, AuthorizationStatus::Unauthorized);
            }
            EnsureAuthorizedError::Check(err) => panic!("unexpected check failure: {err}"),
        }
    }

    #[tokio::test]
    async fn partial_grant_fails_when_full_authorization_is_required() {
        let checker = Grants(vec![(None, "saved_object:dashboard/create")]);
        let err = ensure_authorized(
            &checker,
            &Actions::new("1"),
            &["dashboard", "visualization"],
            &["create"],
            &spaces(&["default"]),
            EnsureAuthorizedOptions {
                require_full_authorization: true,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Unable to create visualization");
    }

    #[test]
    fn wildcard_space_needs_global_authorization() {
        let mut type_map = TypeActionMap::new();
        type_map.entry("dashboard".to_owned()).or_default().insert(
            "find".to_owned(),
            EnsureAuthorizedActionResult {
                authorized_spaces: vec!["sales".to_owned()],
                is_globally_authorized: false,
            },
        );
        assert!(!is_authorized_for_object_in_all_spaces(
            "dashboard",
            "find",
            &type_map,
            &spaces(&["*"])
        ));
    }
}
