//! Authorization: RBAC mode, action names and privilege checks.

pub mod actions;
pub mod check_privileges;
pub mod mode;
pub mod static_checker;

pub use actions::Actions;
pub use check_privileges::{
    CheckPrivilegesError, CheckPrivilegesResponse, CheckSavedObjectsPrivileges,
    CheckSavedObjectsPrivilegesWithRequest, PrivilegeCheckResult,
};
pub use mode::{AuthorizationMode, ConfiguredMode};
pub use static_checker::StaticPrivilegeChecker;
