//! Configuration for the security module.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then `SECURITY__*`
//! environment variables (`SECURITY__AUDIT__ENABLED=true` sets `audit.enabled`).

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Environment variable prefix of the security configuration.
pub const ENV_PREFIX: &str = "SECURITY__";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid security configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Invalid(Box::new(err))
    }
}

/// Module configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    pub authorization: AuthorizationConfig,
    pub audit: AuditConfig,
    pub legacy_audit: LegacyAuditConfig,
    pub static_authz: StaticAuthzConfig,
}

impl SecurityConfig {
    /// Load defaults, then `path` (when given), then the environment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if a layer cannot be read or does not match the schema.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Ok(figment.extract()?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorizationConfig {
    /// Enforce role-based access control on saved objects.
    pub rbac_enabled: bool,

    /// Application version used in the `version:` action.
    pub version: String,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            rbac_enabled: true,
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    pub enabled: bool,

    /// Events matching any filter are dropped.
    pub ignore_filters: Vec<AuditIgnoreFilter>,
}

/// Drops events whose fields all match. Empty lists match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditIgnoreFilter {
    pub actions: Vec<String>,
    pub categories: Vec<String>,
    pub types: Vec<String>,
    pub outcomes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LegacyAuditConfig {
    pub enabled: bool,
}

/// Privileges granted by the static privilege checker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticAuthzConfig {
    pub users: Vec<UserGrants>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserGrants {
    pub username: String,
    #[serde(default)]
    pub grants: Vec<PrivilegeGrant>,
}

/// Privileges in one space, or in every space when `space` is absent.
///
/// A privilege ending in `*` grants every privilege with that prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrivilegeGrant {
    #[serde(default)]
    pub space: Option<String>,
    pub privileges: Vec<String>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_enable_rbac_only() {
        let cfg = SecurityConfig::default();
        assert!(cfg.authorization.rbac_enabled);
        assert!(!cfg.audit.enabled);
        assert!(!cfg.legacy_audit.enabled);
        assert!(cfg.static_authz.users.is_empty());
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
audit:
  enabled: true
  ignore_filters:
    - actions: ["saved_object_find"]
static_authz:
  users:
    - username: elastic
      grants:
        - privileges: ["saved_object:*"]
        - space: sales
          privileges: ["login:"]
"#
        )
        .unwrap();

        let cfg = SecurityConfig::load(Some(file.path())).unwrap();

        assert!(cfg.audit.enabled);
        assert_eq!(cfg.audit.ignore_filters[0].actions, vec!["saved_object_find"]);
        assert!(cfg.authorization.rbac_enabled);
        let grants = &cfg.static_authz.users[0].grants;
        assert_eq!(grants[0].space, None);
        assert_eq!(grants[1].space.as_deref(), Some("sales"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "audit:\n  enable: true").unwrap();

        assert!(SecurityConfig::load(Some(file.path())).is_err());
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let cfg = SecurityConfig::load(None).unwrap();
        assert!(cfg.authorization.rbac_enabled);
    }
}
