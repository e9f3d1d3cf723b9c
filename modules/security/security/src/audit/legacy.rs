//! Legacy authorization audit trail: one record per authorization decision.

use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use super::logger::AuditError;

/// A privilege missing in `space_id`, or globally when `space_id` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingPrivilege {
    pub space_id: Option<String>,
    pub privilege: String,
}

pub trait SecurityAuditLogger: Send + Sync {
    /// # Errors
    /// Returns [`AuditError`] if the record could not be written.
    fn saved_objects_authorization_failure(
        &self,
        username: &str,
        action: &str,
        types: &[String],
        space_ids: &[String],
        missing: &[MissingPrivilege],
        args: &serde_json::Value,
    ) -> Result<(), AuditError>;

    /// # Errors
    /// Returns [`AuditError`] if the record could not be written.
    fn saved_objects_authorization_success(
        &self,
        username: &str,
        action: &str,
        types: &[String],
        space_ids: &[String],
        args: &serde_json::Value,
    ) -> Result<(), AuditError>;
}

/// Emits legacy records through `tracing` under the `security.legacy_audit` target.
#[derive(Debug, Clone, Copy)]
pub struct TracingSecurityAuditLogger {
    enabled: bool,
}

impl TracingSecurityAuditLogger {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl SecurityAuditLogger for TracingSecurityAuditLogger {
    fn saved_objects_authorization_failure(
        &self,
        username: &str,
        action: &str,
        types: &[String],
        space_ids: &[String],
        missing: &[MissingPrivilege],
        args: &serde_json::Value,
    ) -> Result<(), AuditError> {
        if !self.enabled {
            return Ok(());
        }
        let missing = serde_json::to_string(missing)?;
        info!(
            target: "security.legacy_audit",
            event_type = "saved_objects_authorization_failure",
            username,
            action,
            types = %types.join(","),
            spaces = %space_ids.join(","),
            missing = %missing,
            args = %args,
            "{username} unauthorized to {action} {}",
            types.join(",")
        );
        Ok(())
    }

    fn saved_objects_authorization_success(
        &self,
        username: &str,
        action: &str,
        types: &[String],
        space_ids: &[String],
        args: &serde_json::Value,
    ) -> Result<(), AuditError> {
        if !self.enabled {
            return Ok(());
        }
        info!(
            target: "security.legacy_audit",
            event_type = "saved_objects_authorization_success",
            username,
            action,
            types = %types.join(","),
            spaces = %space_ids.join(","),
            args = %args,
            "{username} authorized to {action} {}",
            types.join(",")
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyAuditKind {
    AuthorizationFailure,
    AuthorizationSuccess,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyAuditRecord {
    pub kind: LegacyAuditKind,
    pub username: String,
    pub action: String,
    pub types: Vec<String>,
    pub space_ids: Vec<String>,
    pub missing: Vec<MissingPrivilege>,
    pub args: serde_json::Value,
}

/// Keeps legacy records in memory.
#[derive(Debug, Default)]
pub struct MemorySecurityAuditLogger {
    records: Mutex<Vec<LegacyAuditRecord>>,
}

impl MemorySecurityAuditLogger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<LegacyAuditRecord> {
        self.records.lock().clone()
    }

    #[must_use]
    pub fn count(&self, kind: LegacyAuditKind) -> usize {
        self.records.lock().iter().filter(|r| r.kind == kind).count()
    }
}

impl SecurityAuditLogger for MemorySecurityAuditLogger {
    fn saved_objects_authorization_failure(
        &self,
        username: &str,
        action: &str,
        types: &[String],
        space_ids: &[String],
        missing: &[MissingPrivilege],
        args: &serde_json::Value,
    ) -> Result<(), AuditError> {
        self.records.lock().push(LegacyAuditRecord {
            kind: LegacyAuditKind::AuthorizationFailure,
            username: username.to_owned(),
            action: action.to_owned(),
            types: types.to_vec(),
            space_ids: space_ids.to_vec(),
            missing: missing.to_vec(),
            args: args.clone(),
        });
        Ok(())
    }

    fn saved_objects_authorization_success(
        &self,
        username: &str,
        action: &str,
        types: &[String],
        space_ids: &[String],
        args: &serde_json::Value,
    ) -> Result<(), AuditError> {
        self.records.lock().push(LegacyAuditRecord {
            kind: LegacyAuditKind::AuthorizationSuccess,
            username: username.to_owned(),
            action: action.to_owned(),
            types: types.to_vec(),
            space_ids: space_ids.to_vec(),
            missing: Vec::new(),
            args: args.clone(),
        });
        Ok(())
    }
}
