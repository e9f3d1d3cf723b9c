//! Audit logging: structured saved-object events and the legacy authorization trail.

pub mod event;
pub mod filter;
pub mod legacy;
pub mod logger;

pub use event::{
    AuditEvent, ErrorDetails, EventOutcome, SavedObjectAction, SavedObjectDescriptor,
    SavedObjectEventParams, saved_object_event,
};
pub use legacy::{
    LegacyAuditKind, LegacyAuditRecord, MemorySecurityAuditLogger, MissingPrivilege,
    SecurityAuditLogger, TracingSecurityAuditLogger,
};
pub use logger::{
    AuditError, AuditLogger, AuditService, AuditServiceSetup, AuditSink, MemoryAuditSink,
    TracingAuditSink,
};
