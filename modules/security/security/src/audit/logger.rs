//! Scoped audit logging.
//!
//! [`AuditService::as_scoped`] binds a logger to a request: every event it logs is enriched
//! with the request's user, space and trace id before the ignore filters run and the event
//! reaches the [`AuditSink`].

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use saved_objects_sdk::RequestContext;
use saved_objects_sdk::utils::DEFAULT_NAMESPACE_STRING;
use tracing::info;

use super::event::AuditEvent;
use super::filter::is_ignored;
use crate::config::{AuditConfig, AuditIgnoreFilter};

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("failed to serialize audit event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("audit sink unavailable: {0}")]
    Sink(String),
}

/// Destination of audit events.
pub trait AuditSink: Send + Sync {
    /// # Errors
    /// Returns [`AuditError`] if the event could not be written.
    fn write(&self, event: &AuditEvent) -> Result<(), AuditError>;
}

/// Audit logger bound to one request.
pub trait AuditLogger: Send + Sync {
    /// # Errors
    /// Returns [`AuditError`] if the event could not be written.
    fn log(&self, event: AuditEvent) -> Result<(), AuditError>;
}

/// Hands out request-scoped audit loggers.
pub trait AuditServiceSetup: Send + Sync {
    fn as_scoped(&self, request: &RequestContext) -> Arc<dyn AuditLogger>;
}

pub struct AuditService {
    config: AuditConfig,
    sink: Arc<dyn AuditSink>,
}

impl AuditService {
    #[must_use]
    pub fn new(config: AuditConfig, sink: Arc<dyn AuditSink>) -> Self {
        Self { config, sink }
    }
}

impl AuditServiceSetup for AuditService {
    fn as_scoped(&self, request: &RequestContext) -> Arc<dyn AuditLogger> {
        Arc::new(ScopedAuditLogger {
            enabled: self.config.enabled,
            filters: self.config.ignore_filters.clone(),
            request: request.clone(),
            sink: Arc::clone(&self.sink),
        })
    }
}

struct ScopedAuditLogger {
    enabled: bool,
    filters: Vec<AuditIgnoreFilter>,
    request: RequestContext,
    sink: Arc<dyn AuditSink>,
}

impl AuditLogger for ScopedAuditLogger {
    fn log(&self, mut event: AuditEvent) -> Result<(), AuditError> {
        if !self.enabled {
            return Ok(());
        }

        event.user = self.request.username().map(str::to_owned);
        event.space_id = Some(
            self.request
                .space_id()
                .unwrap_or(DEFAULT_NAMESPACE_STRING)
                .to_owned(),
        );
        event.trace_id = Some(self.request.request_id().to_string());
        event.timestamp = Some(Utc::now());

        if is_ignored(&self.filters, &event) {
            return Ok(());
        }
        self.sink.write(&event)
    }
}

/// Writes each event as one JSON line through `tracing` under the `security.audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn write(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let json = serde_json::to_string(event)?;
        info!(target: "security.audit", event = %json, "{}", event.message);
        Ok(())
    }
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl AuditSink for MemoryAuditSink {
    fn write(&self, event: &AuditEvent) -> Result<(), AuditError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}
