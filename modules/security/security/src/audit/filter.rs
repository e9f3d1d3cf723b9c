//! Ignore filters for audit events.

use super::event::AuditEvent;
use crate::config::AuditIgnoreFilter;

fn matches_any(values: &[String], value: &str) -> bool {
    values.is_empty() || values.iter().any(|v| v == value)
}

/// Whether `filter` drops `event`.
#[must_use]
pub fn filter_matches(filter: &AuditIgnoreFilter, event: &AuditEvent) -> bool {
    let object_type = event.saved_object.as_ref().map(|so| so.object_type.as_str());

    matches_any(&filter.actions, &event.event.action)
        && matches_any(&filter.categories, &event.event.category)
        && (filter.types.is_empty()
            || object_type.is_some_and(|t| filter.types.iter().any(|f| f == t)))
        && matches_any(&filter.outcomes, event.event.outcome.as_str())
}

/// Whether any of `filters` drops `event`.
#[must_use]
pub fn is_ignored(filters: &[AuditIgnoreFilter], event: &AuditEvent) -> bool {
    filters.iter().any(|f| filter_matches(f, event))
}
