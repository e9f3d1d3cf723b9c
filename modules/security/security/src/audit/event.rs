//! Audit event model and the saved-object event builder.

use chrono::{DateTime, Utc};
use saved_objects_sdk::{SavedObjectsError, SavedObjectsErrorPayload};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    Success,
    Failure,
    /// The operation was started but its result is not known yet.
    Unknown,
}

impl EventOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub action: String,
    pub category: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub outcome: EventOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedObjectDescriptor {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
}

impl SavedObjectDescriptor {
    #[must_use]
    pub fn new(object_type: &str, id: &str) -> Self {
        Self {
            object_type: object_type.to_owned(),
            id: id.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl From<&SavedObjectsError> for ErrorDetails {
    fn from(err: &SavedObjectsError) -> Self {
        Self {
            code: err.error_label().to_owned(),
            message: err.to_string(),
        }
    }
}

/// Per-item failure reported inside a bulk response.
impl From<&SavedObjectsErrorPayload> for ErrorDetails {
    fn from(payload: &SavedObjectsErrorPayload) -> Self {
        Self {
            code: payload.error.clone(),
            message: payload.message.clone(),
        }
    }
}

/// A structured audit record.
///
/// `user`, `space_id`, `trace_id` and `timestamp` are filled in by the scoped logger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub message: String,
    pub event: EventDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_object: Option<SavedObjectDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavedObjectAction {
    Create,
    Get,
    Update,
    Delete,
    Find,
}

impl SavedObjectAction {
    /// Event action name, e.g. `saved_object_create`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "saved_object_create",
            Self::Get => "saved_object_get",
            Self::Update => "saved_object_update",
            Self::Delete => "saved_object_delete",
            Self::Find => "saved_object_find",
        }
    }

    /// Base, progressive and past forms used in event messages.
    fn verbs(self) -> [&'static str; 3] {
        match self {
            Self::Create => ["create", "creating", "created"],
            Self::Get | Self::Find => ["access", "accessing", "accessed"],
            Self::Update => ["update", "updating", "updated"],
            Self::Delete => ["delete", "deleting", "deleted"],
        }
    }

    fn event_type(self) -> &'static str {
        match self {
            Self::Create => "creation",
            Self::Get | Self::Find => "access",
            Self::Update => "change",
            Self::Delete => "deletion",
        }
    }
}

/// Input of [`saved_object_event`].
#[derive(Debug, Clone)]
pub struct SavedObjectEventParams {
    pub action: SavedObjectAction,
    /// Defaults to success, or failure when `error` is set.
    pub outcome: Option<EventOutcome>,
    pub saved_object: Option<SavedObjectDescriptor>,
    pub error: Option<ErrorDetails>,
}

#[must_use]
pub fn saved_object_event(params: SavedObjectEventParams) -> AuditEvent {
    let [base, progressive, past] = params.action.verbs();
    let doc = params.saved_object.as_ref().map_or_else(
        || "saved objects".to_owned(),
        |so| format!("{} [id={}]", so.object_type, so.id),
    );

    let (message, outcome) = match (&params.error, params.outcome) {
        (Some(_), _) => (format!("Failed attempt to {base} {doc}"), EventOutcome::Failure),
        (None, Some(EventOutcome::Unknown)) => {
            (format!("User is {progressive} {doc}"), EventOutcome::Unknown)
        }
        (None, outcome) => (
            format!("User has {past} {doc}"),
            outcome.unwrap_or(EventOutcome::Success),
        ),
    };

    AuditEvent {
        message,
        event: EventDetails {
            action: params.action.as_str().to_owned(),
            category: "database".to_owned(),
            event_type: params.action.event_type().to_owned(),
            outcome,
        },
        user: None,
        space_id: None,
        saved_object: params.saved_object,
        error: params.error,
        trace_id: None,
        timestamp: None,
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn success_message_uses_past_tense() {
        let event = saved_object_event(SavedObjectEventParams {
            action: SavedObjectAction::Create,
            outcome: None,
            saved_object: Some(SavedObjectDescriptor::new("dashboard", "d1")),
            error: None,
        });

        assert_eq!(event.message, "User has created dashboard [id=d1]");
        assert_eq!(event.event.action, "saved_object_create");
        assert_eq!(event.event.event_type, "creation");
        assert_eq!(event.event.outcome, EventOutcome::Success);
        assert!(event.error.is_none());
    }

    #[test]
    fn unknown_outcome_uses_progressive_tense() {
        let event = saved_object_event(SavedObjectEventParams {
            action: SavedObjectAction::Delete,
            outcome: Some(EventOutcome::Unknown),
            saved_object: Some(SavedObjectDescriptor::new("dashboard", "d1")),
            error: None,
        });
        assert_eq!(event.message, "User is deleting dashboard [id=d1]");
        assert_eq!(event.event.outcome, EventOutcome::Unknown);
    }

    #[test]
    fn error_makes_a_failure_event() {
        let err = SavedObjectsError::Forbidden {
            message: "Unable to find dashboard".to_owned(),
        };
        let event = saved_object_event(SavedObjectEventParams {
            action: SavedObjectAction::Find,
            outcome: Some(EventOutcome::Success),
            saved_object: None,
            error: Some(ErrorDetails::from(&err)),
        });

        assert_eq!(event.message, "Failed attempt to access saved objects");
        assert_eq!(event.event.outcome, EventOutcome::Failure);
        assert_eq!(event.error.unwrap().code, err.error_label());
    }

    #[test]
    fn serialized_event_omits_unset_fields() {
        let event = saved_object_event(SavedObjectEventParams {
            action: SavedObjectAction::Get,
            outcome: None,
            saved_object: None,
            error: None,
        });
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"]["type"], "access");
        assert_eq!(json["event"]["outcome"], "success");
        assert!(json.get("user").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn bulk_item_error_keeps_its_label_and_message() {
        let payload = SavedObjectsError::Conflict {
            object_type: "dashboard".to_owned(),
            id: "d1".to_owned(),
        }
        .to_payload();
        let event = saved_object_event(SavedObjectEventParams {
            action: SavedObjectAction::Create,
            outcome: None,
            saved_object: Some(SavedObjectDescriptor::new("dashboard", "d1")),
            error: Some(ErrorDetails::from(&payload)),
        });

        assert_eq!(event.message, "Failed attempt to create dashboard [id=d1]");
        assert_eq!(event.event.outcome, EventOutcome::Failure);
        let error = event.error.unwrap();
        assert_eq!(error.code, "Conflict");
        assert_eq!(error.message, "Saved object [dashboard/d1] conflict");
    }
}
