//! Error types for the saved-objects module.
//!
//! Every error a saved-objects client returns, whichever layer produced it, is a
//! [`SavedObjectsError`]. Layers that decorate a client build their errors through the
//! base client's [`SavedObjectsErrorHelpers`] so callers can handle errors by shape
//! (status code and label) without knowing which layer raised them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by saved-objects clients and repositories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SavedObjectsError {
    /// The request was malformed.
    #[error("{message}")]
    BadRequest { message: String },

    /// The object type is not registered or not visible to this client.
    #[error("Unsupported saved object type: '{object_type}'")]
    UnsupportedType { object_type: String },

    /// The caller lacks the privileges for the operation.
    #[error("{message}")]
    Forbidden { message: String },

    #[error("Saved object [{object_type}/{id}] not found")]
    NotFound { object_type: String, id: String },

    #[error("Saved object [{object_type}/{id}] conflict")]
    Conflict { object_type: String, id: String },

    /// Any other failure, including failures of collaborators.
    #[error("{message}")]
    General { message: String },
}

impl SavedObjectsError {
    /// HTTP-like status code of the error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } | Self::UnsupportedType { .. } => 400,
            Self::Forbidden { .. } => 403,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::General { .. } => 500,
        }
    }

    /// Short label matching the status code.
    #[must_use]
    pub fn error_label(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } | Self::UnsupportedType { .. } => "Bad Request",
            Self::Forbidden { .. } => "Forbidden",
            Self::NotFound { .. } => "Not Found",
            Self::Conflict { .. } => "Conflict",
            Self::General { .. } => "Internal Server Error",
        }
    }

    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::BadRequest { .. } | Self::UnsupportedType { .. }
        )
    }

    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    #[must_use]
    pub fn is_general(&self) -> bool {
        matches!(self, Self::General { .. })
    }

    /// Serializable form of the error, as embedded in bulk responses.
    #[must_use]
    pub fn to_payload(&self) -> SavedObjectsErrorPayload {
        SavedObjectsErrorPayload {
            status_code: self.status_code(),
            error: self.error_label().to_owned(),
            message: self.to_string(),
        }
    }
}

/// Wire shape of a [`SavedObjectsError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedObjectsErrorPayload {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

/// Constructors for [`SavedObjectsError`] exposed by a client.
///
/// Decorating clients receive the base client's helpers and must create their errors
/// through them.
pub trait SavedObjectsErrorHelpers: Send + Sync {
    fn create_bad_request_error(&self, reason: &str) -> SavedObjectsError {
        SavedObjectsError::BadRequest {
            message: format!("{reason}: Bad Request"),
        }
    }

    fn create_unsupported_type_error(&self, object_type: &str) -> SavedObjectsError {
        SavedObjectsError::UnsupportedType {
            object_type: object_type.to_owned(),
        }
    }

    fn decorate_forbidden_error(&self, reason: &str) -> SavedObjectsError {
        SavedObjectsError::Forbidden {
            message: reason.to_owned(),
        }
    }

    fn create_generic_not_found_error(&self, object_type: &str, id: &str) -> SavedObjectsError {
        SavedObjectsError::NotFound {
            object_type: object_type.to_owned(),
            id: id.to_owned(),
        }
    }

    fn create_conflict_error(&self, object_type: &str, id: &str) -> SavedObjectsError {
        SavedObjectsError::Conflict {
            object_type: object_type.to_owned(),
            id: id.to_owned(),
        }
    }

    fn decorate_general_error(
        &self,
        source: &(dyn std::error::Error + Send + Sync),
        reason: Option<&str>,
    ) -> SavedObjectsError {
        let message = match reason {
            Some(reason) => format!("{reason}: {source}"),
            None => source.to_string(),
        };
        SavedObjectsError::General { message }
    }
}

/// Stock error helpers used by the built-in client and repositories.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHelpers;

impl SavedObjectsErrorHelpers for DefaultErrorHelpers {}

/// Configuration errors raised while wiring the saved-objects service.
///
/// These are fatal at setup time: the process must not start with an inconsistent
/// registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error(
        "client wrapper '{id}' cannot use priority {priority}: already taken by '{existing_id}'"
    )]
    DuplicatePriority {
        priority: i64,
        id: String,
        existing_id: String,
    },

    #[error("client wrapper '{id}' is already registered")]
    DuplicateWrapperId { id: String },

    #[error("custom client factory provider is already set, and can only be set once")]
    ClientFactoryProviderAlreadySet,

    #[error("saved object type '{name}' is already registered")]
    TypeAlreadyRegistered { name: String },

    #[error("missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("collaborator is already attached: {0}")]
    AlreadyAttached(&'static str),
}
