//! Saved Objects SDK
//!
//! This crate provides the public API for the `saved-objects` module:
//!
//! - [`SavedObjectsClientContract`] - operations over persisted documents
//! - [`RepositoryFactory`] - internal and request-scoped repositories
//! - [`SavedObjectsServiceSetup`] - client factory provider and wrapper registration
//! - [`RequestContext`], [`AccessScope`] - per-request identity and visibility
//! - [`SavedObjectsError`], [`SavedObjectsErrorHelpers`] - error types and constructors
//!
//! ## Usage
//!
//! ```ignore
//! use saved_objects_sdk::{BaseOptions, RequestContext};
//!
//! let client = saved_objects_start.get_scoped_client(&request, Default::default())?;
//! let dashboard = client.get("dashboard", "d-1", BaseOptions::default()).await?;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod access_scope;
pub mod api;
pub mod context;
pub mod error;
pub mod models;
pub mod type_registry;
pub mod utils;

pub use access_scope::AccessScope;
pub use api::{
    ClientFactory, ClientFactoryParams, ClientFactoryProvider, ClientWrapperFactory,
    ClientWrapperFactoryOptions, RepositoryFactory, SavedObjectsClientContract,
    SavedObjectsClientRef, SavedObjectsServiceSetup,
};
pub use context::{RequestContext, RequestContextBuilder};
pub use error::{
    DefaultErrorHelpers, SavedObjectsError, SavedObjectsErrorHelpers, SavedObjectsErrorPayload,
    SetupError,
};
pub use models::{
    BaseOptions, BulkCreateObject, BulkCreateOptions, BulkGetObject, BulkItem, BulkResponse,
    CreateOptions, DeleteOptions, FindOptions, FindResponse, SavedObject, SavedObjectReference,
    UpdateOptions,
};
pub use type_registry::{NamespaceType, SavedObjectTypeRegistry, SavedObjectsType};
