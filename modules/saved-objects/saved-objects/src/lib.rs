//! Saved Objects module
//!
//! Hands out per-request saved-objects clients. A client is built by the registered client
//! factory (or a plain client over a scoped repository) and then decorated by every
//! registered wrapper, lowest priority innermost.
//!
//! ## Usage
//!
//! ```ignore
//! use saved_objects::{ClientProviderOptions, SavedObjectsSetup};
//! use saved_objects_sdk::SavedObjectsServiceSetup;
//!
//! let mut setup = SavedObjectsSetup::default();
//! setup.register_type(SavedObjectsType::new("dashboard", NamespaceType::Single))?;
//! setup.add_client_wrapper(100, "audit", audit_wrapper)?;
//!
//! let start = setup.start();
//! let client = start.get_scoped_client(&request, &ClientProviderOptions::default())?;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod client;
pub mod client_provider;
pub mod config;
pub mod infra;
pub mod priority;
pub mod service;

pub use client::SavedObjectsClient;
pub use client_provider::{ClientProviderOptions, SavedObjectsClientProvider, default_client_factory};
pub use config::SavedObjectsConfig;
pub use infra::memory::{DocumentStore, InMemoryRepository, InMemoryRepositoryFactory};
pub use priority::{PriorityCollection, PriorityEntry};
pub use service::{SavedObjectsSetup, SavedObjectsStart};
