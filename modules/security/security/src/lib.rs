//! Security module
//!
//! Mediates access to saved objects:
//!
//! - [`authorization`] - RBAC mode, action names and privilege checks
//! - [`audit`] - structured audit events and the legacy authorization trail
//! - [`saved_objects`] - client factory provider and the secure client wrapper
//! - [`spaces`] - optional spaces subsystem, resolved at operation time
//!
//! ## Usage
//!
//! ```ignore
//! use security::{SecurityConfig, SecurityPlugin};
//!
//! let config = SecurityConfig::load(Some(path))?;
//! let security = SecurityPlugin::new(config).setup(&mut saved_objects_setup)?;
//! security.register_spaces_service(spaces)?;
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod audit;
pub mod authorization;
pub mod config;
pub mod plugin;
pub mod saved_objects;
pub mod spaces;

pub use config::{ConfigError, SecurityConfig};
pub use plugin::{SecurityPlugin, SecuritySetup};
pub use saved_objects::{
    SECURITY_WRAPPER_ID, SECURITY_WRAPPER_PRIORITY, SecureSavedObjectsClientWrapper,
    SetupSavedObjectsParams, setup_saved_objects,
};
pub use spaces::{DefaultSpacesService, LateBoundSpacesService, SpacesService};
