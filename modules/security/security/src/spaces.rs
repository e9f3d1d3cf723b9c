//! Optional spaces subsystem, resolved lazily at operation time.

use std::sync::{Arc, OnceLock};

use saved_objects_sdk::SetupError;
use saved_objects_sdk::utils::{DEFAULT_NAMESPACE_STRING, namespace_id_to_string};

/// Maps namespaces to space ids and back.
pub trait SpacesService: Send + Sync {
    fn namespace_to_space_id(&self, namespace: Option<&str>) -> String;

    fn space_id_to_namespace(&self, space_id: &str) -> Option<String>;
}

/// Accessor returning the spaces service once it is available.
pub type GetSpacesService = Arc<dyn Fn() -> Option<Arc<dyn SpacesService>> + Send + Sync>;

/// Spaces service where the default space is the `None` namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSpacesService;

impl SpacesService for DefaultSpacesService {
    fn namespace_to_space_id(&self, namespace: Option<&str>) -> String {
        namespace_id_to_string(namespace)
    }

    fn space_id_to_namespace(&self, space_id: &str) -> Option<String> {
        (space_id != DEFAULT_NAMESPACE_STRING).then(|| space_id.to_owned())
    }
}

/// Slot the spaces subsystem attaches to after the security layer is wired.
#[derive(Default)]
pub struct LateBoundSpacesService {
    inner: OnceLock<Arc<dyn SpacesService>>,
}

impl LateBoundSpacesService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// Returns [`SetupError::AlreadyAttached`] if a service is already attached.
    pub fn attach(&self, service: Arc<dyn SpacesService>) -> Result<(), SetupError> {
        self.inner
            .set(service)
            .map_err(|_| SetupError::AlreadyAttached("spaces service"))
    }

    #[must_use]
    pub fn get(&self) -> Option<Arc<dyn SpacesService>> {
        self.inner.get().cloned()
    }

    /// Accessor reading this slot on every call.
    #[must_use]
    pub fn accessor(self: &Arc<Self>) -> GetSpacesService {
        let slot = Arc::clone(self);
        Arc::new(move || slot.get())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_space_maps_to_no_namespace() {
        let spaces = DefaultSpacesService;
        assert_eq!(spaces.namespace_to_space_id(None), "default");
        assert_eq!(spaces.namespace_to_space_id(Some("sales")), "sales");
        assert_eq!(spaces.space_id_to_namespace("default"), None);
        assert_eq!(spaces.space_id_to_namespace("sales").as_deref(), Some("sales"));
    }

    #[test]
    fn accessor_sees_late_attachment() {
        let slot = Arc::new(LateBoundSpacesService::new());
        let accessor = slot.accessor();
        assert!(accessor().is_none());

        slot.attach(Arc::new(DefaultSpacesService)).unwrap();
        assert!(accessor().is_some());

        assert!(slot.attach(Arc::new(DefaultSpacesService)).is_err());
    }
}
