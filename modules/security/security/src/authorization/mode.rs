//! Whether role-based access control applies to a request.

use saved_objects_sdk::RequestContext;

pub trait AuthorizationMode: Send + Sync {
    fn use_rbac_for_request(&self, request: &RequestContext) -> bool;
}

impl<F> AuthorizationMode for F
where
    F: Fn(&RequestContext) -> bool + Send + Sync,
{
    fn use_rbac_for_request(&self, request: &RequestContext) -> bool {
        self(request)
    }
}

/// Mode driven by `authorization.rbac_enabled`: RBAC for every authenticated request.
#[derive(Debug, Clone, Copy)]
pub struct ConfiguredMode {
    rbac_enabled: bool,
}

impl ConfiguredMode {
    #[must_use]
    pub fn new(rbac_enabled: bool) -> Self {
        Self { rbac_enabled }
    }
}

impl AuthorizationMode for ConfiguredMode {
    fn use_rbac_for_request(&self, request: &RequestContext) -> bool {
        self.rbac_enabled && request.is_authenticated()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn configured_mode_requires_authentication() {
        let mode = ConfiguredMode::new(true);
        let user = RequestContext::builder().subject_id(Uuid::new_v4()).build();

        assert!(mode.use_rbac_for_request(&user));
        assert!(!mode.use_rbac_for_request(&RequestContext::anonymous()));
        assert!(!ConfiguredMode::new(false).use_rbac_for_request(&user));
    }

    #[test]
    fn closures_are_modes() {
        let mode = |request: &RequestContext| request.username() == Some("elastic");
        let request = RequestContext::builder().username("elastic").build();
        assert!(mode.use_rbac_for_request(&request));
    }
}
