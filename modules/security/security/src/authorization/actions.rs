//! Privilege (action) names.

/// Prefix of every saved-object action.
pub const SAVED_OBJECT_PREFIX: &str = "saved_object:";

/// Builds saved-object action names: `saved_object:<type>/<operation>`.
#[derive(Debug, Clone)]
pub struct SavedObjectActions {
    prefix: String,
}

impl Default for SavedObjectActions {
    fn default() -> Self {
        Self {
            prefix: SAVED_OBJECT_PREFIX.to_owned(),
        }
    }
}

impl SavedObjectActions {
    #[must_use]
    pub fn get(&self, object_type: &str, operation: &str) -> String {
        format!("{}{object_type}/{operation}", self.prefix)
    }
}

/// Catalog of the actions known to the authorization service.
#[derive(Debug, Clone)]
pub struct Actions {
    pub saved_object: SavedObjectActions,
    /// Granted in every space a user may enter.
    pub login: String,
    pub version: String,
}

impl Actions {
    #[must_use]
    pub fn new(version: &str) -> Self {
        Self {
            saved_object: SavedObjectActions::default(),
            login: "login:".to_owned(),
            version: format!("version:{version}"),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn saved_object_action_names() {
        let actions = Actions::new("8.0.0");
        assert_eq!(
            actions.saved_object.get("dashboard", "bulk_get"),
            "saved_object:dashboard/bulk_get"
        );
        assert_eq!(actions.login, "login:");
        assert_eq!(actions.version, "version:8.0.0");
    }
}
