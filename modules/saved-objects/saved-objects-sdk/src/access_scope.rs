use uuid::Uuid;

/// Tenants whose documents a request may see.
///
/// An empty scope is a "deny all" scope: a scoped repository bound to it sees nothing.
#[derive(Clone, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct AccessScope {
    tenant_ids: Vec<Uuid>,
}

impl AccessScope {
    #[inline]
    #[must_use]
    pub fn tenant_ids(&self) -> &[Uuid] {
        &self.tenant_ids
    }

    /// Returns true if this scope grants nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tenant_ids.is_empty()
    }

    #[must_use]
    pub fn contains_tenant(&self, tenant_id: Uuid) -> bool {
        self.tenant_ids.contains(&tenant_id)
    }

    #[must_use]
    pub fn tenants_only(tenant_ids: Vec<Uuid>) -> Self {
        Self { tenant_ids }
    }

    #[must_use]
    pub fn tenant(tenant_id: Uuid) -> Self {
        Self::tenants_only(vec![tenant_id])
    }
}
