use crate::AccessScope;
use uuid::Uuid;

/// `RequestContext` carries the identity and session information of a single inbound call.
///
/// It is created per request and never persisted. A context whose subject is the nil UUID
/// represents "no identity" (see [`RequestContext::anonymous`]).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RequestContext {
    request_id: Uuid,
    tenant_id: Uuid,
    subject_id: Uuid,
    username: Option<String>,
    space_id: Option<String>,
    environment: Vec<(String, String)>,
}

impl RequestContext {
    /// Create a new `RequestContext` builder
    #[must_use]
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }

    /// Create an anonymous `RequestContext` with no tenant, subject, or space
    #[must_use]
    pub fn anonymous() -> Self {
        RequestContextBuilder::default().build()
    }

    /// Unique id of the inbound call, used to correlate audit records
    #[must_use]
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    #[must_use]
    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }

    #[must_use]
    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Space the request was routed to, if the caller addressed one explicitly
    #[must_use]
    pub fn space_id(&self) -> Option<&str> {
        self.space_id.as_deref()
    }

    /// Environmental attributes of the call (e.g., client IP, user agent)
    #[must_use]
    pub fn environment(&self) -> &[(String, String)] {
        &self.environment
    }

    /// Returns `true` when the request is bound to an identity.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.subject_id.is_nil()
    }

    /// Visibility of the identity over persisted documents.
    ///
    /// Falls back to a deny-all scope when the request carries no tenant.
    #[must_use]
    pub fn access_scope(&self) -> AccessScope {
        if self.tenant_id.is_nil() {
            return AccessScope::default();
        }
        AccessScope::tenant(self.tenant_id)
    }
}

#[derive(Default)]
pub struct RequestContextBuilder {
    request_id: Option<Uuid>,
    tenant_id: Option<Uuid>,
    subject_id: Option<Uuid>,
    username: Option<String>,
    space_id: Option<String>,
    environment: Vec<(String, String)>,
}

impl RequestContextBuilder {
    #[must_use]
    pub fn request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }

    #[must_use]
    pub fn tenant_id(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    #[must_use]
    pub fn subject_id(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn username(mut self, username: &str) -> Self {
        self.username = Some(username.to_owned());
        self
    }

    #[must_use]
    pub fn space_id(mut self, space_id: &str) -> Self {
        self.space_id = Some(space_id.to_owned());
        self
    }

    #[must_use]
    pub fn add_environment_attribute(mut self, key: &str, value: &str) -> Self {
        self.environment.push((key.to_owned(), value.to_owned()));
        self
    }

    #[must_use]
    pub fn build(self) -> RequestContext {
        RequestContext {
            request_id: self.request_id.unwrap_or_else(Uuid::new_v4),
            tenant_id: self.tenant_id.unwrap_or_default(),
            subject_id: self.subject_id.unwrap_or_default(),
            username: self.username,
            space_id: self.space_id,
            environment: self.environment,
        }
    }
}
