use time::OffsetDateTime;

/// Represents a cookie held by the jar.
/// Modeled after Chromium's `net::CanonicalCookie`.
///
/// `domain` never carries a leading dot; `host_only` records whether the
/// cookie was set without a `Domain` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub creation_time: OffsetDateTime,
    pub expiration_time: Option<OffsetDateTime>,
    pub secure: bool,
    pub http_only: bool,
    pub host_only: bool,
}

impl CanonicalCookie {
    /// Host-only session cookie on `/`.
    pub fn new(name: impl Into<String>, value: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: "/".to_string(),
            creation_time: OffsetDateTime::now_utc(),
            expiration_time: None,
            secure: false,
            http_only: false,
            host_only: true,
        }
    }

    /// Set an absolute expiry.
    pub fn expires_at(mut self, at: OffsetDateTime) -> Self {
        self.expiration_time = Some(at);
        self
    }

    pub fn is_expired(&self, current_time: OffsetDateTime) -> bool {
        match self.expiration_time {
            Some(expiry) => expiry <= current_time,
            None => false, // session cookie
        }
    }

    /// Whether this cookie occupies the same jar slot as (`name`, `path`).
    pub fn same_slot(&self, name: &str, path: &str) -> bool {
        self.name == name && self.path == path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn test_session_cookie_never_expires() {
        let c = CanonicalCookie::new("a", "1", "example.com");
        assert!(!c.is_expired(OffsetDateTime::now_utc() + Duration::days(3650)));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = OffsetDateTime::now_utc();
        let c = CanonicalCookie::new("a", "1", "example.com").expires_at(now);
        assert!(c.is_expired(now));
        assert!(!c.is_expired(now - Duration::seconds(1)));
    }

    #[test]
    fn test_same_slot_ignores_host_only() {
        let host = CanonicalCookie::new("a", "1", "example.com");
        let domain = CanonicalCookie {
            host_only: false,
            ..CanonicalCookie::new("a", "2", "example.com")
        };
        assert!(host.same_slot(&domain.name, &domain.path));
        assert!(!host.same_slot("a", "/shop"));
    }
}
