//! Who is making the request
//!
//! Authentication happens upstream (a reverse proxy or the host
//! application); this service only reads the identity it was handed.

use crate::config::DEFAULT_USER_HEADER;
use crate::core::UserId;
use axum::http::{HeaderMap, HeaderName};

/// Resolves the authenticated user of a request
pub trait IdentityProvider: Send + Sync {
    fn identify(&self, headers: &HeaderMap) -> Option<UserId>;
}

/// Reads a numeric user id from a trusted request header
#[derive(Debug, Clone)]
pub struct HeaderIdentity {
    header: HeaderName,
}

impl HeaderIdentity {
    pub const fn new(header: HeaderName) -> Self {
        Self { header }
    }

    /// Build from a configured header name, falling back to the default
    /// when the name is not a valid header
    pub fn from_name(name: &str) -> Self {
        let header = HeaderName::try_from(name.trim().to_ascii_lowercase())
            .unwrap_or_else(|_| HeaderName::from_static(DEFAULT_USER_HEADER));
        Self { header }
    }

    pub const fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl Default for HeaderIdentity {
    fn default() -> Self {
        Self::new(HeaderName::from_static(DEFAULT_USER_HEADER))
    }
}

impl IdentityProvider for HeaderIdentity {
    fn identify(&self, headers: &HeaderMap) -> Option<UserId> {
        headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }
}
