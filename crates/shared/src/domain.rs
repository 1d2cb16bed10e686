use std::fmt;

use serde::{Deserialize, Serialize};

/// Quota bucket shared by every client that arrives without an origin hint.
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Rate-limit key derived from the client's network-origin hint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientIdentity(pub String);

impl ClientIdentity {
    /// Takes the first entry of a forwarded-for style header value. A missing
    /// or blank hint falls into the shared [`UNKNOWN_IDENTITY`] bucket.
    pub fn from_forwarded_for(header: Option<&str>) -> Self {
        let first = header
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty());
        match first {
            Some(value) => Self(value.to_string()),
            None => Self::unknown(),
        }
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_IDENTITY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single "request to join" submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoinRequest {
    pub email: String,
    pub instagram_handle: Option<String>,
    pub reason: Option<String>,
}

impl JoinRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }
}
