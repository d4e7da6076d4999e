//! Request and response shapes

use std::fmt;

use serde_json::{Map, Value};

use crate::lease::SecretLease;

/// Operation the host asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// GET
    Read,
    /// POST and PUT
    Update,
    /// Lease renewal callback
    Renew,
    /// Lease revocation callback
    Revoke,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Update => "update",
            Self::Renew => "renew",
            Self::Revoke => "revoke",
        })
    }
}

/// A request routed to the backend
#[derive(Debug, Clone)]
pub struct Request {
    /// Operation
    pub operation: Operation,
    /// Path relative to the mount
    pub path: String,
    /// Request fields
    pub data: Map<String, Value>,
    /// Lease being renewed or revoked
    pub secret: Option<SecretLease>,
}

impl Request {
    /// Read `path`
    pub fn read(path: impl Into<String>) -> Self {
        Self {
            operation: Operation::Read,
            path: path.into(),
            data: Map::new(),
            secret: None,
        }
    }

    /// Write `data` to `path`
    pub fn update(path: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            operation: Operation::Update,
            path: path.into(),
            data,
            secret: None,
        }
    }

    /// Renew callback for `lease`
    pub fn renew(lease: SecretLease) -> Self {
        Self {
            operation: Operation::Renew,
            path: String::new(),
            data: Map::new(),
            secret: Some(lease),
        }
    }

    /// Revoke callback for `lease`
    pub fn revoke(lease: SecretLease) -> Self {
        Self {
            operation: Operation::Revoke,
            path: String::new(),
            data: Map::new(),
            secret: Some(lease),
        }
    }
}

/// What the backend returns for a request
#[derive(Clone, Default, PartialEq)]
pub struct Response {
    /// Response fields
    pub data: Map<String, Value>,
    /// Lease to register (issue) or replace (renew)
    pub secret: Option<SecretLease>,
    error: Option<String>,
}

impl Response {
    /// Response carrying `data`
    pub fn data(data: Map<String, Value>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Error response with a user-visible message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Attach a lease
    pub fn with_secret(mut self, lease: SecretLease) -> Self {
        self.secret = Some(lease);
        self
    }

    /// Whether this is an error response
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The error message, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

// Field values may hold a password.
impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("keys", &self.data.keys().collect::<Vec<_>>())
            .field("secret", &self.secret)
            .field("error", &self.error)
            .finish()
    }
}
