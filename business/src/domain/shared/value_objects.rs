use serde::{Deserialize, Serialize};

use crate::domain::errors::CaptureError;

/// Caller supplied identifier of one logical operation.
/// Every event produced for that operation carries it back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Creates a RequestId without checking its contents.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a RequestId, rejecting blank identifiers.
    pub fn parse(id: impl Into<String>, operation: &'static str) -> Result<Self, CaptureError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CaptureError::missing("requestId", operation));
        }
        Ok(Self(id))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
