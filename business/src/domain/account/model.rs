use serde::Serialize;

use super::services::InteractionHandle;
use super::value_objects::{RetailerId, VerificationState};
use crate::domain::errors::CaptureError;

/// Username/password pair handed to the linking engine.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A retailer or email account as known to the linking engine.
/// Identity is the `(retailer, username)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialAccount {
    pub retailer: RetailerId,
    pub credentials: Credentials,
}

impl CredentialAccount {
    pub fn new(
        retailer: RetailerId,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, CaptureError> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(CaptureError::missing("username", "login"));
        }
        if password.is_empty() {
            return Err(CaptureError::missing("password", "login"));
        }
        Ok(Self {
            retailer,
            credentials: Credentials::new(username, password),
        })
    }

    /// Constructor for accounts reported back by the engine (no validation).
    pub fn from_engine(retailer: RetailerId, credentials: Credentials) -> Self {
        Self {
            retailer,
            credentials,
        }
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    pub fn same_identity(&self, other: &CredentialAccount) -> bool {
        self.retailer == other.retailer && self.username() == other.username()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    pub state: VerificationState,
    /// Only set while `state` is `InteractionRequired`.
    pub interaction: Option<InteractionHandle>,
}

impl VerificationOutcome {
    pub fn settled(state: VerificationState) -> Self {
        Self {
            state,
            interaction: None,
        }
    }

    pub fn verified() -> Self {
        Self::settled(VerificationState::Verified)
    }

    pub fn failed() -> Self {
        Self::settled(VerificationState::Failed)
    }

    pub fn interaction_required(handle: InteractionHandle) -> Self {
        Self {
            state: VerificationState::InteractionRequired,
            interaction: Some(handle),
        }
    }

    pub fn is_verified(&self) -> bool {
        self.state == VerificationState::Verified
    }
}

/// Account as reported to the caller in `onAccount` events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub id: RetailerId,
    pub username: String,
    pub is_verified: bool,
    pub state: VerificationState,
}

impl AccountRecord {
    pub fn new(account: &CredentialAccount, state: VerificationState) -> Self {
        Self {
            id: account.retailer,
            username: account.username().to_string(),
            is_verified: state == VerificationState::Verified,
            state,
        }
    }
}
