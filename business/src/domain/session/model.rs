use std::sync::RwLock;

use crate::domain::errors::CaptureError;

/// License material required by both native engines.
#[derive(Clone, PartialEq, Eq)]
pub struct LicenseKeys {
    pub license_key: String,
    pub product_key: String,
}

impl LicenseKeys {
    pub fn new(
        license_key: impl Into<String>,
        product_key: impl Into<String>,
    ) -> Result<Self, CaptureError> {
        let license_key = license_key.into();
        let product_key = product_key.into();
        if license_key.trim().is_empty() {
            return Err(CaptureError::missing("licenseKey", "initialize"));
        }
        if product_key.trim().is_empty() {
            return Err(CaptureError::missing("productKey", "initialize"));
        }
        Ok(Self {
            license_key,
            product_key,
        })
    }
}

impl std::fmt::Debug for LicenseKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicenseKeys")
            .field("license_key", &"<redacted>")
            .field("product_key", &"<redacted>")
            .finish()
    }
}

/// Settings applied once to the linking client when the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkingConfig {
    pub day_cutoff: u32,
    pub latest_orders_only: bool,
    pub country_code: String,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            day_cutoff: 15,
            latest_orders_only: false,
            country_code: "US".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Failed(String),
}

/// Shared view of whether the engines were initialized successfully.
/// A failed initialization blocks every operation until the next attempt.
#[derive(Debug)]
pub struct SessionStatus {
    state: RwLock<SessionState>,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self {
            state: RwLock::new(SessionState::Uninitialized),
        }
    }
}

impl SessionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        match self.state.read() {
            Ok(state) => state.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, next: SessionState) {
        match self.state.write() {
            Ok(mut state) => *state = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    pub fn ensure_ready(&self) -> Result<(), CaptureError> {
        match self.state() {
            SessionState::Ready => Ok(()),
            SessionState::Uninitialized => Err(CaptureError::NotInitialized),
            SessionState::Failed(message) => Err(CaptureError::Initialization(message)),
        }
    }
}
