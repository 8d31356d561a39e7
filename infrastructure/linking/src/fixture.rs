use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use business::domain::account::value_objects::RetailerId;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Cannot read engine fixture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid engine fixture: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How the scripted engine answers `verify` for a retailer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptedVerification {
    #[default]
    Verified,
    Unverified,
    /// Asks for an interactive surface once, then verifies.
    Interactive,
    /// Never answers.
    Hang,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureAccount {
    pub retailer: RetailerId,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailerScript {
    pub retailer: RetailerId,
    #[serde(default)]
    pub verification: ScriptedVerification,
    #[serde(default)]
    pub orders: Option<Value>,
    #[serde(default)]
    pub order_error: Option<String>,
    #[serde(default)]
    pub link_error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureReceipt {
    pub age_days: u32,
    pub result: Value,
}

/// Behaviour of the scripted native engines.
///
/// ```json
/// {
///   "latencyMs": 50,
///   "accounts": [{ "retailer": "amazon", "username": "a@b.c", "password": "pw" }],
///   "retailers": [{ "retailer": "amazon", "verification": "interactive", "orders": [] }],
///   "receipts": [{ "ageDays": 2, "result": { "merchant": "Acme" } }]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineFixture {
    pub latency_ms: u64,
    /// Accepted license keys; empty accepts any key.
    pub license_keys: Vec<String>,
    /// Accounts already linked when the engine starts.
    pub accounts: Vec<FixtureAccount>,
    pub retailers: Vec<RetailerScript>,
    pub receipts: Vec<FixtureReceipt>,
    pub scan_error: Option<String>,
}

impl EngineFixture {
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FixtureError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json(&json)
    }

    pub fn accepts_license(&self, license_key: &str) -> bool {
        self.license_keys.is_empty() || self.license_keys.iter().any(|key| key == license_key)
    }

    pub fn script_for(&self, retailer: RetailerId) -> Option<&RetailerScript> {
        self.retailers
            .iter()
            .find(|script| script.retailer == retailer)
    }
}
