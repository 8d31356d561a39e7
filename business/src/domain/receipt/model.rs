use serde::{Deserialize, Serialize};

use crate::domain::account::value_objects::RetailerId;

/// Raw recognition output of the engine, passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScanResult(pub serde_json::Value);

impl ScanResult {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Payload of an `onReceipt` event.
///
/// Camera scans only carry `scan`. Order fetches also carry the account
/// the orders came from, and a failed fetch carries `error` instead of `scan`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retailer: Option<RetailerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan: Option<ScanResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReceiptRecord {
    pub fn scanned(scan: ScanResult) -> Self {
        Self {
            retailer: None,
            username: None,
            scan: Some(scan),
            error: None,
        }
    }

    pub fn order(retailer: RetailerId, username: impl Into<String>, scan: ScanResult) -> Self {
        Self {
            retailer: Some(retailer),
            username: Some(username.into()),
            scan: Some(scan),
            error: None,
        }
    }

    pub fn order_failed(
        retailer: RetailerId,
        username: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            retailer: Some(retailer),
            username: Some(username.into()),
            scan: None,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
