use async_trait::async_trait;
use tokio::sync::mpsc;

use super::model::ScanResult;
use crate::domain::errors::EngineError;
use crate::domain::session::model::LicenseKeys;

/// Receipts recognized by one scan session. The stream ends when the
/// engine signals completion; an `Err` item ends the session with a failure.
/// Unbounded because native engines push from callbacks that cannot wait.
pub type ScanStream = mpsc::UnboundedReceiver<Result<ScanResult, EngineError>>;

/// Service port for the external receipt scanning engine.
#[async_trait]
pub trait ScanningEngine: Send + Sync {
    async fn initialize(&self, keys: &LicenseKeys) -> Result<(), EngineError>;

    /// Starts a scan that excludes receipts older than `day_cutoff` days.
    async fn scan(&self, day_cutoff: u32) -> Result<ScanStream, EngineError>;
}
