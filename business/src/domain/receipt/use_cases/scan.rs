use async_trait::async_trait;

use crate::domain::errors::CaptureError;
use crate::domain::shared::value_objects::RequestId;

pub const DEFAULT_DAY_CUTOFF: u32 = 7;

pub struct ScanReceiptsParams {
    pub request_id: RequestId,
    pub day_cutoff: u32,
}

#[async_trait]
pub trait ScanReceiptsUseCase: Send + Sync {
    /// Returns how many receipts were emitted.
    async fn execute(&self, params: ScanReceiptsParams) -> Result<usize, CaptureError>;
}
