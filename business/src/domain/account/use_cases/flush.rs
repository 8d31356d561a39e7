use async_trait::async_trait;

use crate::domain::errors::CaptureError;
use crate::domain::shared::value_objects::RequestId;

pub struct FlushHistoryParams {
    pub request_id: RequestId,
}

#[async_trait]
pub trait FlushHistoryUseCase: Send + Sync {
    async fn execute(&self, params: FlushHistoryParams) -> Result<(), CaptureError>;
}
