use async_trait::async_trait;

use crate::domain::account::model::AccountRecord;
use crate::domain::account::value_objects::RetailerId;
use crate::domain::errors::CaptureError;
use crate::domain::shared::value_objects::RequestId;

pub struct RemoveAccountParams {
    pub request_id: RequestId,
    pub retailer: RetailerId,
    /// Emit the unlinked account as `onAccount` before closing.
    pub report_account: bool,
}

#[async_trait]
pub trait RemoveAccountUseCase: Send + Sync {
    async fn execute(&self, params: RemoveAccountParams) -> Result<AccountRecord, CaptureError>;
}
