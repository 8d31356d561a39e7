use async_trait::async_trait;

use crate::domain::account::model::AccountRecord;
use crate::domain::errors::CaptureError;
use crate::domain::shared::value_objects::RequestId;

pub struct ListAccountsParams {
    pub request_id: RequestId,
}

#[async_trait]
pub trait ListAccountsUseCase: Send + Sync {
    async fn execute(&self, params: ListAccountsParams) -> Result<Vec<AccountRecord>, CaptureError>;
}
