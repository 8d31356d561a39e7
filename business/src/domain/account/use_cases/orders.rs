use async_trait::async_trait;

use crate::domain::errors::CaptureError;
use crate::domain::shared::value_objects::RequestId;

pub struct FetchOrdersParams {
    pub request_id: RequestId,
}

/// Tally of one orders request, once every verified account settled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdersSummary {
    pub verified_accounts: usize,
    pub fetched: usize,
    pub failed: usize,
}

#[async_trait]
pub trait FetchOrdersUseCase: Send + Sync {
    async fn execute(&self, params: FetchOrdersParams) -> Result<OrdersSummary, CaptureError>;
}
