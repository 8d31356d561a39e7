use async_trait::async_trait;

use crate::domain::account::model::{AccountRecord, CredentialAccount};
use crate::domain::errors::CaptureError;
use crate::domain::shared::value_objects::RequestId;

pub struct LoginParams {
    pub request_id: RequestId,
    pub account: CredentialAccount,
}

#[async_trait]
pub trait LoginUseCase: Send + Sync {
    async fn execute(&self, params: LoginParams) -> Result<AccountRecord, CaptureError>;
}
