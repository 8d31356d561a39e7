use async_trait::async_trait;

use crate::domain::errors::CaptureError;
use crate::domain::session::model::{LicenseKeys, LinkingConfig};

#[derive(Debug)]
pub struct InitializeParams {
    pub keys: LicenseKeys,
    pub config: LinkingConfig,
}

#[async_trait]
pub trait InitializeUseCase: Send + Sync {
    async fn execute(&self, params: InitializeParams) -> Result<(), CaptureError>;
}
