use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::account::services::LinkingEngine;
use crate::domain::account::use_cases::flush::{FlushHistoryParams, FlushHistoryUseCase};
use crate::domain::errors::CaptureError;
use crate::domain::logger::Logger;

pub struct FlushHistoryUseCaseImpl {
    pub engine: Arc<dyn LinkingEngine>,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl FlushHistoryUseCase for FlushHistoryUseCaseImpl {
    async fn execute(&self, params: FlushHistoryParams) -> Result<(), CaptureError> {
        self.logger.info(&format!(
            "Resetting linking history for request {}",
            params.request_id
        ));

        self.engine.reset_history().await?;

        self.logger.info("Linking history reset");
        Ok(())
    }
}
