use std::sync::Arc;

use async_trait::async_trait;

use crate::application::request::correlator::RequestCorrelator;
use crate::domain::errors::CaptureError;
use crate::domain::logger::Logger;
use crate::domain::receipt::model::ReceiptRecord;
use crate::domain::receipt::services::ScanningEngine;
use crate::domain::receipt::use_cases::scan::{ScanReceiptsParams, ScanReceiptsUseCase};
use crate::domain::request::events::PluginEvent;

pub struct ScanReceiptsUseCaseImpl {
    pub scanner: Arc<dyn ScanningEngine>,
    pub correlator: Arc<RequestCorrelator>,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl ScanReceiptsUseCase for ScanReceiptsUseCaseImpl {
    async fn execute(&self, params: ScanReceiptsParams) -> Result<usize, CaptureError> {
        self.logger.info(&format!(
            "Scanning receipts from the last {} days",
            params.day_cutoff
        ));

        let mut stream = self.scanner.scan(params.day_cutoff).await?;
        let mut count = 0;
        while let Some(item) = stream.recv().await {
            let scan = item?;
            count += 1;
            self.correlator
                .emit(&params.request_id, PluginEvent::Receipt(ReceiptRecord::scanned(scan)));
        }

        self.logger
            .info(&format!("Receipt scan finished: {} receipts found", count));
        Ok(count)
    }
}
