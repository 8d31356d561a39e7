use std::sync::Arc;

use async_trait::async_trait;

use crate::application::request::correlator::RequestCorrelator;
use crate::domain::account::model::AccountRecord;
use crate::domain::account::services::LinkingEngine;
use crate::domain::account::use_cases::remove::{RemoveAccountParams, RemoveAccountUseCase};
use crate::domain::account::value_objects::VerificationState;
use crate::domain::errors::CaptureError;
use crate::domain::logger::Logger;
use crate::domain::request::events::PluginEvent;

pub struct RemoveAccountUseCaseImpl {
    pub engine: Arc<dyn LinkingEngine>,
    pub correlator: Arc<RequestCorrelator>,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl RemoveAccountUseCase for RemoveAccountUseCaseImpl {
    async fn execute(&self, params: RemoveAccountParams) -> Result<AccountRecord, CaptureError> {
        self.logger
            .info(&format!("Removing {} account", params.retailer));

        let accounts = self.engine.accounts().await?;
        let account = accounts
            .into_iter()
            .find(|a| a.retailer == params.retailer)
            .ok_or(CaptureError::NotFound)?;

        self.engine.unlink(&account).await?;

        let record = AccountRecord::new(&account, VerificationState::Unverified);
        if params.report_account {
            self.correlator
                .emit(&params.request_id, PluginEvent::Account(record.clone()));
        }

        self.logger
            .info(&format!("{} account unlinked", params.retailer));
        Ok(record)
    }
}
