use std::sync::Arc;

use async_trait::async_trait;

use crate::application::account::verification::VerificationStateMachine;
use crate::application::request::correlator::RequestCorrelator;
use crate::domain::account::model::AccountRecord;
use crate::domain::account::services::LinkingEngine;
use crate::domain::account::use_cases::list::{ListAccountsParams, ListAccountsUseCase};
use crate::domain::errors::CaptureError;
use crate::domain::logger::Logger;
use crate::domain::request::events::PluginEvent;

pub struct ListAccountsUseCaseImpl {
    pub engine: Arc<dyn LinkingEngine>,
    pub verifier: Arc<VerificationStateMachine>,
    pub correlator: Arc<RequestCorrelator>,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl ListAccountsUseCase for ListAccountsUseCaseImpl {
    async fn execute(
        &self,
        params: ListAccountsParams,
    ) -> Result<Vec<AccountRecord>, CaptureError> {
        let accounts = self.engine.accounts().await?;
        self.logger.info(&format!(
            "Verifying {} linked accounts",
            accounts.len()
        ));

        let records = self
            .verifier
            .verify_all(&params.request_id, &accounts, false)
            .await;

        for record in &records {
            self.correlator
                .emit(&params.request_id, PluginEvent::Account(record.clone()));
        }

        let verified = records.iter().filter(|r| r.is_verified).count();
        self.logger.info(&format!(
            "{} of {} accounts verified",
            verified,
            records.len()
        ));
        Ok(records)
    }
}
