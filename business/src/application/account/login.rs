use std::sync::Arc;

use async_trait::async_trait;

use crate::application::account::verification::VerificationStateMachine;
use crate::application::request::correlator::RequestCorrelator;
use crate::domain::account::model::AccountRecord;
use crate::domain::account::services::LinkingEngine;
use crate::domain::account::use_cases::login::{LoginParams, LoginUseCase};
use crate::domain::errors::CaptureError;
use crate::domain::logger::Logger;
use crate::domain::request::events::PluginEvent;

pub struct LoginUseCaseImpl {
    pub engine: Arc<dyn LinkingEngine>,
    pub verifier: Arc<VerificationStateMachine>,
    pub correlator: Arc<RequestCorrelator>,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl LoginUseCase for LoginUseCaseImpl {
    async fn execute(&self, params: LoginParams) -> Result<AccountRecord, CaptureError> {
        let LoginParams {
            request_id,
            account,
        } = params;
        self.logger
            .info(&format!("Linking {} account", account.retailer));

        self.engine
            .link(&account)
            .await
            .map_err(|e| CaptureError::Link(e.to_string()))?;

        let outcome = self.verifier.verify(&request_id, &account, true).await;
        let record = AccountRecord::new(&account, outcome.state);
        self.correlator
            .emit(&request_id, PluginEvent::Account(record.clone()));

        if !record.is_verified {
            self.logger.warn(&format!(
                "{} account linked but could not be verified",
                account.retailer
            ));
            return Err(CaptureError::VerificationFailed);
        }

        self.logger
            .info(&format!("{} account linked and verified", account.retailer));
        Ok(record)
    }
}
