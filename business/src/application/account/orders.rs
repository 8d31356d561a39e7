use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;

use crate::application::account::verification::VerificationStateMachine;
use crate::application::request::correlator::RequestCorrelator;
use crate::domain::account::model::CredentialAccount;
use crate::domain::account::services::LinkingEngine;
use crate::domain::account::use_cases::orders::{
    FetchOrdersParams, FetchOrdersUseCase, OrdersSummary,
};
use crate::domain::errors::{CaptureError, EngineError};
use crate::domain::logger::Logger;
use crate::domain::receipt::model::ReceiptRecord;
use crate::domain::request::events::PluginEvent;
use crate::domain::shared::value_objects::RequestId;

const NO_ORDERS: &str = "no orders";

pub struct FetchOrdersUseCaseImpl {
    pub engine: Arc<dyn LinkingEngine>,
    pub verifier: Arc<VerificationStateMachine>,
    pub correlator: Arc<RequestCorrelator>,
    pub logger: Arc<dyn Logger>,
    pub engine_timeout: Duration,
}

impl FetchOrdersUseCaseImpl {
    /// Fetches one account's orders and reports the result as an `onReceipt`
    /// event. Returns whether the fetch produced orders.
    async fn fetch(&self, request_id: &RequestId, account: &CredentialAccount) -> bool {
        let result = tokio::time::timeout(self.engine_timeout, self.engine.orders(account.retailer))
            .await
            .unwrap_or(Err(EngineError::Timeout));

        let (record, fetched) = match result {
            Ok(Some(scan)) => (
                ReceiptRecord::order(account.retailer, account.username(), scan),
                true,
            ),
            Ok(None) => (
                ReceiptRecord::order_failed(account.retailer, account.username(), NO_ORDERS),
                false,
            ),
            Err(error) => {
                self.logger.warn(&format!(
                    "Order fetch for {} failed: {}",
                    account.retailer, error
                ));
                (
                    ReceiptRecord::order_failed(
                        account.retailer,
                        account.username(),
                        error.to_string(),
                    ),
                    false,
                )
            }
        };
        self.correlator
            .emit(request_id, PluginEvent::Receipt(record));
        fetched
    }
}

#[async_trait]
impl FetchOrdersUseCase for FetchOrdersUseCaseImpl {
    async fn execute(&self, params: FetchOrdersParams) -> Result<OrdersSummary, CaptureError> {
        let accounts = self.engine.accounts().await?;
        let records = self
            .verifier
            .verify_all(&params.request_id, &accounts, false)
            .await;

        let verified: Vec<&CredentialAccount> = accounts
            .iter()
            .zip(records.iter())
            .filter(|(_, record)| record.is_verified)
            .map(|(account, _)| account)
            .collect();
        self.logger.info(&format!(
            "Fetching orders for {} of {} accounts",
            verified.len(),
            accounts.len()
        ));

        let outcomes = join_all(
            verified
                .iter()
                .map(|account| self.fetch(&params.request_id, account)),
        )
        .await;

        let fetched = outcomes.iter().filter(|fetched| **fetched).count();
        Ok(OrdersSummary {
            verified_accounts: verified.len(),
            fetched,
            failed: outcomes.len() - fetched,
        })
    }
}
