use std::sync::Arc;

use async_trait::async_trait;

use business::domain::account::model::{CredentialAccount, Credentials};
use business::domain::account::services::LinkingEngine;
use business::domain::account::value_objects::RetailerId;
use business::domain::errors::EngineError;
use business::domain::logger::Logger;
use business::domain::receipt::model::ScanResult;
use business::domain::session::model::{LicenseKeys, LinkingConfig};

use crate::completion::completion;
use crate::native::{NativeAccount, NativeLinkingClient};

/// Adapts a callback-style [`NativeLinkingClient`] to the [`LinkingEngine`]
/// port. Every native call becomes one future settled by whichever
/// continuation fires first.
pub struct CallbackLinkingEngine<C: NativeLinkingClient> {
    client: Arc<C>,
    logger: Arc<dyn Logger>,
}

impl<C: NativeLinkingClient> CallbackLinkingEngine<C> {
    pub fn new(client: Arc<C>, logger: Arc<dyn Logger>) -> Self {
        Self { client, logger }
    }

    fn to_native(account: &CredentialAccount) -> NativeAccount {
        NativeAccount {
            retailer_id: account.retailer.code(),
            username: account.username().to_string(),
            password: account.credentials.password().to_string(),
        }
    }

    fn from_native(&self, account: NativeAccount) -> Option<CredentialAccount> {
        match RetailerId::from_code(account.retailer_id) {
            Some(retailer) => Some(CredentialAccount::from_engine(
                retailer,
                Credentials::new(account.username, account.password),
            )),
            None => {
                self.logger.warn(&format!(
                    "Skipping linked account with unknown retailer code {}",
                    account.retailer_id
                ));
                None
            }
        }
    }
}

#[async_trait]
impl<C: NativeLinkingClient + 'static> LinkingEngine for CallbackLinkingEngine<C> {
    async fn initialize(
        &self,
        keys: &LicenseKeys,
        config: &LinkingConfig,
    ) -> Result<(), EngineError> {
        let (done, pending) = completion();
        let failed = done.clone();
        self.client.initialize(
            &keys.license_key,
            &keys.product_key,
            Box::new(move |()| {
                done.resolve(Ok(()));
            }),
            Box::new(move |exception| {
                failed.resolve(Err(exception.into()));
            }),
        );
        pending.settled().await?;

        self.client.configure(config);
        self.logger.debug(&format!(
            "Linking client configured for {} with a {} day window",
            config.country_code, config.day_cutoff
        ));
        Ok(())
    }

    async fn link(&self, account: &CredentialAccount) -> Result<(), EngineError> {
        let (done, pending) = completion();
        let failed = done.clone();
        self.client.link(
            Self::to_native(account),
            Box::new(move |_| {
                done.resolve(Ok(()));
            }),
            Box::new(move |exception| {
                failed.resolve(Err(exception.into()));
            }),
        );
        pending.settled().await
    }

    async fn unlink(&self, account: &CredentialAccount) -> Result<(), EngineError> {
        let (done, pending) = completion();
        let failed = done.clone();
        self.client.unlink(
            Self::to_native(account),
            Box::new(move |_| {
                done.resolve(Ok(()));
            }),
            Box::new(move |exception| {
                failed.resolve(Err(exception.into()));
            }),
        );
        pending.settled().await
    }

    async fn accounts(&self) -> Result<Vec<CredentialAccount>, EngineError> {
        let (done, pending) = completion();
        let failed = done.clone();
        self.client.accounts(
            Box::new(move |accounts| {
                done.resolve(Ok(accounts.unwrap_or_default()));
            }),
            Box::new(move |exception| {
                failed.resolve(Err(exception.into()));
            }),
        );
        let accounts = pending.settled().await?;

        Ok(accounts
            .into_iter()
            .filter_map(|account| self.from_native(account))
            .collect())
    }

    async fn verify(&self, retailer: RetailerId) -> Result<bool, EngineError> {
        let (done, pending) = completion();
        let failed = done.clone();
        let logger = self.logger.clone();
        self.client.verify(
            retailer.code(),
            Box::new(move |is_verified, session_id| {
                logger.debug(&format!(
                    "Verification session {} for {} answered {}",
                    session_id, retailer, is_verified
                ));
                done.resolve(Ok(is_verified));
            }),
            Box::new(move |exception| {
                failed.resolve(Err(exception.into()));
            }),
        );
        pending.settled().await
    }

    async fn orders(&self, retailer: RetailerId) -> Result<Option<ScanResult>, EngineError> {
        let (done, pending) = completion();
        let failed = done.clone();
        let logger = self.logger.clone();
        self.client.orders(
            retailer.code(),
            Box::new(move |_, results, remaining, session_id| {
                logger.debug(&format!(
                    "Order session {} for {} answered, {} remaining",
                    session_id, retailer, remaining
                ));
                done.resolve(Ok(results.map(ScanResult::new)));
            }),
            Box::new(move |_, exception| {
                failed.resolve(Err(exception.into()));
            }),
        );
        pending.settled().await
    }

    async fn reset_history(&self) -> Result<(), EngineError> {
        let (done, pending) = completion();
        let failed = done.clone();
        self.client.reset_history(
            Box::new(move |()| {
                done.resolve(Ok(()));
            }),
            Box::new(move |exception| {
                failed.resolve(Err(exception.into()));
            }),
        );
        pending.settled().await
    }
}
