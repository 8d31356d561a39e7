use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use crate::domain::account::model::{AccountRecord, CredentialAccount, VerificationOutcome};
use crate::domain::account::services::{
    InteractionPresenter, InteractionResolution, LinkingEngine,
};
use crate::domain::account::value_objects::VerificationState;
use crate::domain::errors::EngineError;
use crate::domain::logger::Logger;
use crate::domain::shared::value_objects::RequestId;

/// Drives one account through
/// `Unverified -> Pending -> {Verified, InteractionRequired, Failed}`.
///
/// Failures never escape as errors: they settle the account as `Failed`.
pub struct VerificationStateMachine {
    pub engine: Arc<dyn LinkingEngine>,
    pub presenter: Arc<dyn InteractionPresenter>,
    pub logger: Arc<dyn Logger>,
    pub engine_timeout: Duration,
}

impl VerificationStateMachine {
    fn advance(
        &self,
        account: &CredentialAccount,
        from: VerificationState,
        to: VerificationState,
    ) -> VerificationState {
        match from.transition(to) {
            Ok(next) => {
                self.logger.debug(&format!(
                    "Account {} verification {} -> {}",
                    account.retailer, from, next
                ));
                next
            }
            Err((from, to)) => {
                self.logger.error(&format!(
                    "Rejected verification transition {} -> {} for {}",
                    from, to, account.retailer
                ));
                VerificationState::Failed
            }
        }
    }

    async fn call_engine(&self, account: &CredentialAccount) -> Result<bool, EngineError> {
        tokio::time::timeout(self.engine_timeout, self.engine.verify(account.retailer))
            .await
            .unwrap_or(Err(EngineError::Timeout))
    }

    /// Runs a single engine verification from `Unverified`. Stops at
    /// `InteractionRequired` instead of suspending.
    pub async fn begin(
        &self,
        account: &CredentialAccount,
        allow_interactive: bool,
    ) -> VerificationOutcome {
        let pending = self.advance(
            account,
            VerificationState::Unverified,
            VerificationState::Pending,
        );

        match self.call_engine(account).await {
            Ok(true) => VerificationOutcome::settled(self.advance(
                account,
                pending,
                VerificationState::Verified,
            )),
            Ok(false) => VerificationOutcome::settled(self.advance(
                account,
                pending,
                VerificationState::Failed,
            )),
            Err(EngineError::VerificationNeeded {
                handle: Some(handle),
            }) if allow_interactive => {
                self.advance(account, pending, VerificationState::InteractionRequired);
                VerificationOutcome::interaction_required(handle)
            }
            Err(error) => {
                self.logger.warn(&format!(
                    "Verification of {} account failed: {}",
                    account.retailer, error
                ));
                VerificationOutcome::settled(self.advance(
                    account,
                    pending,
                    VerificationState::Failed,
                ))
            }
        }
    }

    /// Settles an account left in `InteractionRequired`. A completed
    /// interaction gets exactly one more verify call, never another surface.
    pub async fn resume(
        &self,
        account: &CredentialAccount,
        resolution: InteractionResolution,
    ) -> VerificationOutcome {
        let waiting = VerificationState::InteractionRequired;
        match resolution {
            InteractionResolution::Dismissed => {
                self.logger.info(&format!(
                    "Verification surface for {} dismissed",
                    account.retailer
                ));
                VerificationOutcome::settled(self.advance(
                    account,
                    waiting,
                    VerificationState::Failed,
                ))
            }
            InteractionResolution::Completed => {
                let pending = self.advance(account, waiting, VerificationState::Pending);
                let next = match self.call_engine(account).await {
                    Ok(true) => VerificationState::Verified,
                    Ok(false) => VerificationState::Failed,
                    Err(error) => {
                        self.logger.warn(&format!(
                            "Retried verification of {} failed: {}",
                            account.retailer, error
                        ));
                        VerificationState::Failed
                    }
                };
                VerificationOutcome::settled(self.advance(account, pending, next))
            }
        }
    }

    /// Full verification including the interactive branch. Suspends on the
    /// presenter until the surface is resolved.
    pub async fn verify(
        &self,
        request_id: &RequestId,
        account: &CredentialAccount,
        allow_interactive: bool,
    ) -> VerificationOutcome {
        let outcome = self.begin(account, allow_interactive).await;
        let Some(handle) = outcome.interaction else {
            return outcome;
        };

        self.logger.info(&format!(
            "Request {} needs user interaction to verify {}",
            request_id, account.retailer
        ));
        let resolution = self.presenter.present(request_id, handle).await;
        self.resume(account, resolution).await
    }

    /// Verifies every account concurrently and returns the records in the
    /// order the accounts were given, whatever order the branches finish in.
    pub async fn verify_all(
        &self,
        request_id: &RequestId,
        accounts: &[CredentialAccount],
        allow_interactive: bool,
    ) -> Vec<AccountRecord> {
        let branches = accounts.iter().map(|account| async move {
            let outcome = self.verify(request_id, account, allow_interactive).await;
            AccountRecord::new(account, outcome.state)
        });
        join_all(branches).await
    }
}
