use std::future::Future;
use std::sync::Arc;

use crate::application::request::correlator::RequestCorrelator;
use crate::domain::account::model::{AccountRecord, CredentialAccount};
use crate::domain::account::use_cases::flush::{FlushHistoryParams, FlushHistoryUseCase};
use crate::domain::account::use_cases::list::{ListAccountsParams, ListAccountsUseCase};
use crate::domain::account::use_cases::login::{LoginParams, LoginUseCase};
use crate::domain::account::use_cases::orders::{
    FetchOrdersParams, FetchOrdersUseCase, OrdersSummary,
};
use crate::domain::account::use_cases::remove::{RemoveAccountParams, RemoveAccountUseCase};
use crate::domain::account::value_objects::RetailerId;
use crate::domain::errors::CaptureError;
use crate::domain::logger::Logger;
use crate::domain::receipt::use_cases::scan::{ScanReceiptsParams, ScanReceiptsUseCase};
use crate::domain::request::model::{RequestKind, RequestOutcome};
use crate::domain::session::model::SessionStatus;
use crate::domain::session::use_cases::initialize::{InitializeParams, InitializeUseCase};
use crate::domain::shared::value_objects::RequestId;

/// Entry point used by the caller boundary.
///
/// Each correlated operation registers its request id, runs the matching
/// use case and closes the request with exactly one terminal event.
pub struct LinkingOrchestrator {
    pub initialize_use_case: Arc<dyn InitializeUseCase>,
    pub login_use_case: Arc<dyn LoginUseCase>,
    pub remove_use_case: Arc<dyn RemoveAccountUseCase>,
    pub list_accounts_use_case: Arc<dyn ListAccountsUseCase>,
    pub fetch_orders_use_case: Arc<dyn FetchOrdersUseCase>,
    pub flush_use_case: Arc<dyn FlushHistoryUseCase>,
    pub scan_use_case: Arc<dyn ScanReceiptsUseCase>,
    pub correlator: Arc<RequestCorrelator>,
    pub session: Arc<SessionStatus>,
    pub logger: Arc<dyn Logger>,
}

impl LinkingOrchestrator {
    async fn run<T, F>(
        &self,
        request_id: &RequestId,
        kind: RequestKind,
        operation: F,
    ) -> Result<T, CaptureError>
    where
        F: Future<Output = Result<T, CaptureError>>,
    {
        self.correlator.register(request_id.clone(), kind)?;

        let result = match self.session.ensure_ready() {
            Ok(()) => operation.await,
            Err(error) => Err(error),
        };

        let outcome = match &result {
            Ok(_) => RequestOutcome::Complete,
            Err(error) => RequestOutcome::Error(error.to_string()),
        };
        self.correlator.close(request_id, outcome);
        result
    }

    /// Not correlated: resolves or rejects once both engines answered.
    pub async fn initialize(&self, params: InitializeParams) -> Result<(), CaptureError> {
        self.initialize_use_case.execute(params).await
    }

    pub async fn login(
        &self,
        request_id: RequestId,
        account: CredentialAccount,
    ) -> Result<AccountRecord, CaptureError> {
        let params = LoginParams {
            request_id: request_id.clone(),
            account,
        };
        self.run(
            &request_id,
            RequestKind::Login,
            self.login_use_case.execute(params),
        )
        .await
    }

    pub async fn logout(
        &self,
        request_id: RequestId,
        retailer: RetailerId,
    ) -> Result<AccountRecord, CaptureError> {
        let params = RemoveAccountParams {
            request_id: request_id.clone(),
            retailer,
            report_account: false,
        };
        self.run(
            &request_id,
            RequestKind::Logout,
            self.remove_use_case.execute(params),
        )
        .await
    }

    pub async fn remove(
        &self,
        request_id: RequestId,
        retailer: RetailerId,
    ) -> Result<AccountRecord, CaptureError> {
        let params = RemoveAccountParams {
            request_id: request_id.clone(),
            retailer,
            report_account: true,
        };
        self.run(
            &request_id,
            RequestKind::Remove,
            self.remove_use_case.execute(params),
        )
        .await
    }

    pub async fn accounts(&self, request_id: RequestId) -> Result<Vec<AccountRecord>, CaptureError> {
        let params = ListAccountsParams {
            request_id: request_id.clone(),
        };
        self.run(
            &request_id,
            RequestKind::ListAccounts,
            self.list_accounts_use_case.execute(params),
        )
        .await
    }

    pub async fn orders(&self, request_id: RequestId) -> Result<OrdersSummary, CaptureError> {
        let params = FetchOrdersParams {
            request_id: request_id.clone(),
        };
        self.run(
            &request_id,
            RequestKind::Orders,
            self.fetch_orders_use_case.execute(params),
        )
        .await
    }

    pub async fn flush(&self, request_id: RequestId) -> Result<(), CaptureError> {
        let params = FlushHistoryParams {
            request_id: request_id.clone(),
        };
        self.run(
            &request_id,
            RequestKind::Flush,
            self.flush_use_case.execute(params),
        )
        .await
    }

    pub async fn scan(&self, request_id: RequestId, day_cutoff: u32) -> Result<usize, CaptureError> {
        let params = ScanReceiptsParams {
            request_id: request_id.clone(),
            day_cutoff,
        };
        self.run(
            &request_id,
            RequestKind::Scan,
            self.scan_use_case.execute(params),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::mpsc;

    use crate::application::account::flush::FlushHistoryUseCaseImpl;
    use crate::application::account::list::ListAccountsUseCaseImpl;
    use crate::application::account::login::LoginUseCaseImpl;
    use crate::application::account::orders::FetchOrdersUseCaseImpl;
    use crate::application::account::remove::RemoveAccountUseCaseImpl;
    use crate::application::account::verification::VerificationStateMachine;
    use crate::application::receipt::scan::ScanReceiptsUseCaseImpl;
    use crate::application::session::initialize::InitializeUseCaseImpl;
    use crate::domain::account::services::InteractionResolution;
    use crate::domain::errors::EngineError;
    use crate::domain::receipt::model::ScanResult;
    use crate::domain::receipt::services::{ScanStream, ScanningEngine};
    use crate::domain::request::events::{EventPayload, PluginEventType};
    use crate::domain::session::model::{LicenseKeys, LinkingConfig, SessionState};
    use crate::test_support::{
        FakeLinkingEngine, RecordingSink, StaticPresenter, handle_for, mock_logger,
    };

    struct ThreeReceipts;

    #[async_trait]
    impl ScanningEngine for ThreeReceipts {
        async fn initialize(&self, _keys: &LicenseKeys) -> Result<(), EngineError> {
            Ok(())
        }

        async fn scan(&self, _day_cutoff: u32) -> Result<ScanStream, EngineError> {
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(async move {
                for index in 0..3 {
                    let _ = tx.send(Ok(ScanResult::new(json!({"receipt": index}))));
                    tokio::task::yield_now().await;
                }
            });
            Ok(rx)
        }
    }

    fn orchestrator(
        engine: FakeLinkingEngine,
        resolution: InteractionResolution,
    ) -> (Arc<RecordingSink>, LinkingOrchestrator) {
        let sink = Arc::new(RecordingSink::default());
        let logger = mock_logger();
        let engine = Arc::new(engine);
        let scanner: Arc<dyn ScanningEngine> = Arc::new(ThreeReceipts);
        let session = Arc::new(SessionStatus::new());
        session.set(SessionState::Ready);
        let correlator = Arc::new(RequestCorrelator::new(sink.clone(), logger.clone()));
        let verifier = Arc::new(VerificationStateMachine {
            engine: engine.clone(),
            presenter: Arc::new(StaticPresenter::new(resolution)),
            logger: logger.clone(),
            engine_timeout: Duration::from_secs(30),
        });

        let orchestrator = LinkingOrchestrator {
            initialize_use_case: Arc::new(InitializeUseCaseImpl {
                linking: engine.clone(),
                scanner: scanner.clone(),
                session: session.clone(),
                logger: logger.clone(),
            }),
            login_use_case: Arc::new(LoginUseCaseImpl {
                engine: engine.clone(),
                verifier: verifier.clone(),
                correlator: correlator.clone(),
                logger: logger.clone(),
            }),
            remove_use_case: Arc::new(RemoveAccountUseCaseImpl {
                engine: engine.clone(),
                correlator: correlator.clone(),
                logger: logger.clone(),
            }),
            list_accounts_use_case: Arc::new(ListAccountsUseCaseImpl {
                engine: engine.clone(),
                verifier: verifier.clone(),
                correlator: correlator.clone(),
                logger: logger.clone(),
            }),
            fetch_orders_use_case: Arc::new(FetchOrdersUseCaseImpl {
                engine: engine.clone(),
                verifier,
                correlator: correlator.clone(),
                logger: logger.clone(),
                engine_timeout: Duration::from_secs(30),
            }),
            flush_use_case: Arc::new(FlushHistoryUseCaseImpl {
                engine: engine.clone(),
                logger: logger.clone(),
            }),
            scan_use_case: Arc::new(ScanReceiptsUseCaseImpl {
                scanner,
                correlator: correlator.clone(),
                logger: logger.clone(),
            }),
            correlator,
            session,
            logger,
        };
        (sink, orchestrator)
    }

    fn event_types(sink: &RecordingSink, request_id: &str) -> Vec<PluginEventType> {
        sink.events_for(&RequestId::new(request_id))
            .iter()
            .map(|e| e.event_type)
            .collect()
    }

    #[tokio::test]
    async fn should_complete_interactive_login() {
        let (sink, orchestrator) = orchestrator(
            FakeLinkingEngine::default()
                .verify_with(
                    RetailerId::Amazon,
                    0,
                    Err(EngineError::VerificationNeeded {
                        handle: Some(handle_for(RetailerId::Amazon)),
                    }),
                )
                .verify_with(RetailerId::Amazon, 0, Ok(true)),
            InteractionResolution::Completed,
        );
        let account = CredentialAccount::new(RetailerId::Amazon, "u", "p").unwrap();

        let record = orchestrator
            .login(RequestId::new("login-1"), account)
            .await
            .unwrap();

        assert!(record.is_verified);
        assert_eq!(record.id, RetailerId::Amazon);
        assert_eq!(
            event_types(&sink, "login-1"),
            vec![PluginEventType::OnAccount, PluginEventType::OnComplete]
        );
    }

    #[tokio::test]
    async fn should_close_with_error_when_login_link_fails() {
        let (sink, orchestrator) = orchestrator(
            FakeLinkingEngine::default().failing_link(EngineError::failure("network down")),
            InteractionResolution::Completed,
        );
        let account = CredentialAccount::new(RetailerId::Amazon, "u", "p").unwrap();

        let result = orchestrator.login(RequestId::new("login-2"), account).await;

        assert!(matches!(result, Err(CaptureError::Link(_))));
        let events = sink.events_for(&RequestId::new("login-2"));
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].payload,
            EventPayload::Error {
                message: "network down".to_string()
            }
        );
    }

    #[tokio::test]
    async fn should_scan_three_receipts_then_complete() {
        let (sink, orchestrator) =
            orchestrator(FakeLinkingEngine::default(), InteractionResolution::Completed);

        let count = orchestrator.scan(RequestId::new("r1"), 7).await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(
            event_types(&sink, "r1"),
            vec![
                PluginEventType::OnReceipt,
                PluginEventType::OnReceipt,
                PluginEventType::OnReceipt,
                PluginEventType::OnComplete,
            ]
        );
        assert!(!orchestrator.correlator.is_open(&RequestId::new("r1")));
    }

    #[tokio::test]
    async fn should_list_nothing_after_flush() {
        let (sink, orchestrator) = orchestrator(
            FakeLinkingEngine::default()
                .with_account(RetailerId::Amazon, "a")
                .with_account(RetailerId::Target, "t"),
            InteractionResolution::Completed,
        );

        let before = orchestrator.accounts(RequestId::new("list-1")).await.unwrap();
        orchestrator.flush(RequestId::new("flush-1")).await.unwrap();
        let after = orchestrator.accounts(RequestId::new("list-2")).await.unwrap();

        assert_eq!(before.len(), 2);
        assert!(after.is_empty());
        assert_eq!(
            event_types(&sink, "flush-1"),
            vec![PluginEventType::OnComplete]
        );
        assert_eq!(
            event_types(&sink, "list-2"),
            vec![PluginEventType::OnComplete]
        );
    }

    #[tokio::test]
    async fn should_logout_with_terminal_event_only() {
        let (sink, orchestrator) = orchestrator(
            FakeLinkingEngine::default().with_account(RetailerId::Amazon, "a"),
            InteractionResolution::Completed,
        );

        orchestrator
            .logout(RequestId::new("out-ok"), RetailerId::Amazon)
            .await
            .unwrap();

        assert_eq!(
            event_types(&sink, "out-ok"),
            vec![PluginEventType::OnComplete]
        );
    }

    #[tokio::test]
    async fn should_report_removed_account_before_completing() {
        let (sink, orchestrator) = orchestrator(
            FakeLinkingEngine::default().with_account(RetailerId::Amazon, "a"),
            InteractionResolution::Completed,
        );

        let record = orchestrator
            .remove(RequestId::new("rm-ok"), RetailerId::Amazon)
            .await
            .unwrap();

        assert!(!record.is_verified);
        assert_eq!(
            event_types(&sink, "rm-ok"),
            vec![PluginEventType::OnAccount, PluginEventType::OnComplete]
        );
    }

    #[tokio::test]
    async fn should_fail_logout_of_unknown_account_without_account_events() {
        let (sink, orchestrator) = orchestrator(
            FakeLinkingEngine::default().with_account(RetailerId::Amazon, "a"),
            InteractionResolution::Completed,
        );

        let result = orchestrator
            .logout(RequestId::new("out-1"), RetailerId::Walmart)
            .await;

        assert!(matches!(result, Err(CaptureError::NotFound)));
        assert_eq!(event_types(&sink, "out-1"), vec![PluginEventType::OnError]);
    }

    #[tokio::test]
    async fn should_reject_duplicate_request_without_closing_the_original() {
        let (sink, orchestrator) =
            orchestrator(FakeLinkingEngine::default(), InteractionResolution::Completed);
        let request_id = RequestId::new("dup");
        orchestrator
            .correlator
            .register(request_id.clone(), RequestKind::Scan)
            .unwrap();

        let result = orchestrator.flush(request_id.clone()).await;

        assert!(matches!(result, Err(CaptureError::DuplicateRequest(_))));
        assert!(orchestrator.correlator.is_open(&request_id));
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn should_close_with_error_when_session_not_initialized() {
        let (sink, orchestrator) =
            orchestrator(FakeLinkingEngine::default(), InteractionResolution::Completed);
        orchestrator.session.set(SessionState::Uninitialized);

        let result = orchestrator.accounts(RequestId::new("early")).await;

        assert!(matches!(result, Err(CaptureError::NotInitialized)));
        assert_eq!(event_types(&sink, "early"), vec![PluginEventType::OnError]);
    }

    #[tokio::test]
    async fn should_initialize_session() {
        let (_, orchestrator) =
            orchestrator(FakeLinkingEngine::default(), InteractionResolution::Completed);
        orchestrator.session.set(SessionState::Uninitialized);

        orchestrator
            .initialize(InitializeParams {
                keys: LicenseKeys::new("license", "product").unwrap(),
                config: LinkingConfig::default(),
            })
            .await
            .unwrap();

        assert_eq!(orchestrator.session.state(), SessionState::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_concurrent_requests_separate() {
        let (sink, orchestrator) = orchestrator(
            FakeLinkingEngine::default()
                .with_account(RetailerId::Amazon, "a")
                .with_account(RetailerId::Target, "t")
                .verify_with(RetailerId::Amazon, 40, Ok(true))
                .verify_with(RetailerId::Target, 10, Ok(false))
                .orders_with(
                    RetailerId::Amazon,
                    5,
                    Ok(Some(ScanResult::new(json!({"orders": 1})))),
                ),
            InteractionResolution::Completed,
        );

        let (accounts, orders, scan) = tokio::join!(
            orchestrator.accounts(RequestId::new("acc")),
            orchestrator.orders(RequestId::new("ord")),
            orchestrator.scan(RequestId::new("scn"), 7),
        );

        assert_eq!(accounts.unwrap().len(), 2);
        assert_eq!(orders.unwrap().fetched, 1);
        assert_eq!(scan.unwrap(), 3);
        assert_eq!(
            event_types(&sink, "acc"),
            vec![
                PluginEventType::OnAccount,
                PluginEventType::OnAccount,
                PluginEventType::OnComplete,
            ]
        );
        assert_eq!(
            event_types(&sink, "ord"),
            vec![PluginEventType::OnReceipt, PluginEventType::OnComplete]
        );
        for id in ["acc", "ord", "scn"] {
            assert_eq!(sink.terminal_count(&RequestId::new(id)), 1);
        }
    }
}
