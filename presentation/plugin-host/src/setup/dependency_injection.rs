use std::sync::Arc;

use linking::fixture::EngineFixture;
use linking::linking_engine::CallbackLinkingEngine;
use linking::scanning_engine::CallbackScanningEngine;
use linking::scripted::{ScriptedLinkingClient, ScriptedScanner};
use logger::TracingLogger;

use business::application::account::flush::FlushHistoryUseCaseImpl;
use business::application::account::list::ListAccountsUseCaseImpl;
use business::application::account::login::LoginUseCaseImpl;
use business::application::account::orders::FetchOrdersUseCaseImpl;
use business::application::account::remove::RemoveAccountUseCaseImpl;
use business::application::account::verification::VerificationStateMachine;
use business::application::orchestrator::LinkingOrchestrator;
use business::application::receipt::scan::ScanReceiptsUseCaseImpl;
use business::application::request::correlator::RequestCorrelator;
use business::application::session::initialize::InitializeUseCaseImpl;
use business::domain::account::services::LinkingEngine;
use business::domain::logger::Logger;
use business::domain::receipt::services::ScanningEngine;
use business::domain::session::model::SessionStatus;

use crate::api::events::ChannelEventSink;
use crate::api::interactions::PendingInteractions;
use crate::api::messages::Outbound;
use crate::config::engine_config::EngineConfig;

pub struct DependencyContainer {
    pub orchestrator: Arc<LinkingOrchestrator>,
    pub interactions: Arc<PendingInteractions>,
}

impl DependencyContainer {
    pub async fn new(config: &EngineConfig, outbound: Outbound) -> anyhow::Result<Self> {
        let fixture = match &config.fixture_path {
            Some(path) => {
                tracing::info!("Loading engine fixture from {}", path.display());
                EngineFixture::load(path).await?
            }
            None => EngineFixture::default(),
        };
        Ok(Self::with_fixture(config, fixture, outbound))
    }

    pub fn with_fixture(config: &EngineConfig, fixture: EngineFixture, outbound: Outbound) -> Self {
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
        let fixture = Arc::new(fixture);

        // Infrastructure adapters
        let linking_engine: Arc<dyn LinkingEngine> = Arc::new(CallbackLinkingEngine::new(
            Arc::new(ScriptedLinkingClient::new(fixture.clone())),
            logger.clone(),
        ));
        let scanning_engine: Arc<dyn ScanningEngine> = Arc::new(CallbackScanningEngine::new(
            Arc::new(ScriptedScanner::new(fixture)),
            logger.clone(),
        ));

        // Caller boundary
        let interactions = Arc::new(PendingInteractions::new(
            outbound.clone(),
            config.interaction_timeout,
        ));
        let correlator = Arc::new(RequestCorrelator::new(
            Arc::new(ChannelEventSink::new(outbound)),
            logger.clone(),
        ));
        let session = Arc::new(SessionStatus::new());
        let verifier = Arc::new(VerificationStateMachine {
            engine: linking_engine.clone(),
            presenter: interactions.clone(),
            logger: logger.clone(),
            engine_timeout: config.engine_timeout,
        });

        // Use cases
        let initialize_use_case = Arc::new(InitializeUseCaseImpl {
            linking: linking_engine.clone(),
            scanner: scanning_engine.clone(),
            session: session.clone(),
            logger: logger.clone(),
        });
        let login_use_case = Arc::new(LoginUseCaseImpl {
            engine: linking_engine.clone(),
            verifier: verifier.clone(),
            correlator: correlator.clone(),
            logger: logger.clone(),
        });
        let remove_use_case = Arc::new(RemoveAccountUseCaseImpl {
            engine: linking_engine.clone(),
            correlator: correlator.clone(),
            logger: logger.clone(),
        });
        let list_accounts_use_case = Arc::new(ListAccountsUseCaseImpl {
            engine: linking_engine.clone(),
            verifier: verifier.clone(),
            correlator: correlator.clone(),
            logger: logger.clone(),
        });
        let fetch_orders_use_case = Arc::new(FetchOrdersUseCaseImpl {
            engine: linking_engine.clone(),
            verifier,
            correlator: correlator.clone(),
            logger: logger.clone(),
            engine_timeout: config.engine_timeout,
        });
        let flush_use_case = Arc::new(FlushHistoryUseCaseImpl {
            engine: linking_engine,
            logger: logger.clone(),
        });
        let scan_use_case = Arc::new(ScanReceiptsUseCaseImpl {
            scanner: scanning_engine,
            correlator: correlator.clone(),
            logger: logger.clone(),
        });

        let orchestrator = Arc::new(LinkingOrchestrator {
            initialize_use_case,
            login_use_case,
            remove_use_case,
            list_accounts_use_case,
            fetch_orders_use_case,
            flush_use_case,
            scan_use_case,
            correlator,
            session,
            logger,
        });

        Self {
            orchestrator,
            interactions,
        }
    }
}
