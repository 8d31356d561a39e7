//! Fakes shared by the unit tests of the use cases.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;

use crate::domain::account::model::{CredentialAccount, Credentials};
use crate::domain::account::services::{
    InteractionHandle, InteractionPresenter, InteractionResolution, LinkingEngine,
};
use crate::domain::account::value_objects::RetailerId;
use crate::domain::errors::EngineError;
use crate::domain::logger::{LogLevel, Logger};
use crate::domain::receipt::model::ScanResult;
use crate::domain::request::events::{EventEnvelope, EventSink};
use crate::domain::session::model::{LicenseKeys, LinkingConfig};
use crate::domain::shared::value_objects::RequestId;

mock! {
    pub Log {}

    impl Logger for Log {
        fn log(&self, level: LogLevel, message: &str);
    }
}

pub fn mock_logger() -> Arc<dyn Logger> {
    let mut logger = MockLog::new();
    logger.expect_log().returning(|_, _| ());
    Arc::new(logger)
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<EventEnvelope>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<EventEnvelope> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, request_id: &RequestId) -> Vec<EventEnvelope> {
        self.events()
            .into_iter()
            .filter(|e| &e.request_id == request_id)
            .collect()
    }

    pub fn terminal_count(&self, request_id: &RequestId) -> usize {
        self.events_for(request_id)
            .iter()
            .filter(|e| e.event_type.is_terminal())
            .count()
    }
}

impl EventSink for RecordingSink {
    fn send(&self, envelope: EventEnvelope) {
        self.events.lock().unwrap().push(envelope);
    }
}

type Scripted<T> = (Duration, Result<T, EngineError>);

/// Linking engine whose answers and latencies are scripted per retailer.
#[derive(Default)]
pub struct FakeLinkingEngine {
    accounts: Mutex<Vec<CredentialAccount>>,
    verify_script: Mutex<HashMap<RetailerId, VecDeque<Scripted<bool>>>>,
    order_script: HashMap<RetailerId, Scripted<Option<ScanResult>>>,
    link_error: Option<EngineError>,
    pub verify_calls: Mutex<Vec<RetailerId>>,
    pub order_calls: Mutex<Vec<RetailerId>>,
    pub unlinked: Mutex<Vec<CredentialAccount>>,
}

impl FakeLinkingEngine {
    pub fn with_account(self, retailer: RetailerId, username: &str) -> Self {
        self.accounts
            .lock()
            .unwrap()
            .push(CredentialAccount::from_engine(
                retailer,
                Credentials::new(username, "secret"),
            ));
        self
    }

    /// Queues one verify answer. The last queued answer repeats forever.
    pub fn verify_with(
        self,
        retailer: RetailerId,
        delay_ms: u64,
        result: Result<bool, EngineError>,
    ) -> Self {
        self.verify_script
            .lock()
            .unwrap()
            .entry(retailer)
            .or_default()
            .push_back((Duration::from_millis(delay_ms), result));
        self
    }

    pub fn orders_with(
        mut self,
        retailer: RetailerId,
        delay_ms: u64,
        result: Result<Option<ScanResult>, EngineError>,
    ) -> Self {
        self.order_script
            .insert(retailer, (Duration::from_millis(delay_ms), result));
        self
    }

    pub fn failing_link(mut self, error: EngineError) -> Self {
        self.link_error = Some(error);
        self
    }

    fn next_verify(&self, retailer: RetailerId) -> Scripted<bool> {
        let mut script = self.verify_script.lock().unwrap();
        match script.get_mut(&retailer) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or((Duration::ZERO, Ok(true))),
            None => (Duration::ZERO, Ok(true)),
        }
    }
}

#[async_trait]
impl LinkingEngine for FakeLinkingEngine {
    async fn initialize(
        &self,
        _keys: &LicenseKeys,
        _config: &LinkingConfig,
    ) -> Result<(), EngineError> {
        Ok(())
    }

    async fn link(&self, account: &CredentialAccount) -> Result<(), EngineError> {
        if let Some(error) = &self.link_error {
            return Err(error.clone());
        }
        let mut accounts = self.accounts.lock().unwrap();
        accounts.retain(|a| a.retailer != account.retailer);
        accounts.push(account.clone());
        Ok(())
    }

    async fn unlink(&self, account: &CredentialAccount) -> Result<(), EngineError> {
        self.accounts
            .lock()
            .unwrap()
            .retain(|a| !a.same_identity(account));
        self.unlinked.lock().unwrap().push(account.clone());
        Ok(())
    }

    async fn accounts(&self) -> Result<Vec<CredentialAccount>, EngineError> {
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn verify(&self, retailer: RetailerId) -> Result<bool, EngineError> {
        self.verify_calls.lock().unwrap().push(retailer);
        let (delay, result) = self.next_verify(retailer);
        tokio::time::sleep(delay).await;
        result
    }

    async fn orders(&self, retailer: RetailerId) -> Result<Option<ScanResult>, EngineError> {
        self.order_calls.lock().unwrap().push(retailer);
        let (delay, result) = self
            .order_script
            .get(&retailer)
            .cloned()
            .unwrap_or((Duration::ZERO, Ok(None)));
        tokio::time::sleep(delay).await;
        result
    }

    async fn reset_history(&self) -> Result<(), EngineError> {
        self.accounts.lock().unwrap().clear();
        Ok(())
    }
}

/// Presenter that answers every surface with the same resolution.
pub struct StaticPresenter {
    resolution: InteractionResolution,
    pub presented: Mutex<Vec<(RequestId, InteractionHandle)>>,
}

impl StaticPresenter {
    pub fn new(resolution: InteractionResolution) -> Self {
        Self {
            resolution,
            presented: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl InteractionPresenter for StaticPresenter {
    async fn present(
        &self,
        request_id: &RequestId,
        handle: InteractionHandle,
    ) -> InteractionResolution {
        self.presented
            .lock()
            .unwrap()
            .push((request_id.clone(), handle));
        self.resolution
    }
}

pub fn handle_for(retailer: RetailerId) -> InteractionHandle {
    InteractionHandle {
        id: format!("surface-{}", retailer),
        retailer,
        url: None,
    }
}
