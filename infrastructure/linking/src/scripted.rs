use std::any::Any;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use business::domain::account::services::InteractionHandle;
use business::domain::account::value_objects::RetailerId;
use business::domain::session::model::LinkingConfig;

use crate::fixture::{EngineFixture, RetailerScript, ScriptedVerification};
use crate::native::{
    AccountLinkingException, INTERNAL_ERROR, INVALID_CREDENTIALS, NativeAccount,
    NativeLinkingClient, NativeScanner, OnFailure, OnOrders, OnOrdersFailure, OnReceipt,
    OnScanError, OnSuccess, OnVerified,
};

const INVALID_LICENSE: &str = "Invalid license key";
const NOT_LINKED: &str = "Account not linked";

/// Runs `deliver` on the runtime after the fixture latency, the way the
/// vendor engines answer from their own threads.
fn answer_later(latency: Duration, deliver: impl FnOnce() + Send + 'static) {
    tokio::spawn(async move {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        deliver();
    });
}

fn session_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Default)]
struct LinkingState {
    linked: Vec<NativeAccount>,
    /// Retailers that already showed their interactive surface.
    challenged: HashSet<i32>,
    config: Option<LinkingConfig>,
    /// Continuations of calls scripted to hang, kept alive so the caller
    /// sees a silent engine rather than a dropped callback.
    parked: Vec<Box<dyn Any + Send>>,
}

/// In-memory [`NativeLinkingClient`] driven by an [`EngineFixture`].
pub struct ScriptedLinkingClient {
    fixture: Arc<EngineFixture>,
    state: Mutex<LinkingState>,
}

impl ScriptedLinkingClient {
    pub fn new(fixture: Arc<EngineFixture>) -> Self {
        let linked = fixture
            .accounts
            .iter()
            .map(|account| NativeAccount {
                retailer_id: account.retailer.code(),
                username: account.username.clone(),
                password: account.password.clone(),
            })
            .collect();
        Self {
            fixture,
            state: Mutex::new(LinkingState {
                linked,
                ..LinkingState::default()
            }),
        }
    }

    fn latency(&self) -> Duration {
        Duration::from_millis(self.fixture.latency_ms)
    }

    fn state(&self) -> MutexGuard<'_, LinkingState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn script(&self, retailer_id: i32) -> Option<&RetailerScript> {
        RetailerId::from_code(retailer_id).and_then(|retailer| self.fixture.script_for(retailer))
    }

    fn is_linked(&self, retailer_id: i32) -> bool {
        self.state()
            .linked
            .iter()
            .any(|account| account.retailer_id == retailer_id)
    }

    /// Number of accounts currently linked.
    pub fn linked_count(&self) -> usize {
        self.state().linked.len()
    }

    pub fn config(&self) -> Option<LinkingConfig> {
        self.state().config.clone()
    }
}

impl NativeLinkingClient for ScriptedLinkingClient {
    fn initialize(
        &self,
        license_key: &str,
        _product_key: &str,
        on_success: OnSuccess<()>,
        on_failure: OnFailure,
    ) {
        let accepted = self.fixture.accepts_license(license_key);
        answer_later(self.latency(), move || {
            if accepted {
                on_success(())
            } else {
                on_failure(AccountLinkingException::new(INTERNAL_ERROR, INVALID_LICENSE))
            }
        });
    }

    fn configure(&self, config: &LinkingConfig) {
        self.state().config = Some(config.clone());
    }

    fn link(&self, account: NativeAccount, on_success: OnSuccess<bool>, on_failure: OnFailure) {
        if let Some(message) = self
            .script(account.retailer_id)
            .and_then(|script| script.link_error.clone())
        {
            answer_later(self.latency(), move || {
                on_failure(AccountLinkingException::new(INVALID_CREDENTIALS, message))
            });
            return;
        }

        {
            let mut state = self.state();
            state.linked.retain(|linked| {
                !(linked.retailer_id == account.retailer_id && linked.username == account.username)
            });
            state.challenged.remove(&account.retailer_id);
            state.linked.push(account);
        }
        answer_later(self.latency(), move || on_success(true));
    }

    fn unlink(&self, account: NativeAccount, on_success: OnSuccess<bool>, on_failure: OnFailure) {
        let removed = {
            let mut state = self.state();
            let before = state.linked.len();
            state.linked.retain(|linked| {
                !(linked.retailer_id == account.retailer_id && linked.username == account.username)
            });
            state.linked.len() < before
        };
        answer_later(self.latency(), move || {
            if removed {
                on_success(true)
            } else {
                on_failure(AccountLinkingException::new(INTERNAL_ERROR, NOT_LINKED))
            }
        });
    }

    fn accounts(&self, on_success: OnSuccess<Option<Vec<NativeAccount>>>, _on_failure: OnFailure) {
        let linked = self.state().linked.clone();
        let accounts = if linked.is_empty() { None } else { Some(linked) };
        answer_later(self.latency(), move || on_success(accounts));
    }

    fn verify(&self, retailer_id: i32, on_success: OnVerified, on_failure: OnFailure) {
        if !self.is_linked(retailer_id) {
            answer_later(self.latency(), move || {
                on_failure(AccountLinkingException::new(INTERNAL_ERROR, NOT_LINKED))
            });
            return;
        }

        let verification = self
            .script(retailer_id)
            .map(|script| script.verification)
            .unwrap_or_default();
        match verification {
            ScriptedVerification::Verified => {
                answer_later(self.latency(), move || on_success(true, session_id()))
            }
            ScriptedVerification::Unverified => {
                answer_later(self.latency(), move || on_success(false, session_id()))
            }
            ScriptedVerification::Interactive => {
                let first_time = self.state().challenged.insert(retailer_id);
                if !first_time {
                    answer_later(self.latency(), move || on_success(true, session_id()));
                    return;
                }
                let view = RetailerId::from_code(retailer_id).map(|retailer| InteractionHandle {
                    id: Uuid::new_v4().to_string(),
                    retailer,
                    url: None,
                });
                answer_later(self.latency(), move || {
                    on_failure(AccountLinkingException::verification_needed(view))
                });
            }
            ScriptedVerification::Hang => {
                let mut state = self.state();
                state.parked.push(Box::new(on_success));
                state.parked.push(Box::new(on_failure));
            }
        }
    }

    fn orders(&self, retailer_id: i32, on_success: OnOrders, on_failure: OnOrdersFailure) {
        let script = self.script(retailer_id).cloned();
        let latest_only = self
            .state()
            .config
            .as_ref()
            .is_some_and(|config| config.latest_orders_only);

        answer_later(self.latency(), move || {
            let Some(script) = script else {
                return on_success(retailer_id, None, 0, session_id());
            };
            if let Some(message) = script.order_error {
                return on_failure(
                    retailer_id,
                    AccountLinkingException::new(INTERNAL_ERROR, message),
                );
            }
            let orders = match script.orders {
                Some(Value::Array(mut orders)) if latest_only => {
                    orders.truncate(1);
                    Some(Value::Array(orders))
                }
                other => other,
            };
            on_success(retailer_id, orders, 0, session_id())
        });
    }

    fn reset_history(&self, on_success: OnSuccess<()>, _on_failure: OnFailure) {
        {
            let mut state = self.state();
            state.linked.clear();
            state.challenged.clear();
        }
        answer_later(self.latency(), move || on_success(()));
    }
}

/// In-memory [`NativeScanner`] replaying the fixture receipts.
pub struct ScriptedScanner {
    fixture: Arc<EngineFixture>,
}

impl ScriptedScanner {
    pub fn new(fixture: Arc<EngineFixture>) -> Self {
        Self { fixture }
    }
}

impl NativeScanner for ScriptedScanner {
    fn initialize(
        &self,
        license_key: &str,
        _product_key: &str,
        on_success: OnSuccess<()>,
        on_failure: OnScanError,
    ) {
        let accepted = self.fixture.accepts_license(license_key);
        answer_later(Duration::from_millis(self.fixture.latency_ms), move || {
            if accepted {
                on_success(())
            } else {
                on_failure(INVALID_LICENSE.to_string())
            }
        });
    }

    fn scan(
        &self,
        day_cutoff: u32,
        on_receipt: OnReceipt,
        on_complete: OnSuccess<()>,
        on_error: OnScanError,
    ) {
        let receipts: Vec<Value> = self
            .fixture
            .receipts
            .iter()
            .filter(|receipt| receipt.age_days <= day_cutoff)
            .map(|receipt| receipt.result.clone())
            .collect();
        let scan_error = self.fixture.scan_error.clone();
        let latency = Duration::from_millis(self.fixture.latency_ms);

        tokio::spawn(async move {
            for receipt in receipts {
                if !latency.is_zero() {
                    tokio::time::sleep(latency).await;
                }
                on_receipt(receipt);
            }
            match scan_error {
                Some(message) => on_error(message),
                None => on_complete(()),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use business::domain::account::model::CredentialAccount;
    use business::domain::account::services::LinkingEngine;
    use business::domain::errors::EngineError;
    use business::domain::logger::{LogLevel, Logger};
    use business::domain::receipt::model::ScanResult;
    use business::domain::receipt::services::ScanningEngine;
    use business::domain::session::model::LicenseKeys;

    use crate::linking_engine::CallbackLinkingEngine;
    use crate::scanning_engine::CallbackScanningEngine;

    struct Silent;

    impl Logger for Silent {
        fn log(&self, _level: LogLevel, _message: &str) {}
    }

    fn fixture() -> Arc<EngineFixture> {
        Arc::new(
            EngineFixture::from_json(
                r#"{
                    "licenseKeys": ["license"],
                    "accounts": [{ "retailer": "target", "username": "t@example.com", "password": "pw" }],
                    "retailers": [
                        { "retailer": "amazon", "verification": "interactive", "orders": [{ "id": 1 }, { "id": 2 }] },
                        { "retailer": "walmart", "verification": "unverified" },
                        { "retailer": "kroger", "orderError": "Retailer unavailable" },
                        { "retailer": "costco", "linkError": "Invalid credentials" },
                        { "retailer": "publix", "verification": "hang" }
                    ],
                    "receipts": [
                        { "ageDays": 1, "result": { "merchant": "A" } },
                        { "ageDays": 5, "result": { "merchant": "B" } },
                        { "ageDays": 20, "result": { "merchant": "C" } }
                    ]
                }"#,
            )
            .unwrap(),
        )
    }

    fn linking(
        fixture: Arc<EngineFixture>,
    ) -> (
        Arc<ScriptedLinkingClient>,
        CallbackLinkingEngine<ScriptedLinkingClient>,
    ) {
        let client = Arc::new(ScriptedLinkingClient::new(fixture));
        let engine = CallbackLinkingEngine::new(client.clone(), Arc::new(Silent));
        (client, engine)
    }

    fn account(retailer: RetailerId) -> CredentialAccount {
        CredentialAccount::new(retailer, "user@example.com", "secret").unwrap()
    }

    #[tokio::test]
    async fn should_reject_unknown_license_key() {
        let (_, engine) = linking(fixture());

        let result = engine
            .initialize(
                &LicenseKeys::new("other", "product").unwrap(),
                &LinkingConfig::default(),
            )
            .await;

        assert_eq!(result, Err(EngineError::Failure(INVALID_LICENSE.to_string())));
    }

    #[tokio::test]
    async fn should_store_configuration_after_initialization() {
        let (client, engine) = linking(fixture());
        let config = LinkingConfig {
            day_cutoff: 30,
            latest_orders_only: true,
            country_code: "CA".to_string(),
        };

        engine
            .initialize(&LicenseKeys::new("license", "product").unwrap(), &config)
            .await
            .unwrap();

        assert_eq!(client.config(), Some(config));
    }

    #[tokio::test]
    async fn should_list_preloaded_and_linked_accounts_in_link_order() {
        let (_, engine) = linking(fixture());

        engine.link(&account(RetailerId::Amazon)).await.unwrap();
        let accounts = engine.accounts().await.unwrap();

        let retailers: Vec<_> = accounts.iter().map(|account| account.retailer).collect();
        assert_eq!(retailers, vec![RetailerId::Target, RetailerId::Amazon]);
    }

    #[tokio::test]
    async fn should_fail_link_with_scripted_error() {
        let (client, engine) = linking(fixture());

        let result = engine.link(&account(RetailerId::Costco)).await;

        assert_eq!(
            result,
            Err(EngineError::Failure("Invalid credentials".to_string()))
        );
        assert_eq!(client.linked_count(), 1);
    }

    #[tokio::test]
    async fn should_ask_for_interaction_once_then_verify() {
        let (_, engine) = linking(fixture());
        engine.link(&account(RetailerId::Amazon)).await.unwrap();

        let first = engine.verify(RetailerId::Amazon).await;
        let second = engine.verify(RetailerId::Amazon).await;

        match first {
            Err(EngineError::VerificationNeeded { handle: Some(handle) }) => {
                assert_eq!(handle.retailer, RetailerId::Amazon);
                assert!(Uuid::parse_str(&handle.id).is_ok());
            }
            other => panic!("unexpected first verify: {:?}", other),
        }
        assert_eq!(second, Ok(true));
    }

    #[tokio::test]
    async fn should_answer_scripted_verification_results() {
        let (_, engine) = linking(fixture());
        engine.link(&account(RetailerId::Walmart)).await.unwrap();

        assert_eq!(engine.verify(RetailerId::Target).await, Ok(true));
        assert_eq!(engine.verify(RetailerId::Walmart).await, Ok(false));
        assert_eq!(
            engine.verify(RetailerId::BestBuy).await,
            Err(EngineError::Failure(NOT_LINKED.to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_never_answer_hanging_verification() {
        let (_, engine) = linking(fixture());
        engine.link(&account(RetailerId::Publix)).await.unwrap();

        let result =
            tokio::time::timeout(Duration::from_secs(60), engine.verify(RetailerId::Publix)).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn should_return_orders_and_scripted_order_failures() {
        let (_, engine) = linking(fixture());

        assert_eq!(
            engine.orders(RetailerId::Amazon).await,
            Ok(Some(ScanResult::new(json!([{ "id": 1 }, { "id": 2 }]))))
        );
        assert_eq!(
            engine.orders(RetailerId::Kroger).await,
            Err(EngineError::Failure("Retailer unavailable".to_string()))
        );
        assert_eq!(engine.orders(RetailerId::Target).await, Ok(None));
    }

    #[tokio::test]
    async fn should_keep_only_latest_order_when_configured() {
        let (_, engine) = linking(fixture());
        engine
            .initialize(
                &LicenseKeys::new("license", "product").unwrap(),
                &LinkingConfig {
                    latest_orders_only: true,
                    ..LinkingConfig::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(
            engine.orders(RetailerId::Amazon).await,
            Ok(Some(ScanResult::new(json!([{ "id": 1 }]))))
        );
    }

    #[tokio::test]
    async fn should_forget_accounts_after_reset_history() {
        let (_, engine) = linking(fixture());
        engine.link(&account(RetailerId::Amazon)).await.unwrap();

        engine.reset_history().await.unwrap();

        assert!(engine.accounts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_fail_unlink_of_unknown_account() {
        let (_, engine) = linking(fixture());

        assert_eq!(
            engine.unlink(&account(RetailerId::Amazon)).await,
            Err(EngineError::Failure(NOT_LINKED.to_string()))
        );
    }

    #[tokio::test]
    async fn should_scan_receipts_within_day_cutoff() {
        let scanner = CallbackScanningEngine::new(
            Arc::new(ScriptedScanner::new(fixture())),
            Arc::new(Silent),
        );

        let mut stream = scanner.scan(7).await.unwrap();
        let mut receipts = Vec::new();
        while let Some(item) = stream.recv().await {
            receipts.push(item.unwrap());
        }

        assert_eq!(
            receipts,
            vec![
                ScanResult::new(json!({ "merchant": "A" })),
                ScanResult::new(json!({ "merchant": "B" })),
            ]
        );
    }

    #[tokio::test]
    async fn should_end_scan_with_scripted_error() {
        let fixture = Arc::new(EngineFixture {
            scan_error: Some("camera closed".to_string()),
            ..EngineFixture::default()
        });
        let scanner =
            CallbackScanningEngine::new(Arc::new(ScriptedScanner::new(fixture)), Arc::new(Silent));

        let mut stream = scanner.scan(7).await.unwrap();

        assert_eq!(
            stream.recv().await,
            Some(Err(EngineError::Failure("camera closed".to_string())))
        );
        assert_eq!(stream.recv().await, None);
    }
}
