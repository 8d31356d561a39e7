use business::domain::account::services::InteractionHandle;
use business::domain::errors::EngineError;
use business::domain::session::model::LinkingConfig;
use serde_json::Value;

/// Exception code the linking engine uses when the retailer asks the user
/// to confirm the login on an interactive surface.
pub const VERIFICATION_NEEDED: i32 = 1001;
pub const INVALID_CREDENTIALS: i32 = 1002;
pub const INTERNAL_ERROR: i32 = 1000;

/// Failure payload handed to every linking failure continuation.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountLinkingException {
    pub code: i32,
    pub message: String,
    /// Present when the engine can show a surface to resolve the failure.
    pub view: Option<InteractionHandle>,
}

impl AccountLinkingException {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            view: None,
        }
    }

    pub fn verification_needed(view: Option<InteractionHandle>) -> Self {
        Self {
            code: VERIFICATION_NEEDED,
            message: "Verification needed".to_string(),
            view,
        }
    }
}

impl From<AccountLinkingException> for EngineError {
    fn from(exception: AccountLinkingException) -> Self {
        match exception.code {
            VERIFICATION_NEEDED => EngineError::VerificationNeeded {
                handle: exception.view,
            },
            _ => EngineError::Failure(exception.message),
        }
    }
}

/// Account as the native client stores it, retailer encoded by its int code.
#[derive(Clone, PartialEq, Eq)]
pub struct NativeAccount {
    pub retailer_id: i32,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for NativeAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeAccount")
            .field("retailer_id", &self.retailer_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

pub type OnSuccess<T> = Box<dyn FnOnce(T) + Send + 'static>;
pub type OnFailure = Box<dyn FnOnce(AccountLinkingException) + Send + 'static>;
/// `(isVerified, sessionId)`
pub type OnVerified = Box<dyn FnOnce(bool, String) + Send + 'static>;
/// `(retailerId, results, remaining, sessionId)`
pub type OnOrders = Box<dyn FnOnce(i32, Option<Value>, i32, String) + Send + 'static>;
/// `(retailerId, exception)`
pub type OnOrdersFailure = Box<dyn FnOnce(i32, AccountLinkingException) + Send + 'static>;

/// Callback-style linking client as exposed by the vendor engine.
///
/// Each call answers through exactly one of its continuations, from any
/// thread. A continuation may also be dropped without being called.
pub trait NativeLinkingClient: Send + Sync {
    fn initialize(
        &self,
        license_key: &str,
        product_key: &str,
        on_success: OnSuccess<()>,
        on_failure: OnFailure,
    );

    /// Synchronous setters applied once after initialization.
    fn configure(&self, config: &LinkingConfig);

    fn link(&self, account: NativeAccount, on_success: OnSuccess<bool>, on_failure: OnFailure);

    fn unlink(&self, account: NativeAccount, on_success: OnSuccess<bool>, on_failure: OnFailure);

    /// `None` when nothing was ever linked.
    fn accounts(&self, on_success: OnSuccess<Option<Vec<NativeAccount>>>, on_failure: OnFailure);

    fn verify(&self, retailer_id: i32, on_success: OnVerified, on_failure: OnFailure);

    fn orders(&self, retailer_id: i32, on_success: OnOrders, on_failure: OnOrdersFailure);

    fn reset_history(&self, on_success: OnSuccess<()>, on_failure: OnFailure);
}

pub type OnReceipt = Box<dyn Fn(Value) + Send + Sync + 'static>;
pub type OnScanError = Box<dyn FnOnce(String) + Send + 'static>;

/// Callback-style scanning client. `on_receipt` fires once per recognized
/// receipt, then either `on_complete` or `on_error` ends the session.
pub trait NativeScanner: Send + Sync {
    fn initialize(
        &self,
        license_key: &str,
        product_key: &str,
        on_success: OnSuccess<()>,
        on_failure: OnScanError,
    );

    fn scan(
        &self,
        day_cutoff: u32,
        on_receipt: OnReceipt,
        on_complete: OnSuccess<()>,
        on_error: OnScanError,
    );
}
