use crate::domain::account::services::InteractionHandle;
use crate::domain::shared::value_objects::RequestId;

/// Failures reported by the external linking or scanning engine.
/// `Failure` messages are passed through verbatim.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("engine.verification_needed")]
    VerificationNeeded { handle: Option<InteractionHandle> },
    #[error("engine.timeout")]
    Timeout,
    #[error("engine.callback_dropped")]
    CallbackDropped,
    #[error("{0}")]
    Failure(String),
}

impl EngineError {
    pub fn failure(message: impl Into<String>) -> Self {
        EngineError::Failure(message.into())
    }
}

/// Request level errors. Every variant except `Validation` and
/// `DuplicateRequest` ends up as the `onError` terminal event of the request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("capture.not_initialized")]
    NotInitialized,
    #[error("{0}")]
    Initialization(String),
    #[error("{0}")]
    Validation(String),
    #[error("request.duplicated: {0}")]
    DuplicateRequest(RequestId),
    #[error("{0}")]
    Link(String),
    #[error("account.verification_failed")]
    VerificationFailed,
    #[error("Account not found")]
    NotFound,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl CaptureError {
    /// Validation error for a required request field that was absent or blank.
    pub fn missing(field: &str, operation: &str) -> Self {
        CaptureError::Validation(format!("Provide {} in {} request", field, operation))
    }

    /// Error name exposed to callers next to the message.
    pub fn name(&self) -> &'static str {
        match self {
            CaptureError::NotInitialized | CaptureError::Initialization(_) => "InitializationError",
            CaptureError::Validation(_) => "ValidationError",
            CaptureError::DuplicateRequest(_) => "DuplicateRequestError",
            CaptureError::Link(_) => "LinkError",
            CaptureError::VerificationFailed => "VerificationFailed",
            CaptureError::NotFound => "NotFoundError",
            CaptureError::Engine(_) => "EngineError",
        }
    }
}
