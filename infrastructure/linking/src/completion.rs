use std::sync::{Arc, Mutex};

use business::domain::errors::EngineError;
use tokio::sync::oneshot;

/// Settling side of a callback-backed future.
///
/// Clones share one slot, so the success and failure continuations of a
/// native call can each own a copy and only the first `resolve` counts.
pub struct Completion<T> {
    slot: Arc<Mutex<Option<oneshot::Sender<Result<T, EngineError>>>>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<T> Completion<T> {
    /// Returns `false` when the completion was already settled.
    pub fn resolve(&self, result: Result<T, EngineError>) -> bool {
        let sender = match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match sender {
            Some(sender) => {
                // The waiting side may be gone (timed out); nothing to do then.
                let _ = sender.send(result);
                true
            }
            None => false,
        }
    }
}

/// Awaiting side of a [`Completion`].
pub struct Pending<T> {
    receiver: oneshot::Receiver<Result<T, EngineError>>,
}

impl<T> Pending<T> {
    /// Waits for the first continuation. If every copy of the completion is
    /// dropped unresolved, the call ends with `CallbackDropped`.
    pub async fn settled(self) -> Result<T, EngineError> {
        self.receiver
            .await
            .unwrap_or(Err(EngineError::CallbackDropped))
    }
}

pub fn completion<T>() -> (Completion<T>, Pending<T>) {
    let (sender, receiver) = oneshot::channel();
    (
        Completion {
            slot: Arc::new(Mutex::new(Some(sender))),
        },
        Pending { receiver },
    )
}
