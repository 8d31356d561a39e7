use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;

use business::domain::account::services::{
    InteractionHandle, InteractionPresenter, InteractionResolution,
};
use business::domain::errors::CaptureError;
use business::domain::shared::value_objects::RequestId;

use crate::api::messages::{HostMessage, Outbound};

/// Hands verification surfaces to the caller and waits for the matching
/// `resolveVerification`. An unanswered surface is dismissed after `timeout`.
pub struct PendingInteractions {
    outbound: Outbound,
    timeout: Duration,
    waiting: Mutex<HashMap<RequestId, oneshot::Sender<InteractionResolution>>>,
}

impl PendingInteractions {
    pub fn new(outbound: Outbound, timeout: Duration) -> Self {
        Self {
            outbound,
            timeout,
            waiting: Mutex::new(HashMap::new()),
        }
    }

    fn waiting(&self) -> MutexGuard<'_, HashMap<RequestId, oneshot::Sender<InteractionResolution>>> {
        self.waiting
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn resolve(
        &self,
        request_id: &RequestId,
        resolution: InteractionResolution,
    ) -> Result<(), CaptureError> {
        let no_pending = || {
            CaptureError::Validation(format!(
                "No verification pending for request {}",
                request_id
            ))
        };
        let sender = self.waiting().remove(request_id).ok_or_else(no_pending)?;
        // A surface that already timed out counts as dismissed.
        sender.send(resolution).map_err(|_| no_pending())
    }

    pub fn pending(&self) -> usize {
        self.waiting().len()
    }
}

#[async_trait]
impl InteractionPresenter for PendingInteractions {
    async fn present(
        &self,
        request_id: &RequestId,
        handle: InteractionHandle,
    ) -> InteractionResolution {
        let (sender, receiver) = oneshot::channel();
        self.waiting().insert(request_id.clone(), sender);
        tracing::info!(request_id = %request_id, retailer = %handle.retailer, "Verification surface requested");

        let message = HostMessage::Interaction {
            request_id: request_id.clone(),
            handle,
        };
        if self.outbound.send(message).is_err() {
            self.waiting().remove(request_id);
            return InteractionResolution::Dismissed;
        }

        let resolution = match tokio::time::timeout(self.timeout, receiver).await {
            Ok(Ok(resolution)) => resolution,
            Ok(Err(_)) => InteractionResolution::Dismissed,
            Err(_) => {
                self.waiting().remove(request_id);
                tracing::warn!(request_id = %request_id, "Verification surface timed out");
                InteractionResolution::Dismissed
            }
        };
        self.waiting().remove(request_id);
        resolution
    }
}
