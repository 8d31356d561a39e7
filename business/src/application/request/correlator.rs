use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::domain::errors::CaptureError;
use crate::domain::logger::Logger;
use crate::domain::request::events::{EventEnvelope, EventSink, PluginEvent};
use crate::domain::request::model::{RequestContext, RequestKind, RequestOutcome};
use crate::domain::shared::value_objects::RequestId;

/// Routes every event back to the request that caused it and guarantees a
/// single terminal event per request.
///
/// Emission and closing share one lock, so events of one request reach the
/// sink in emission order and nothing can slip out after the terminal event.
pub struct RequestCorrelator {
    sink: Arc<dyn EventSink>,
    logger: Arc<dyn Logger>,
    open: Mutex<HashMap<RequestId, RequestContext>>,
}

impl RequestCorrelator {
    pub fn new(sink: Arc<dyn EventSink>, logger: Arc<dyn Logger>) -> Self {
        Self {
            sink,
            logger,
            open: Mutex::new(HashMap::new()),
        }
    }

    fn contexts(&self) -> MutexGuard<'_, HashMap<RequestId, RequestContext>> {
        self.open
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(
        &self,
        request_id: RequestId,
        kind: RequestKind,
    ) -> Result<RequestContext, CaptureError> {
        let mut open = self.contexts();
        if open.contains_key(&request_id) {
            self.logger
                .warn(&format!("Request {} is already in flight", request_id));
            return Err(CaptureError::DuplicateRequest(request_id));
        }
        let context = RequestContext::new(request_id.clone(), kind);
        open.insert(request_id, context.clone());
        self.logger.debug(&format!(
            "Registered {} request {}",
            kind, context.request_id
        ));
        Ok(context)
    }

    /// Delivers a non-terminal event. Returns `false` when the request is not
    /// open anymore; such late events are dropped.
    pub fn emit(&self, request_id: &RequestId, event: PluginEvent) -> bool {
        let mut open = self.contexts();
        match open.get_mut(request_id) {
            Some(context) => {
                context.open_event_count += 1;
                self.sink
                    .send(EventEnvelope::event(request_id.clone(), event));
                true
            }
            None => {
                self.logger.warn(&format!(
                    "Dropping late event for closed request {}",
                    request_id
                ));
                false
            }
        }
    }

    /// Emits the terminal event and forgets the request. Closing twice is a no-op.
    pub fn close(&self, request_id: &RequestId, outcome: RequestOutcome) -> bool {
        let mut open = self.contexts();
        let Some(context) = open.remove(request_id) else {
            self.logger
                .debug(&format!("Request {} was already closed", request_id));
            return false;
        };

        let elapsed = Utc::now() - context.opened_at;
        let envelope = match outcome {
            RequestOutcome::Complete => {
                self.logger.info(&format!(
                    "{} request {} completed with {} events in {}ms",
                    context.kind,
                    request_id,
                    context.open_event_count,
                    elapsed.num_milliseconds()
                ));
                EventEnvelope::complete(request_id.clone())
            }
            RequestOutcome::Error(message) => {
                self.logger.warn(&format!(
                    "{} request {} failed after {} events: {}",
                    context.kind, request_id, context.open_event_count, message
                ));
                EventEnvelope::error(request_id.clone(), message)
            }
        };
        self.sink.send(envelope);
        true
    }

    pub fn is_open(&self, request_id: &RequestId) -> bool {
        self.contexts().contains_key(request_id)
    }

    pub fn open_requests(&self) -> Vec<RequestContext> {
        self.contexts().values().cloned().collect()
    }
}
