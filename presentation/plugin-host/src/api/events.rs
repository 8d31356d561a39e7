use business::domain::request::events::{EventEnvelope, EventSink};

use crate::api::messages::{HostMessage, Outbound};

/// Forwards correlated events to the stdout writer.
pub struct ChannelEventSink {
    outbound: Outbound,
}

impl ChannelEventSink {
    pub fn new(outbound: Outbound) -> Self {
        Self { outbound }
    }
}

impl EventSink for ChannelEventSink {
    fn send(&self, envelope: EventEnvelope) {
        if self.outbound.send(HostMessage::Event(envelope)).is_err() {
            tracing::warn!("Output closed, dropping event");
        }
    }
}
