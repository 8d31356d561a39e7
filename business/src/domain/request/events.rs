use serde::Serialize;

use crate::domain::account::model::AccountRecord;
use crate::domain::receipt::model::ReceiptRecord;
use crate::domain::shared::value_objects::RequestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PluginEventType {
    #[serde(rename = "onAccount")]
    OnAccount,
    #[serde(rename = "onReceipt")]
    OnReceipt,
    #[serde(rename = "onComplete")]
    OnComplete,
    #[serde(rename = "onError")]
    OnError,
}

impl PluginEventType {
    pub fn is_terminal(self) -> bool {
        matches!(self, PluginEventType::OnComplete | PluginEventType::OnError)
    }
}

/// Non-terminal events produced while a request is open.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginEvent {
    Account(AccountRecord),
    Receipt(ReceiptRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmptyPayload {}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    Account(AccountRecord),
    Receipt(ReceiptRecord),
    Error { message: String },
    Empty(EmptyPayload),
}

/// The single shape every event takes on its way out to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub request_id: RequestId,
    #[serde(rename = "type")]
    pub event_type: PluginEventType,
    pub payload: EventPayload,
}

impl EventEnvelope {
    pub fn event(request_id: RequestId, event: PluginEvent) -> Self {
        let (event_type, payload) = match event {
            PluginEvent::Account(account) => {
                (PluginEventType::OnAccount, EventPayload::Account(account))
            }
            PluginEvent::Receipt(receipt) => {
                (PluginEventType::OnReceipt, EventPayload::Receipt(receipt))
            }
        };
        Self {
            request_id,
            event_type,
            payload,
        }
    }

    pub fn complete(request_id: RequestId) -> Self {
        Self {
            request_id,
            event_type: PluginEventType::OnComplete,
            payload: EventPayload::Empty(EmptyPayload::default()),
        }
    }

    pub fn error(request_id: RequestId, message: impl Into<String>) -> Self {
        Self {
            request_id,
            event_type: PluginEventType::OnError,
            payload: EventPayload::Error {
                message: message.into(),
            },
        }
    }
}

/// Outbound channel to the caller boundary. Must not block.
pub trait EventSink: Send + Sync {
    fn send(&self, envelope: EventEnvelope);
}
