use serde::Serialize;
use tokio::sync::mpsc;

use business::domain::account::services::InteractionHandle;
use business::domain::request::events::EventEnvelope;
use business::domain::shared::value_objects::RequestId;

use crate::api::error::ErrorResponse;

/// One line written to stdout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HostMessage {
    Event(EventEnvelope),
    #[serde(rename_all = "camelCase")]
    Resolved {
        method: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<RequestId>,
    },
    #[serde(rename_all = "camelCase")]
    Rejected {
        method: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<RequestId>,
        error: ErrorResponse,
    },
    #[serde(rename_all = "camelCase")]
    Interaction {
        request_id: RequestId,
        handle: InteractionHandle,
    },
}

pub type Outbound = mpsc::UnboundedSender<HostMessage>;
