use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use business::application::orchestrator::LinkingOrchestrator;
use business::domain::errors::CaptureError;
use business::domain::session::model::LinkingConfig;
use business::domain::shared::value_objects::RequestId;

use crate::api::dto::{Call, PluginRequest};
use crate::api::error::{ErrorResponse, IntoErrorResponse};
use crate::api::interactions::PendingInteractions;
use crate::api::messages::{HostMessage, Outbound};
use crate::setup::dependency_injection::DependencyContainer;

/// Reads one JSON request per line and runs each on its own task, so
/// long-running requests never block the ones behind them.
pub struct PluginHost {
    orchestrator: Arc<LinkingOrchestrator>,
    interactions: Arc<PendingInteractions>,
    linking: LinkingConfig,
    outbound: Outbound,
    in_flight: JoinSet<()>,
}

impl PluginHost {
    pub fn new(container: DependencyContainer, linking: LinkingConfig, outbound: Outbound) -> Self {
        Self {
            orchestrator: container.orchestrator,
            interactions: container.interactions,
            linking,
            outbound,
            in_flight: JoinSet::new(),
        }
    }

    fn reply(&self, message: HostMessage) {
        if self.outbound.send(message).is_err() {
            tracing::warn!("Output closed, dropping reply");
        }
    }

    fn reject(&self, method: &str, request_id: Option<RequestId>, error: ErrorResponse) {
        tracing::debug!(method, "Rejected request: {}", error.message);
        self.reply(HostMessage::Rejected {
            method: method.to_string(),
            request_id,
            error,
        });
    }

    pub async fn run<R>(mut self, input: R) -> anyhow::Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let mut lines = BufReader::new(input).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            self.dispatch(&line);
        }
        tracing::info!("Input closed, waiting for in-flight requests");
        self.finish().await;
        Ok(())
    }

    pub fn dispatch(&mut self, line: &str) {
        let request: PluginRequest = match serde_json::from_str(line) {
            Ok(request) => request,
            Err(error) => {
                self.reject(
                    "unknown",
                    None,
                    ErrorResponse {
                        name: "ValidationError".to_string(),
                        message: format!("Invalid request: {}", error),
                    },
                );
                return;
            }
        };

        let method = request.method();
        let raw_request_id = request.raw_request_id();
        let call = match request.into_call(&self.linking) {
            Ok(call) => call,
            Err(error) => {
                self.reject(method, raw_request_id, error.into_error_response());
                return;
            }
        };

        let call = match call {
            Call::ResolveVerification {
                request_id,
                resolution,
            } => {
                match self.interactions.resolve(&request_id, resolution) {
                    Ok(()) => self.reply(HostMessage::Resolved {
                        method: method.to_string(),
                        request_id: Some(request_id),
                    }),
                    Err(error) => {
                        self.reject(method, Some(request_id), error.into_error_response())
                    }
                }
                return;
            }
            call => call,
        };

        let orchestrator = self.orchestrator.clone();
        let outbound = self.outbound.clone();
        self.in_flight.spawn(async move {
            if let Some(message) = execute(&orchestrator, method, call).await {
                let _ = outbound.send(message);
            }
        });
    }

    /// Waits for every spawned request to settle.
    pub async fn finish(&mut self) {
        while let Some(joined) = self.in_flight.join_next().await {
            if let Err(error) = joined {
                tracing::error!("Request task failed: {}", error);
            }
        }
    }
}

/// Runs a validated call. Correlated calls report through their events, so
/// only initialize and calls that never opened a request produce a reply.
async fn execute(
    orchestrator: &LinkingOrchestrator,
    method: &'static str,
    call: Call,
) -> Option<HostMessage> {
    let (request_id, result) = match call {
        Call::Initialize(params) => {
            return Some(match orchestrator.initialize(params).await {
                Ok(()) => HostMessage::Resolved {
                    method: method.to_string(),
                    request_id: None,
                },
                Err(error) => HostMessage::Rejected {
                    method: method.to_string(),
                    request_id: None,
                    error: error.into_error_response(),
                },
            });
        }
        Call::Login {
            request_id,
            account,
        } => {
            let result = orchestrator.login(request_id.clone(), account).await;
            (request_id, result.map(|record| record.state.to_string()))
        }
        Call::Logout {
            request_id,
            retailer,
        } => {
            let result = orchestrator.logout(request_id.clone(), retailer).await;
            (request_id, result.map(|record| record.state.to_string()))
        }
        Call::Remove {
            request_id,
            retailer,
        } => {
            let result = orchestrator.remove(request_id.clone(), retailer).await;
            (request_id, result.map(|record| record.state.to_string()))
        }
        Call::Accounts { request_id } => {
            let result = orchestrator.accounts(request_id.clone()).await;
            (request_id, result.map(|records| format!("{} accounts", records.len())))
        }
        Call::Orders { request_id } => {
            let result = orchestrator.orders(request_id.clone()).await;
            (request_id, result.map(|summary| format!("{} order sets", summary.fetched)))
        }
        Call::Flush { request_id } => {
            let result = orchestrator.flush(request_id.clone()).await;
            (request_id, result.map(|()| "history cleared".to_string()))
        }
        Call::Scan {
            request_id,
            day_cutoff,
        } => {
            let result = orchestrator.scan(request_id.clone(), day_cutoff).await;
            (request_id, result.map(|count| format!("{} receipts", count)))
        }
        // Settled synchronously by the dispatcher.
        Call::ResolveVerification { .. } => return None,
    };

    match result {
        Ok(summary) => {
            tracing::debug!(%request_id, method, "Request finished: {}", summary);
            None
        }
        Err(error @ CaptureError::DuplicateRequest(_)) => Some(HostMessage::Rejected {
            method: method.to_string(),
            request_id: Some(request_id),
            error: error.into_error_response(),
        }),
        Err(error) => {
            tracing::debug!(%request_id, method, "Request failed: {}", error);
            None
        }
    }
}

/// Writes every outbound message as one JSON line until all senders are gone.
pub async fn write_messages<W>(
    mut inbound: mpsc::UnboundedReceiver<HostMessage>,
    mut output: W,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = inbound.recv().await {
        let mut line = serde_json::to_vec(&message)?;
        line.push(b'\n');
        output.write_all(&line).await?;
        output.flush().await?;
    }
    Ok(())
}
