use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::model::CredentialAccount;
use super::value_objects::RetailerId;
use crate::domain::errors::EngineError;
use crate::domain::receipt::model::ScanResult;
use crate::domain::session::model::{LicenseKeys, LinkingConfig};
use crate::domain::shared::value_objects::RequestId;

/// Opaque reference to a native verification surface (a web view, a
/// dialog). The presentation layer renders it; the core only forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionHandle {
    pub id: String,
    pub retailer: RetailerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// How the presentation layer settled an interactive verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionResolution {
    /// The user went through the surface; verification should be retried.
    Completed,
    /// The user closed the surface or it timed out.
    Dismissed,
}

/// Service port for the external account linking engine, already bridged
/// from its callback API to single-resolution futures.
///
/// `verify` reports a verification-needed failure as
/// [`EngineError::VerificationNeeded`], optionally carrying the surface to show.
#[async_trait]
pub trait LinkingEngine: Send + Sync {
    async fn initialize(
        &self,
        keys: &LicenseKeys,
        config: &LinkingConfig,
    ) -> Result<(), EngineError>;

    async fn link(&self, account: &CredentialAccount) -> Result<(), EngineError>;

    async fn unlink(&self, account: &CredentialAccount) -> Result<(), EngineError>;

    async fn accounts(&self) -> Result<Vec<CredentialAccount>, EngineError>;

    async fn verify(&self, retailer: RetailerId) -> Result<bool, EngineError>;

    /// `Ok(None)` means the engine answered without any order data.
    async fn orders(&self, retailer: RetailerId) -> Result<Option<ScanResult>, EngineError>;

    async fn reset_history(&self) -> Result<(), EngineError>;
}

/// Port towards whatever renders interactive verification surfaces.
///
/// Implementations suspend until the user resolves the surface and are
/// responsible for turning their own timeout into `Dismissed`.
#[async_trait]
pub trait InteractionPresenter: Send + Sync {
    async fn present(
        &self,
        request_id: &RequestId,
        handle: InteractionHandle,
    ) -> InteractionResolution;
}
