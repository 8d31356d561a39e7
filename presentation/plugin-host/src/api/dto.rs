use serde::Deserialize;

use business::domain::account::model::CredentialAccount;
use business::domain::account::services::InteractionResolution;
use business::domain::account::value_objects::RetailerId;
use business::domain::errors::CaptureError;
use business::domain::receipt::use_cases::scan::DEFAULT_DAY_CUTOFF;
use business::domain::session::model::{LicenseKeys, LinkingConfig};
use business::domain::session::use_cases::initialize::InitializeParams;
use business::domain::shared::value_objects::RequestId;

/// Retailer as sent by callers: the native integer code or its name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RetailerRef {
    Code(i32),
    Name(String),
}

impl RetailerRef {
    fn resolve(self) -> Result<RetailerId, CaptureError> {
        match self {
            RetailerRef::Code(code) => RetailerId::from_code(code)
                .ok_or_else(|| CaptureError::Validation(format!("Invalid retailer: {}", code))),
            RetailerRef::Name(name) => name.parse().map_err(CaptureError::Validation),
        }
    }
}

/// One line read from stdin. Every field is optional here so missing ones
/// produce the plugin's own validation messages instead of a parse error.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum PluginRequest {
    #[serde(rename_all = "camelCase")]
    Initialize {
        license_key: Option<String>,
        product_key: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Login {
        request_id: Option<String>,
        id: Option<RetailerRef>,
        username: Option<String>,
        password: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Logout {
        request_id: Option<String>,
        id: Option<RetailerRef>,
    },
    #[serde(rename_all = "camelCase")]
    Remove {
        request_id: Option<String>,
        id: Option<RetailerRef>,
    },
    #[serde(rename_all = "camelCase")]
    Accounts { request_id: Option<String> },
    #[serde(rename_all = "camelCase")]
    Orders { request_id: Option<String> },
    #[serde(rename_all = "camelCase")]
    Flush { request_id: Option<String> },
    #[serde(rename_all = "camelCase")]
    Scan {
        request_id: Option<String>,
        day_cut_off: Option<u32>,
    },
    #[serde(rename_all = "camelCase")]
    ResolveVerification {
        request_id: Option<String>,
        outcome: Option<InteractionResolution>,
    },
}

/// A request that passed validation.
#[derive(Debug)]
pub enum Call {
    Initialize(InitializeParams),
    Login {
        request_id: RequestId,
        account: CredentialAccount,
    },
    Logout {
        request_id: RequestId,
        retailer: RetailerId,
    },
    Remove {
        request_id: RequestId,
        retailer: RetailerId,
    },
    Accounts {
        request_id: RequestId,
    },
    Orders {
        request_id: RequestId,
    },
    Flush {
        request_id: RequestId,
    },
    Scan {
        request_id: RequestId,
        day_cutoff: u32,
    },
    ResolveVerification {
        request_id: RequestId,
        resolution: InteractionResolution,
    },
}

fn required<T>(value: Option<T>, field: &str, operation: &str) -> Result<T, CaptureError> {
    value.ok_or_else(|| CaptureError::missing(field, operation))
}

fn request_id(value: Option<String>, operation: &'static str) -> Result<RequestId, CaptureError> {
    RequestId::parse(value.unwrap_or_default(), operation)
}

impl PluginRequest {
    pub fn method(&self) -> &'static str {
        match self {
            PluginRequest::Initialize { .. } => "initialize",
            PluginRequest::Login { .. } => "login",
            PluginRequest::Logout { .. } => "logout",
            PluginRequest::Remove { .. } => "remove",
            PluginRequest::Accounts { .. } => "accounts",
            PluginRequest::Orders { .. } => "orders",
            PluginRequest::Flush { .. } => "flush",
            PluginRequest::Scan { .. } => "scan",
            PluginRequest::ResolveVerification { .. } => "resolveVerification",
        }
    }

    /// The request id as sent, for echoing it back on rejections.
    pub fn raw_request_id(&self) -> Option<RequestId> {
        let raw = match self {
            PluginRequest::Initialize { .. } => None,
            PluginRequest::Login { request_id, .. }
            | PluginRequest::Logout { request_id, .. }
            | PluginRequest::Remove { request_id, .. }
            | PluginRequest::Accounts { request_id }
            | PluginRequest::Orders { request_id }
            | PluginRequest::Flush { request_id }
            | PluginRequest::Scan { request_id, .. }
            | PluginRequest::ResolveVerification { request_id, .. } => request_id.as_deref(),
        };
        raw.filter(|id| !id.trim().is_empty()).map(RequestId::from)
    }

    /// Validates the request. `linking` supplies the client settings used
    /// by `initialize`.
    pub fn into_call(self, linking: &LinkingConfig) -> Result<Call, CaptureError> {
        let method = self.method();
        match self {
            PluginRequest::Initialize {
                license_key,
                product_key,
            } => Ok(Call::Initialize(InitializeParams {
                keys: LicenseKeys::new(
                    license_key.unwrap_or_default(),
                    product_key.unwrap_or_default(),
                )?,
                config: linking.clone(),
            })),
            PluginRequest::Login {
                request_id: id,
                id: retailer,
                username,
                password,
            } => {
                let request_id = request_id(id, method)?;
                let retailer = required(retailer, "id", method)?.resolve()?;
                let account = CredentialAccount::new(
                    retailer,
                    username.unwrap_or_default(),
                    password.unwrap_or_default(),
                )?;
                Ok(Call::Login {
                    request_id,
                    account,
                })
            }
            PluginRequest::Logout {
                request_id: id,
                id: retailer,
            } => Ok(Call::Logout {
                request_id: request_id(id, method)?,
                retailer: required(retailer, "id", method)?.resolve()?,
            }),
            PluginRequest::Remove {
                request_id: id,
                id: retailer,
            } => Ok(Call::Remove {
                request_id: request_id(id, method)?,
                retailer: required(retailer, "id", method)?.resolve()?,
            }),
            PluginRequest::Accounts { request_id: id } => Ok(Call::Accounts {
                request_id: request_id(id, method)?,
            }),
            PluginRequest::Orders { request_id: id } => Ok(Call::Orders {
                request_id: request_id(id, method)?,
            }),
            PluginRequest::Flush { request_id: id } => Ok(Call::Flush {
                request_id: request_id(id, method)?,
            }),
            PluginRequest::Scan {
                request_id: id,
                day_cut_off,
            } => Ok(Call::Scan {
                request_id: request_id(id, method)?,
                day_cutoff: day_cut_off.unwrap_or(DEFAULT_DAY_CUTOFF),
            }),
            PluginRequest::ResolveVerification {
                request_id: id,
                outcome,
            } => Ok(Call::ResolveVerification {
                request_id: request_id(id, method)?,
                resolution: required(outcome, "outcome", method)?,
            }),
        }
    }
}
