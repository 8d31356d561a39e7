use std::env;

use business::domain::errors::CaptureError;
use business::domain::session::model::{LicenseKeys, LinkingConfig};

/// License material and linking client settings.
#[derive(Debug, Clone, Default)]
pub struct LinkingEnvConfig {
    pub license_key: Option<String>,
    pub product_key: Option<String>,
    pub linking: LinkingConfig,
}

impl LinkingEnvConfig {
    /// Load linking configuration from environment variables
    ///
    /// Environment variables:
    /// - CAPTURE_LICENSE_KEY / CAPTURE_PRODUCT_KEY: initialize on startup when both are set
    /// - LINKING_DAY_CUTOFF: order history window in days (default: 15)
    /// - LINKING_LATEST_ORDERS_ONLY: only fetch the latest order (default: false)
    /// - LINKING_COUNTRY_CODE: retailer locale (default: "US")
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = LinkingConfig::default();
        let non_empty = |name: &str| var(name).filter(|value| !value.trim().is_empty());

        Self {
            license_key: non_empty("CAPTURE_LICENSE_KEY"),
            product_key: non_empty("CAPTURE_PRODUCT_KEY"),
            linking: LinkingConfig {
                day_cutoff: non_empty("LINKING_DAY_CUTOFF")
                    .and_then(|value| value.trim().parse().ok())
                    .unwrap_or(defaults.day_cutoff),
                latest_orders_only: non_empty("LINKING_LATEST_ORDERS_ONLY")
                    .and_then(|value| value.trim().parse().ok())
                    .unwrap_or(defaults.latest_orders_only),
                country_code: non_empty("LINKING_COUNTRY_CODE")
                    .map(|value| value.trim().to_uppercase())
                    .unwrap_or(defaults.country_code),
            },
        }
    }

    /// Keys for initializing at startup, when both are configured.
    pub fn startup_keys(&self) -> Option<Result<LicenseKeys, CaptureError>> {
        match (&self.license_key, &self.product_key) {
            (Some(license_key), Some(product_key)) => {
                Some(LicenseKeys::new(license_key.clone(), product_key.clone()))
            }
            _ => None,
        }
    }
}
