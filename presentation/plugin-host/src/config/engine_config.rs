use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Timeouts and the fixture backing the scripted native engines.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub engine_timeout: Duration,
    pub interaction_timeout: Duration,
    pub fixture_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_timeout: Duration::from_secs(30),
            interaction_timeout: Duration::from_secs(120),
            fixture_path: None,
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from environment variables
    ///
    /// Environment variables:
    /// - ENGINE_TIMEOUT_SECS: bound on every engine call (default: 30)
    /// - INTERACTION_TIMEOUT_SECS: time the caller has to resolve a verification surface (default: 120)
    /// - CAPTURE_ENGINE_FIXTURE: JSON fixture for the scripted engines (default: empty engine)
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let seconds = |name: &str| {
            var(name)
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|seconds| *seconds > 0)
                .map(Duration::from_secs)
        };

        Self {
            engine_timeout: seconds("ENGINE_TIMEOUT_SECS").unwrap_or(defaults.engine_timeout),
            interaction_timeout: seconds("INTERACTION_TIMEOUT_SECS")
                .unwrap_or(defaults.interaction_timeout),
            fixture_path: var("CAPTURE_ENGINE_FIXTURE")
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}
