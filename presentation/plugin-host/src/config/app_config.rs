use super::{engine_config::EngineConfig, linking_config::LinkingEnvConfig};

pub struct AppConfig {
    pub linking: LinkingEnvConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            linking: LinkingEnvConfig::from_env(),
            engine: EngineConfig::from_env(),
        }
    }
}
