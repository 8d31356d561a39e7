use dotenvy::dotenv;
use tokio::sync::mpsc;

mod api {
    pub mod dto;
    pub mod error;
    pub mod events;
    pub mod interactions;
    pub mod messages;
}
mod config {
    pub mod app_config;
    pub mod engine_config;
    pub mod linking_config;
}
mod setup {
    pub mod dependency_injection;
    pub mod host;
}

use business::domain::session::use_cases::initialize::InitializeParams;
use config::app_config::AppConfig;
use setup::{dependency_injection::DependencyContainer, host::PluginHost, host::write_messages};

/// Plugin Host Entry Point
///
/// Speaks JSON lines: requests on stdin, events and replies on stdout.
/// Logs go to stderr so stdout stays a clean protocol channel.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing with RUST_LOG env filter
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // 2. Load environment variables
    dotenv().ok();

    // 3. Load configuration
    let config = AppConfig::from_env();

    // 4. Start the stdout writer
    let (outbound, inbound) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_messages(inbound, tokio::io::stdout()));

    // 5. Wire dependencies
    let container = DependencyContainer::new(&config.engine, outbound.clone()).await?;

    // 6. Initialize right away when keys are configured
    if let Some(keys) = config.linking.startup_keys() {
        let params = InitializeParams {
            keys: keys?,
            config: config.linking.linking.clone(),
        };
        match container.orchestrator.initialize(params).await {
            Ok(()) => tracing::info!("Engines initialized from environment"),
            Err(error) => tracing::error!("Startup initialization failed: {}", error),
        }
    }

    // 7. Serve requests until stdin closes
    PluginHost::new(container, config.linking.linking, outbound)
        .run(tokio::io::stdin())
        .await?;

    writer.await??;
    Ok(())
}
