use business::domain::logger::{LogLevel, Logger};
use tracing::{debug, error, info, warn};

/// Forwards the core's log lines to `tracing` under a single target.
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => debug!(target: "receipt_capture", "{}", message),
            LogLevel::Info => info!(target: "receipt_capture", "{}", message),
            LogLevel::Warn => warn!(target: "receipt_capture", "{}", message),
            LogLevel::Error => error!(target: "receipt_capture", "{}", message),
        }
    }
}
