/// Severity attached to every message sent through the [`Logger`] port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Logging port. Adapters decide where messages end up; the core only
/// ever hands over already formatted text and never credentials.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }
    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }
    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }
}
