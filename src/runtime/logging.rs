use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Something about a transcript that was worked around rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityEvent {
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

/// Collects data-quality events for one import while also sending them to
/// `tracing`.
#[derive(Debug, Clone, Default)]
pub struct QualityLog {
    events: Vec<QualityEvent>,
}

impl QualityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_event(
        &mut self,
        level: LogLevel,
        message: &str,
        context: Option<serde_json::Value>,
    ) {
        match level {
            LogLevel::Debug => tracing::debug!("[Import] {}", message),
            LogLevel::Info => tracing::info!("[Import] {}", message),
            LogLevel::Warn => tracing::warn!("[Import] {}", message),
            LogLevel::Error => tracing::error!("[Import] {}", message),
        }
        self.events.push(QualityEvent {
            level,
            message: message.to_string(),
            context,
        });
    }

    pub fn info(&mut self, message: &str) {
        self.log_event(LogLevel::Info, message, None);
    }

    pub fn warn(&mut self, message: &str) {
        self.log_event(LogLevel::Warn, message, None);
    }

    pub fn error(&mut self, message: &str) {
        self.log_event(LogLevel::Error, message, None);
    }

    pub fn events(&self) -> &[QualityEvent] {
        &self.events
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.events.iter().filter(|e| e.level == level).count()
    }

    pub fn into_events(self) -> Vec<QualityEvent> {
        self.events
    }
}
