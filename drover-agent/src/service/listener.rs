//! Task listeners
//!
//! Diagnostic sinks handed to teardown. A listener accepts free-form text;
//! the controller uses it to record failures it absorbs while stopping a task.

use drover_core::domain::log::{LogEntry, LogLevel};
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

/// Sink for diagnostic messages produced during agent teardown
pub trait TaskListener: Send + Sync {
    /// Records a message at the given level
    fn log(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

/// Listener that forwards every message to `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingListener;

impl TaskListener for TracingListener {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => info!(target: "drover_agent::listener", "{}", message),
            LogLevel::Warning => warn!(target: "drover_agent::listener", "{}", message),
            LogLevel::Error => error!(target: "drover_agent::listener", "{}", message),
        }
    }
}

/// In-memory listener
///
/// Uses Arc<Mutex<Vec<LogEntry>>> so clones share one buffer across tasks.
#[derive(Clone, Default)]
pub struct BufferedListener {
    buffer: Arc<Mutex<Vec<LogEntry>>>,
}

impl BufferedListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the buffered entries without clearing them
    pub fn entries(&self) -> Vec<LogEntry> {
        let buffer = self.buffer.lock().unwrap();
        buffer.clone()
    }

    /// Returns all buffered entries and clears the buffer
    pub fn drain(&self) -> Vec<LogEntry> {
        let mut buffer = self.buffer.lock().unwrap();
        buffer.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().unwrap().is_empty()
    }
}

impl TaskListener for BufferedListener {
    fn log(&self, level: LogLevel, message: &str) {
        let mut buffer = self.buffer.lock().unwrap();
        buffer.push(LogEntry::now(level, message));
    }
}
