//! Rolling Logger
//!
//! A `tracing` layer that keeps the most recent records in a bounded ring.
//! Used as the in-app observability sink: the UI reads it for its notice
//! panel, the server exposes it at `/api/logs`.

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// One captured event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    pub message: String,
}

impl LogRecord {
    pub fn is_error(&self) -> bool {
        self.level == Level::ERROR.as_str()
    }
}

/// Shared handle to the ring of recent records
#[derive(Debug, Clone)]
pub struct LogBuffer {
    inner: Arc<Mutex<VecDeque<LogRecord>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LogRecord>> {
        // A panic while holding the lock leaves the ring usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a record, evicting the oldest when full
    pub fn push(&self, record: LogRecord) {
        let mut ring = self.lock();
        if ring.len() == self.capacity {
            ring.pop_front();
        }
        ring.push_back(record);
    }

    /// Oldest first
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().iter().cloned().collect()
    }

    pub fn latest_error(&self) -> Option<LogRecord> {
        self.lock().iter().rev().find(|r| r.is_error()).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Layer feeding a [`LogBuffer`]
pub struct RollingLayer {
    buffer: LogBuffer,
    min_level: Level,
}

impl RollingLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer, min_level: Level::DEBUG }
    }

    /// Drop events less severe than `level`
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }
}

impl<S: Subscriber> Layer<S> for RollingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        // Level ordering: TRACE > DEBUG > ... > ERROR
        if *meta.level() > self.min_level {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.buffer.push(LogRecord {
            timestamp: Utc::now(),
            level: meta.level().as_str().to_string(),
            target: meta.target().to_string(),
            message: visitor.finish(),
        });
    }
}

/// Collects the `message` field first, other fields as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
            return;
        }
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={:?}", field.name(), value);
    }
}

/// A layer plus the buffer it writes to, for composing with other layers
pub fn layer(capacity: usize) -> (RollingLayer, LogBuffer) {
    let buffer = LogBuffer::new(capacity);
    (RollingLayer::new(buffer.clone()), buffer)
}

/// Install the rolling layer as the only global subscriber
pub fn init_logger(capacity: usize, min_level: Level) -> Result<LogBuffer, LoggerError> {
    let (layer, buffer) = layer(capacity);
    tracing_subscriber::registry()
        .with(layer.with_min_level(min_level))
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(message: &str, level: Level) -> LogRecord {
        LogRecord {
            timestamp: Utc::now(),
            level: level.as_str().to_string(),
            target: "test".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_ring_evicts_oldest() {
        let buffer = LogBuffer::new(2);
        buffer.push(record("one", Level::INFO));
        buffer.push(record("two", Level::INFO));
        buffer.push(record("three", Level::INFO));

        let messages: Vec<String> = buffer.records().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, vec!["two", "three"]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_latest_error() {
        let buffer = LogBuffer::new(8);
        assert!(buffer.latest_error().is_none());
        buffer.push(record("bad", Level::ERROR));
        buffer.push(record("fine", Level::INFO));
        assert_eq!(buffer.latest_error().unwrap().message, "bad");
        buffer.clear();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_layer_captures_events() {
        let (layer, buffer) = layer(8);
        let subscriber = tracing_subscriber::registry().with(layer.with_min_level(Level::INFO));

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("filtered out");
            tracing::info!(task = "A", "moved");
            tracing::error!("rollback");
        });

        let records = buffer.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "moved task=\"A\"");
        assert_eq!(records[0].level, "INFO");
        assert!(records[1].is_error());
    }

    #[test]
    fn test_record_serializes() {
        let json = serde_json::to_value(record("x", Level::WARN)).unwrap();
        assert_eq!(json["level"], "WARN");
        assert!(json["timestamp"].is_string());
    }
}
