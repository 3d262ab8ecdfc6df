//! In-memory log capture for the interactive shell
//!
//! Tracing output goes to a bounded ring buffer so the `logs` command can
//! show recent engine activity without cluttering the table output.

use chrono::Local;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Default number of log entries kept in memory
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: Level,
    pub target: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: Level, target: &str, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S.%3f").to_string(),
            level,
            target: target.to_string(),
            message: message.into(),
        }
    }

    /// Split a compact-format line (`LEVEL target: message`) into an entry
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (level, rest) = match line.split_once(' ') {
            Some((word, rest)) => match word.parse::<Level>() {
                Ok(level) => (level, rest.trim_start()),
                Err(_) => return Some(Self::new(Level::INFO, "general", line)),
            },
            None => return Some(Self::new(Level::INFO, "general", line)),
        };

        let entry = match rest.split_once(':') {
            Some((target, message)) if !target.contains(' ') => {
                Self::new(level, target, message.trim())
            }
            _ => Self::new(level, "general", rest),
        };
        Some(entry)
    }

    pub fn format_for_display(&self) -> String {
        format!(
            "[{}] {:<5} [{}] {}",
            self.timestamp, self.level, self.target, self.message
        )
    }
}

/// Thread-safe bounded buffer of recent log entries
#[derive(Clone)]
pub struct LogRingBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl Default for LogRingBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl LogRingBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// A panic while logging must not take the log down with it
    fn lock(&self) -> MutexGuard<'_, VecDeque<LogEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, entry: LogEntry) {
        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// The newest `count` entries, oldest first
    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(count);
        entries.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// `MakeWriter` that feeds formatted lines into a `LogRingBuffer`
#[derive(Clone)]
pub struct RingBufferWriter {
    buffer: LogRingBuffer,
}

impl RingBufferWriter {
    pub fn new(buffer: LogRingBuffer) -> Self {
        Self { buffer }
    }
}

impl std::io::Write for RingBufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for line in text.lines() {
            if let Some(entry) = LogEntry::parse(line) {
                self.buffer.push(entry);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for RingBufferWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

static LOG_BUFFER: OnceLock<LogRingBuffer> = OnceLock::new();

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
/// With `verbose`, events are echoed to stderr too. Calling it again
/// returns the buffer installed first.
pub fn init_tracing(default_filter: &str, capacity: usize, verbose: bool) -> LogRingBuffer {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    if let Some(existing) = LOG_BUFFER.get() {
        return existing.clone();
    }
    let buffer = LOG_BUFFER
        .get_or_init(|| LogRingBuffer::with_capacity(capacity))
        .clone();

    let ring_layer = fmt::layer()
        .with_writer(RingBufferWriter::new(buffer.clone()))
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .without_time()
        .compact();

    let stderr_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
    });

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(ring_layer)
        .with(stderr_layer)
        .try_init();

    if installed.is_ok() {
        tracing::debug!(target: "system", "Tracing initialized");
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_compact_line() {
        let entry = LogEntry::parse(" WARN state: Min value should not be greater than Max value")
            .unwrap();
        assert_eq!(entry.level, Level::WARN);
        assert_eq!(entry.target, "state");
        assert_eq!(entry.message, "Min value should not be greater than Max value");

        let plain = LogEntry::parse("something happened").unwrap();
        assert_eq!(plain.level, Level::INFO);
        assert_eq!(plain.target, "general");
        assert!(LogEntry::parse("   ").is_none());
    }

    #[test]
    fn test_ring_buffer_drops_oldest() {
        let buffer = LogRingBuffer::with_capacity(2);
        for message in ["one", "two", "three"] {
            buffer.push(LogEntry::new(Level::INFO, "test", message));
        }
        let recent: Vec<String> = buffer.get_recent(10).into_iter().map(|e| e.message).collect();
        assert_eq!(recent, vec!["two", "three"]);
        assert_eq!(buffer.get_recent(1)[0].message, "three");
    }

    #[test]
    fn test_writer_splits_lines() {
        let buffer = LogRingBuffer::default();
        let mut writer = RingBufferWriter::new(buffer.clone());
        writer
            .write_all(b"DEBUG filter: 2 of 3 rows match\nINFO export: done\n")
            .unwrap();
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.get_recent(1)[0].target, "export");
        buffer.clear();
        assert!(buffer.is_empty());
    }
}
