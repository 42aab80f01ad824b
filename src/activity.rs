use events::LogMessage;
use std::collections::VecDeque;
use std::fmt;

/// The operator-facing activity window: the most recent engine entries,
/// newest first, capped at a fixed size.
#[derive(Debug)]
pub struct ActivityLog {
    capacity: usize,
    entries: VecDeque<LogMessage>,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Mirrors `message` to `tracing` at debug and keeps it in the window.
    pub fn record(&mut self, message: LogMessage) {
        forward(&message);
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(message);
        self.entries.truncate(self.capacity);
    }

    /// Records one tick's entries in the order the engine emitted them.
    pub fn record_all(&mut self, messages: impl IntoIterator<Item = LogMessage>) {
        for message in messages {
            self.record(message);
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogMessage> {
        self.entries.iter()
    }
}

/// Whoever produced an entry has already traced the event with its own fields,
/// so the copy stays at debug.
fn forward(message: &LogMessage) {
    tracing::debug!(target: "activity", severity = %message.level, "{}", message.message);
}

/// Health of the price feed as last observed by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Connecting,
    Connected,
    Error,
}

impl FeedStatus {
    /// The activity entry for moving from `self` to `next`, if the move is worth one.
    pub fn transition_log(self, next: FeedStatus, feed: &str) -> Option<LogMessage> {
        match (self, next) {
            (FeedStatus::Error, FeedStatus::Error) => None,
            (_, FeedStatus::Error) => Some(LogMessage::error(format!(
                "Price feed {} unreachable; keeping last prices.",
                feed
            ))),
            (FeedStatus::Error, FeedStatus::Connected) => {
                Some(LogMessage::success(format!("Price feed {} reconnected.", feed)))
            }
            _ => None,
        }
    }
}

impl fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FeedStatus::Connecting => "connecting",
            FeedStatus::Connected => "connected",
            FeedStatus::Error => "error",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::LogLevel;
    use std::io;
    use std::sync::{Arc, Mutex};

    /// Collects formatted tracing output in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn traced_at(level: tracing::Level, record: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, record);
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn window_keeps_newest_first_and_is_bounded() {
        let mut log = ActivityLog::new(3);
        log.record_all((0..5).map(|i| LogMessage::info(format!("entry {}", i))));
        let messages: Vec<&str> = log.entries().map(|m| m.message.as_str()).collect();
        assert_eq!(messages, vec!["entry 4", "entry 3", "entry 2"]);
        assert_eq!(log.entries().count(), 3);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut log = ActivityLog::new(0);
        log.record(LogMessage::warning("dropped"));
        assert_eq!(log.entries().count(), 0);
    }

    #[test]
    fn entries_are_not_traced_a_second_time_at_info() {
        let entries = || {
            vec![
                LogMessage::success("Harmonic entry: LONG on BTC_USDT @ $100.0000"),
                LogMessage::warning("Stop loss (point X invalidated): BTC_USDT (-25.00 USDT)"),
            ]
        };

        let info = traced_at(tracing::Level::INFO, || ActivityLog::new(5).record_all(entries()));
        assert!(info.is_empty(), "unexpected output: {}", info);

        let debug = traced_at(tracing::Level::DEBUG, || ActivityLog::new(5).record_all(entries()));
        assert!(debug.contains("Harmonic entry: LONG on BTC_USDT"));
        assert!(debug.contains("severity=WARNING"));
    }

    #[test]
    fn feed_transitions_worth_an_entry() {
        let down = FeedStatus::Connected.transition_log(FeedStatus::Error, "gate").unwrap();
        assert_eq!(down.level, LogLevel::Error);
        assert_eq!(down.message, "Price feed gate unreachable; keeping last prices.");

        let first_failure = FeedStatus::Connecting.transition_log(FeedStatus::Error, "gate").unwrap();
        assert_eq!(first_failure.level, LogLevel::Error);

        let back = FeedStatus::Error.transition_log(FeedStatus::Connected, "gate").unwrap();
        assert_eq!(back.level, LogLevel::Success);

        assert!(FeedStatus::Error.transition_log(FeedStatus::Error, "gate").is_none());
        assert!(FeedStatus::Connecting.transition_log(FeedStatus::Connected, "gate").is_none());
        assert!(FeedStatus::Connected.transition_log(FeedStatus::Connected, "gate").is_none());
    }

    #[test]
    fn feed_status_labels() {
        assert_eq!(FeedStatus::Connected.to_string(), "connected");
        assert_eq!(FeedStatus::Error.to_string(), "error");
    }
}
