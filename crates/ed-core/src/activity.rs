use chrono::{DateTime, Local};

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub time: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            time: Local::now(),
            message: message.into(),
        }
    }

    /// e.g. `10/19/2026, 14:03:27`
    pub fn time_label(&self) -> String {
        self.time.format("%m/%d/%Y, %H:%M:%S").to_string()
    }
}

/// Append-only record of what happened during the session, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
}

impl ActivityLog {
    pub fn push(&mut self, message: impl Into<String>) {
        let entry = LogEntry::now(message);
        log::info!("{}", entry.message);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_time_label_is_24h() {
        let entry = LogEntry {
            time: Local.with_ymd_and_hms(2026, 3, 7, 18, 5, 9).unwrap(),
            message: "x".into(),
        };
        assert_eq!(entry.time_label(), "03/07/2026, 18:05:09");
    }

    #[test]
    fn test_entries_keep_order() {
        let mut log = ActivityLog::default();
        log.push("first");
        log.push("second");

        let messages: Vec<_> = log.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(log.last().unwrap().message, "second");
    }
}
