use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-process message counters
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Metrics {
    pub messages_total: u64,
    pub replies_sent: u64,
    /// Messages that were not addressed to the bot
    pub ignored: u64,
    /// Requests failed by a persistence error
    pub failures: u64,
    /// Input lines that could not be parsed
    pub malformed: u64,
    /// Replies by response kind
    pub by_kind: BTreeMap<String, u64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reply of the given kind
    pub fn record_reply(&mut self, kind: &str) {
        self.messages_total += 1;
        self.replies_sent += 1;
        *self.by_kind.entry(kind.to_string()).or_insert(0) += 1;
    }

    pub fn record_ignored(&mut self) {
        self.messages_total += 1;
        self.ignored += 1;
    }

    pub fn record_failure(&mut self) {
        self.messages_total += 1;
        self.failures += 1;
    }

    pub fn record_malformed(&mut self) {
        self.malformed += 1;
    }

    /// Share of handled messages that did not fail, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.messages_total == 0 {
            return 100.0;
        }
        let ok = self.messages_total - self.failures;
        (ok as f64 / self.messages_total as f64) * 100.0
    }
}
