//! Ordered log entries emitted by `LOG0`-`LOG4`.

use crate::bytes::Bytes;
use crate::u256::U256;
use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// A single log entry: 0-4 topics and a variable-length payload. Both are
/// cloned on insertion (topics are `Copy`, and `Bytes` is a cheap
/// refcounted clone).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub topics: ArrayVec<U256, 4>,
    pub data: Bytes,
}

/// Ordered sequence of log entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logs(Vec<LogEntry>);

impl Logs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, topics: &[U256], data: Bytes) {
        let mut t = ArrayVec::new();
        for topic in topics {
            t.push(*topic);
        }
        self.0.push(LogEntry { topics: t, data });
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.0.iter()
    }

    pub fn diff(&self, other: &Self) -> Vec<String> {
        let mut out = Vec::new();
        if self.0.len() != other.0.len() {
            out.push(format!(
                "logs length differs: {} != {}",
                self.0.len(),
                other.0.len()
            ));
            return out;
        }
        for (i, (a, b)) in self.0.iter().zip(other.0.iter()).enumerate() {
            if a != b {
                out.push(format!("logs[{i}] differs"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_clones_topics_and_data() {
        let mut logs = Logs::new();
        logs.push(&[U256::one()], Bytes::from_vec(vec![1, 2, 3]));
        assert_eq!(logs.len(), 1);
        assert_eq!(logs.iter().next().unwrap().topics.len(), 1);
    }

    #[test]
    fn diff_reports_length_mismatch_once() {
        let mut a = Logs::new();
        a.push(&[], Bytes::new());
        let b = Logs::new();
        assert_eq!(a.diff(&b).len(), 1);
    }
}
