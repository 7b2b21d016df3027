//! Record of the transitions a machine has executed.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of records a [`TransitionLog`] keeps.
pub const DEFAULT_LOG_CAPACITY: usize = 64;

/// What caused a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    /// A passable transition found during a tick.
    Guarded,
    /// A transition requested by name.
    Directed,
}

/// Structural outcome of moving to a target state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEffect {
    /// States below the divergence point were exited and entered.
    Applied,
    /// The target was already on the active chain; nothing changed.
    AlreadyActive,
}

/// One executed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Active leaf before the transition.
    pub from: String,
    /// Target state.
    pub to: String,
    pub kind: TransitionKind,
    pub effect: TransitionEffect,
    /// Simulation time of the transition.
    pub time: f64,
    /// Unscaled time of the transition.
    pub unscaled: f64,
}

/// Bounded, ordered log of transitions.
///
/// Once full, recording a transition drops the oldest one.
///
/// # Example
///
/// ```rust
/// use strata::core::{TransitionEffect, TransitionKind, TransitionLog, TransitionRecord};
///
/// let mut log = TransitionLog::new(2);
/// for (from, to) in [("Idle", "Walk"), ("Walk", "Run"), ("Run", "Idle")] {
///     log.record(TransitionRecord {
///         from: from.into(),
///         to: to.into(),
///         kind: TransitionKind::Guarded,
///         effect: TransitionEffect::Applied,
///         time: 0.0,
///         unscaled: 0.0,
///     });
/// }
///
/// assert_eq!(log.len(), 2);
/// assert_eq!(log.total_recorded(), 3);
/// assert_eq!(log.path(), vec!["Walk", "Run", "Idle"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransitionLog {
    capacity: usize,
    records: VecDeque<TransitionRecord>,
    total: u64,
}

impl Default for TransitionLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl TransitionLog {
    /// Create an empty log keeping at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            total: 0,
        }
    }

    pub fn record(&mut self, record: TransitionRecord) {
        self.total += 1;
        if self.capacity == 0 {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Copy of this log bounded by `capacity`, keeping the newest records.
    /// The total count is carried over.
    pub fn with_capacity(&self, capacity: usize) -> Self {
        let skip = self.records.len().saturating_sub(capacity);
        Self {
            capacity,
            records: self.records.iter().skip(skip).cloned().collect(),
            total: self.total,
        }
    }

    /// Retained records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of transitions ever recorded, including dropped ones.
    pub fn total_recorded(&self) -> u64 {
        self.total
    }

    /// States visited by the retained records: the first record's source,
    /// then every target in order.
    pub fn path(&self) -> Vec<&str> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from.as_str());
        }
        path.extend(self.records.iter().map(|record| record.to.as_str()));
        path
    }

    /// Simulation time between the first and last retained records.
    pub fn span(&self) -> Option<f64> {
        match (self.records.front(), self.records.back()) {
            (Some(first), Some(last)) => Some(last.time - first.time),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(from: &str, to: &str, time: f64) -> TransitionRecord {
        TransitionRecord {
            from: from.to_string(),
            to: to.to_string(),
            kind: TransitionKind::Guarded,
            effect: TransitionEffect::Applied,
            time,
            unscaled: time,
        }
    }

    #[test]
    fn new_log_is_empty() {
        let log = TransitionLog::default();
        assert!(log.is_empty());
        assert!(log.path().is_empty());
        assert!(log.span().is_none());
        assert_eq!(log.capacity(), DEFAULT_LOG_CAPACITY);
    }

    #[test]
    fn path_follows_recorded_order() {
        let mut log = TransitionLog::default();
        log.record(record("Idle", "Walk", 1.0));
        log.record(record("Walk", "Run", 2.0));

        assert_eq!(log.path(), vec!["Idle", "Walk", "Run"]);
        assert_eq!(log.last().map(|r| r.to.as_str()), Some("Run"));
    }

    #[test]
    fn full_log_drops_oldest() {
        let mut log = TransitionLog::new(2);
        log.record(record("A", "B", 1.0));
        log.record(record("B", "C", 2.0));
        log.record(record("C", "D", 3.0));

        assert_eq!(log.len(), 2);
        assert_eq!(log.total_recorded(), 3);
        assert_eq!(log.path(), vec!["B", "C", "D"]);
    }

    #[test]
    fn zero_capacity_only_counts() {
        let mut log = TransitionLog::new(0);
        log.record(record("A", "B", 1.0));

        assert!(log.is_empty());
        assert_eq!(log.total_recorded(), 1);
    }

    #[test]
    fn span_measures_simulation_time() {
        let mut log = TransitionLog::default();
        log.record(record("A", "B", 1.5));
        assert_eq!(log.span(), Some(0.0));

        log.record(record("B", "C", 4.0));
        assert_eq!(log.span(), Some(2.5));
    }

    #[test]
    fn log_serializes_correctly() {
        let mut log = TransitionLog::new(8);
        log.record(record("Idle", "Walk", 1.0));

        let json = serde_json::to_string(&log).unwrap();
        let deserialized: TransitionLog = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.len(), 1);
        assert_eq!(deserialized.capacity(), 8);
        assert_eq!(deserialized.last(), log.last());
    }

    #[test]
    fn overfull_decoded_log_shrinks_on_next_record() {
        let mut log = TransitionLog::new(8);
        for (from, to) in [("A", "B"), ("B", "C"), ("C", "A")] {
            log.record(record(from, to, 1.0));
        }
        let mut value = serde_json::to_value(&log).unwrap();
        value["capacity"] = serde_json::json!(2);
        let mut decoded: TransitionLog = serde_json::from_value(value).unwrap();
        assert_eq!(decoded.len(), 3);

        for _ in 0..10 {
            decoded.record(record("A", "B", 2.0));
        }

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.total_recorded(), 13);
    }

    #[test]
    fn with_capacity_keeps_newest_records() {
        let mut log = TransitionLog::new(8);
        for (from, to) in [("A", "B"), ("B", "C"), ("C", "D")] {
            log.record(record(from, to, 1.0));
        }

        let bounded = log.with_capacity(2);

        assert_eq!(bounded.capacity(), 2);
        assert_eq!(bounded.path(), vec!["B", "C", "D"]);
        assert_eq!(bounded.total_recorded(), 3);
    }
}
