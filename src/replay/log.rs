//! Loaded event log

use chrono::{DateTime, Utc};

use crate::events::GameEvent;
use crate::source::ReplayPayload;

/// Immutable, ordered sequence of game events plus recording metadata.
///
/// A log is created wholesale by a successful load and never mutated
/// afterwards; the engine replaces it entirely on reload and drops it on
/// reset.
#[derive(Debug, Clone)]
pub struct EventLog {
    events: Vec<GameEvent>,
    total_duration: f64,
    loaded_at: DateTime<Utc>,
}

impl EventLog {
    /// Build a log from a fetched payload
    pub fn new(events: Vec<GameEvent>, total_duration: f64) -> Self {
        Self {
            events,
            total_duration,
            loaded_at: Utc::now(),
        }
    }

    pub(crate) fn from_payload(payload: ReplayPayload) -> Self {
        Self::new(payload.events, payload.total_duration)
    }

    /// Number of events in the log
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Event at `index`, if in range
    pub fn get(&self, index: usize) -> Option<&GameEvent> {
        self.events.get(index)
    }

    /// Index of the final event, `None` for an empty log
    pub fn last_index(&self) -> Option<usize> {
        self.events.len().checked_sub(1)
    }

    /// All events, in order
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Wall-clock length of the recorded game in seconds (informational;
    /// playback timing is driven by the ticker, never by this)
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// When this log was loaded
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_log() {
        let log = EventLog::new(Vec::new(), 0.0);
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert_eq!(log.last_index(), None);
        assert!(log.get(0).is_none());
    }

    #[test]
    fn test_indexing() {
        let log = EventLog::new(
            vec![GameEvent::speak(1, "a"), GameEvent::kill(1)],
            10.0,
        );
        assert_eq!(log.len(), 2);
        assert_eq!(log.last_index(), Some(1));
        assert!(log.get(0).is_some());
        assert!(log.get(2).is_none());
        assert_eq!(log.total_duration(), 10.0);
    }
}
