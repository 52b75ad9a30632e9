//! Append-only event log.
//!
//! Each state machine publishes its outcomes as an ordered sequence of
//! immutable records. External indexers page through the log with a
//! sequence cursor. Entries are never rewritten; the only removal is a
//! node discarding a tail that never reached storage.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Address, Bytes32, Timestamp, TokenId};

/// A value an event is indexed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "topic", content = "value", rename_all = "snake_case")]
pub enum Topic {
    Token(TokenId),
    Address(Address),
    Id(Bytes32),
}

/// Implemented by event enums that can be appended to an [`EventLog`].
pub trait IndexedEvent {
    /// Stable event name, e.g. `"CredentialIssued"`.
    fn kind(&self) -> &'static str;

    /// Indexed fields of this event.
    fn topics(&self) -> Vec<Topic>;
}

/// One immutable record in an [`EventLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry<E> {
    /// Position in the log, starting at 0.
    pub seq: u64,
    /// Ledger time of the mutation that produced the event.
    pub timestamp: Timestamp,
    /// The event payload.
    pub event: E,
}

/// Ordered, append-only sequence of events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLog<E> {
    entries: Vec<LogEntry<E>>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E> EventLog<E> {
    /// Rebuild a log from entries read back from storage. Sequence numbers
    /// must run from 0 without gaps.
    pub fn from_entries(entries: Vec<LogEntry<E>>) -> Result<Self, CoreError> {
        for (expected, entry) in entries.iter().enumerate() {
            if entry.seq != expected as u64 {
                return Err(CoreError::EventSequence {
                    expected: expected as u64,
                    found: entry.seq,
                });
            }
        }
        Ok(Self { entries })
    }

    /// Drop every entry with `seq >= len`.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }
}

impl<E: IndexedEvent> EventLog<E> {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number.
    pub fn append(&mut self, timestamp: Timestamp, event: E) -> u64 {
        let seq = self.entries.len() as u64;
        tracing::trace!(seq, kind = event.kind(), "event appended");
        self.entries.push(LogEntry {
            seq,
            timestamp,
            event,
        });
        seq
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in order.
    pub fn entries(&self) -> &[LogEntry<E>] {
        &self.entries
    }

    /// Entries with `seq >= from`.
    pub fn since(&self, from: u64) -> &[LogEntry<E>] {
        let start = usize::try_from(from)
            .unwrap_or(usize::MAX)
            .min(self.entries.len());
        &self.entries[start..]
    }

    /// Up to `limit` entries, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&LogEntry<E>> {
        self.entries.iter().rev().take(limit).collect()
    }

    /// Entries indexed under `topic`, oldest first.
    pub fn by_topic(&self, topic: &Topic) -> Vec<&LogEntry<E>> {
        self.entries
            .iter()
            .filter(|e| e.event.topics().contains(topic))
            .collect()
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&LogEntry<E>> {
        self.entries.last()
    }
}
