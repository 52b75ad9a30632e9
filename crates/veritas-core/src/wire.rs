//! Protobuf framing for event log entries.
//!
//! Indexers consume events without linking against the Rust event enums:
//! every entry is wrapped in an [`EventEnvelope`] carrying its stream,
//! sequence, kind, topics and a JSON payload.

use bytes::BytesMut;
use prost::Message;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::CoreError;
use crate::events::{IndexedEvent, LogEntry, Topic};

/// Transport-neutral wrapper around one log entry.
#[derive(Clone, PartialEq, prost::Message)]
pub struct EventEnvelope {
    /// Which log the entry came from, e.g. `"registry"`.
    #[prost(string, tag = "1")]
    pub stream: String,
    #[prost(uint64, tag = "2")]
    pub seq: u64,
    #[prost(uint64, tag = "3")]
    pub timestamp: u64,
    /// Event name as reported by [`IndexedEvent::kind`].
    #[prost(string, tag = "4")]
    pub kind: String,
    /// Indexed values rendered as strings (token ids in decimal, addresses
    /// and 32-byte ids in `0x` hex).
    #[prost(string, repeated, tag = "5")]
    pub topics: Vec<String>,
    /// JSON encoding of the event.
    #[prost(bytes = "vec", tag = "6")]
    pub payload: Vec<u8>,
}

fn render_topic(topic: &Topic) -> String {
    match topic {
        Topic::Token(id) => id.to_string(),
        Topic::Address(a) => a.to_hex(),
        Topic::Id(id) => id.to_hex(),
    }
}

impl EventEnvelope {
    /// Wrap a log entry.
    pub fn wrap<E>(stream: &str, entry: &LogEntry<E>) -> Result<Self, CoreError>
    where
        E: IndexedEvent + Serialize,
    {
        Ok(Self {
            stream: stream.to_string(),
            seq: entry.seq,
            timestamp: entry.timestamp,
            kind: entry.event.kind().to_string(),
            topics: entry.event.topics().iter().map(render_topic).collect(),
            payload: serde_json::to_vec(&entry.event)?,
        })
    }

    /// Recover the typed log entry.
    pub fn unwrap_entry<E: DeserializeOwned>(&self) -> Result<LogEntry<E>, CoreError> {
        Ok(LogEntry {
            seq: self.seq,
            timestamp: self.timestamp,
            event: serde_json::from_slice(&self.payload)?,
        })
    }

    /// Protobuf-encode this envelope.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;
        Ok(buf.to_vec())
    }

    /// Decode a protobuf-encoded envelope.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CoreError> {
        Ok(Self::decode(data)?)
    }
}
