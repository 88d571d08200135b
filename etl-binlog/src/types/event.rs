use bytes::Bytes;
use std::fmt;

/// Size in bytes of the marker that opens every binlog file.
pub const BINLOG_MAGIC_SIZE: u64 = 4;

/// The marker that opens every binlog file (`\xfebin`).
pub const BINLOG_MAGIC: [u8; 4] = [0xfe, b'b', b'i', b'n'];

/// Size in bytes of the common header that precedes every event payload.
pub const EVENT_HEADER_SIZE: usize = 19;

/// Event type code of a GTID log event.
pub const GTID_LOG_EVENT: u8 = 33;

/// Event type code of an anonymous GTID log event.
pub const ANONYMOUS_GTID_LOG_EVENT: u8 = 34;

/// Event type code of a previous-GTIDs log event.
pub const PREVIOUS_GTIDS_LOG_EVENT: u8 = 35;

/// Binlog event types this crate distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Starts a transaction and names its GTID.
    Gtid,
    /// Starts a transaction that carries no GTID.
    AnonymousGtid,
    /// Snapshot of every GTID written to earlier binlog files.
    PreviousGtids,
    /// Any other event; only its length is used.
    Other(u8),
}

impl From<u8> for EventType {
    fn from(code: u8) -> Self {
        match code {
            GTID_LOG_EVENT => EventType::Gtid,
            ANONYMOUS_GTID_LOG_EVENT => EventType::AnonymousGtid,
            PREVIOUS_GTIDS_LOG_EVENT => EventType::PreviousGtids,
            other => EventType::Other(other),
        }
    }
}

impl From<EventType> for u8 {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Gtid => GTID_LOG_EVENT,
            EventType::AnonymousGtid => ANONYMOUS_GTID_LOG_EVENT,
            EventType::PreviousGtids => PREVIOUS_GTIDS_LOG_EVENT,
            EventType::Other(code) => code,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Gtid => write!(f, "GTID_LOG_EVENT"),
            EventType::AnonymousGtid => write!(f, "ANONYMOUS_GTID_LOG_EVENT"),
            EventType::PreviousGtids => write!(f, "PREVIOUS_GTIDS_LOG_EVENT"),
            EventType::Other(code) => write!(f, "EVENT({code})"),
        }
    }
}

/// Common header shared by every binlog event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHeader {
    /// Seconds since the Unix epoch when the statement started.
    pub timestamp: u32,
    pub event_type: EventType,
    /// Id of the server that originally wrote the event.
    pub server_id: u32,
    /// Total size of the event including this header.
    pub event_length: u32,
    /// Offset of the next event, as recorded by the writer.
    pub next_position: u32,
    pub flags: u16,
}

impl EventHeader {
    /// Returns the number of payload bytes that follow the header.
    pub fn payload_length(&self) -> usize {
        (self.event_length as usize).saturating_sub(EVENT_HEADER_SIZE)
    }
}

/// An event read by the binlog scanner.
///
/// The payload is only present for event types the scanner was asked to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinlogEvent {
    /// Absolute file offset of the event header.
    pub offset: u64,
    pub header: EventHeader,
    pub payload: Option<Bytes>,
}

impl BinlogEvent {
    pub fn event_type(&self) -> EventType {
        self.header.event_type
    }
}
