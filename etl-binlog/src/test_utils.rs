//! Builders for synthetic binlogs used in tests.

use crate::types::{BINLOG_MAGIC, EVENT_HEADER_SIZE, GTID_LOG_EVENT, PREVIOUS_GTIDS_LOG_EVENT};

/// Payload size of GTID events written by [`BinlogBuilder::gtid_event`].
pub const GTID_EVENT_PAYLOAD_SIZE: usize = 46;

/// Builds an in-memory binlog event by event.
///
/// Every `*_event` method returns the offset at which the event starts.
#[derive(Debug, Clone)]
pub struct BinlogBuilder {
    bytes: Vec<u8>,
}

impl BinlogBuilder {
    pub fn new() -> Self {
        Self {
            bytes: BINLOG_MAGIC.to_vec(),
        }
    }

    /// Appends an event whose header declares `event_length`, followed by `payload` as-is.
    pub fn raw_event(&mut self, type_code: u8, event_length: u32, payload: &[u8]) -> u64 {
        let offset = self.bytes.len() as u64;
        let next_position = (offset as u32).wrapping_add(event_length);

        self.bytes.extend_from_slice(&1_700_000_000u32.to_le_bytes());
        self.bytes.push(type_code);
        self.bytes.extend_from_slice(&1u32.to_le_bytes());
        self.bytes.extend_from_slice(&event_length.to_le_bytes());
        self.bytes.extend_from_slice(&next_position.to_le_bytes());
        self.bytes.extend_from_slice(&0u16.to_le_bytes());
        self.bytes.extend_from_slice(payload);

        offset
    }

    /// Appends an event with a consistent length.
    pub fn event(&mut self, type_code: u8, payload: &[u8]) -> u64 {
        let event_length = (EVENT_HEADER_SIZE + payload.len()) as u32;
        self.raw_event(type_code, event_length, payload)
    }

    /// Appends a zero-filled event of `event_length` total bytes.
    pub fn other_event(&mut self, type_code: u8, event_length: u32) -> u64 {
        let payload = vec![0u8; event_length as usize - EVENT_HEADER_SIZE];
        self.event(type_code, &payload)
    }

    /// Appends a GTID event for `sid:gno`.
    pub fn gtid_event(&mut self, sid: [u8; 16], gno: u64) -> u64 {
        let mut payload = Vec::with_capacity(GTID_EVENT_PAYLOAD_SIZE);
        payload.push(1);
        payload.extend_from_slice(&sid);
        payload.extend_from_slice(&gno.to_le_bytes());
        payload.resize(GTID_EVENT_PAYLOAD_SIZE, 0);

        self.event(GTID_LOG_EVENT, &payload)
    }

    /// Appends a previous-GTIDs event.
    ///
    /// Intervals are given as stored on disk, with an exclusive upper bound.
    pub fn previous_gtids_event(&mut self, sids: &[([u8; 16], Vec<(u64, u64)>)]) -> u64 {
        let mut payload = (sids.len() as u64).to_le_bytes().to_vec();
        for (sid, intervals) in sids {
            payload.extend_from_slice(sid);
            payload.extend_from_slice(&(intervals.len() as u64).to_le_bytes());
            for (from, exclusive_to) in intervals {
                payload.extend_from_slice(&from.to_le_bytes());
                payload.extend_from_slice(&exclusive_to.to_le_bytes());
            }
        }

        self.event(PREVIOUS_GTIDS_LOG_EVENT, &payload)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

impl Default for BinlogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
