use byteorder::{ByteOrder, LittleEndian};

use crate::bail;
use crate::error::{BinlogResult, ErrorKind};
use crate::types::{
    EVENT_HEADER_SIZE, EventHeader, EventType, Gtid, GtidInterval, GtidSet, SidIntervals,
    render_sid,
};

/// Size of the raw source identifier stored in GTID payloads.
const SID_SIZE: usize = 16;

/// Minimum payload size of a GTID event: flags, sid and sequence number.
pub const GTID_EVENT_MIN_PAYLOAD_SIZE: usize = 1 + SID_SIZE + 8;

/// Builds an [`EventHeader`] from the 19 bytes of a common event header.
///
/// Layout, all little-endian: timestamp (4), type code (1), server id (4), event length (4),
/// next position (4), flags (2).
pub fn parse_event_header(bytes: &[u8; EVENT_HEADER_SIZE]) -> EventHeader {
    EventHeader {
        timestamp: LittleEndian::read_u32(&bytes[0..4]),
        event_type: EventType::from(bytes[4]),
        server_id: LittleEndian::read_u32(&bytes[5..9]),
        event_length: LittleEndian::read_u32(&bytes[9..13]),
        next_position: LittleEndian::read_u32(&bytes[13..17]),
        flags: LittleEndian::read_u16(&bytes[17..19]),
    }
}

/// Extracts the [`Gtid`] from the payload of a GTID log event.
///
/// Byte 0 holds the commit flag and is ignored, bytes 1..17 hold the source identifier and bytes
/// 17..25 the little-endian sequence number.
pub fn parse_gtid_event(payload: &[u8]) -> BinlogResult<Gtid> {
    if payload.len() < GTID_EVENT_MIN_PAYLOAD_SIZE {
        bail!(
            ErrorKind::FormatError,
            "GTID event payload is too short",
            format!(
                "expected at least {GTID_EVENT_MIN_PAYLOAD_SIZE} bytes, got {}",
                payload.len()
            )
        );
    }

    let mut reader = PayloadReader::new(&payload[1..]);
    let sid = reader.read_sid()?;
    let gno = reader.read_u64()?;

    Ok(Gtid::from_sid_bytes(&sid, gno))
}

/// Builds a [`GtidSet`] from the payload of a previous-GTIDs log event.
///
/// On disk every interval stores an exclusive upper bound; the returned intervals are inclusive.
pub fn parse_previous_gtids_event(payload: &[u8]) -> BinlogResult<GtidSet> {
    let mut reader = PayloadReader::new(payload);

    let sid_count = reader.read_u64()?;
    let mut sids = Vec::new();
    for _ in 0..sid_count {
        let sid = reader.read_sid()?;
        let interval_count = reader.read_u64()?;

        let mut intervals = Vec::new();
        for _ in 0..interval_count {
            let from = reader.read_u64()?;
            let exclusive_to = reader.read_u64()?;
            let Some(to) = exclusive_to.checked_sub(1) else {
                bail!(
                    ErrorKind::FormatError,
                    "Invalid interval in previous-GTIDs event",
                    format!(
                        "exclusive upper bound is zero at payload offset {}",
                        reader.position() - 8
                    )
                );
            };
            intervals.push(GtidInterval::new(from, to));
        }

        sids.push(SidIntervals::new(render_sid(&sid), intervals));
    }

    Ok(GtidSet::new(sids))
}

/// Sequential little-endian reader over an event payload.
///
/// Reading past the end is a [`ErrorKind::FormatError`] since the payload length is already known.
struct PayloadReader<'a> {
    payload: &'a [u8],
    position: usize,
}

impl<'a> PayloadReader<'a> {
    fn new(payload: &'a [u8]) -> Self {
        Self {
            payload,
            position: 0,
        }
    }

    fn position(&self) -> usize {
        self.position
    }

    fn take(&mut self, len: usize) -> BinlogResult<&'a [u8]> {
        let available = self.payload.len() - self.position;
        if available < len {
            bail!(
                ErrorKind::FormatError,
                "Event payload is truncated",
                format!(
                    "expected {len} bytes at payload offset {}, {available} available",
                    self.position
                )
            );
        }

        let bytes = &self.payload[self.position..self.position + len];
        self.position += len;

        Ok(bytes)
    }

    fn read_u64(&mut self) -> BinlogResult<u64> {
        Ok(LittleEndian::read_u64(self.take(8)?))
    }

    fn read_sid(&mut self) -> BinlogResult<[u8; SID_SIZE]> {
        let mut sid = [0; SID_SIZE];
        sid.copy_from_slice(self.take(SID_SIZE)?);

        Ok(sid)
    }
}
