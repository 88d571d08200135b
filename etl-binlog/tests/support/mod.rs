use std::io::Write;

use tempfile::NamedTempFile;

pub const SID: [u8; 16] = [
    0x3e, 0x11, 0xfa, 0x47, 0x71, 0xca, 0x11, 0xe1, 0x9e, 0x33, 0xc8, 0x0a, 0xa9, 0x42, 0x95, 0x62,
];
pub const SID_TEXT: &str = "3e11fa47-71ca-11e1-9e33-c80aa9429562";

const FORMAT_DESCRIPTION_EVENT: u8 = 15;
const QUERY_EVENT: u8 = 2;
const XID_EVENT: u8 = 16;
const GTID_LOG_EVENT: u8 = 33;
const PREVIOUS_GTIDS_LOG_EVENT: u8 = 35;

/// Writes a synthetic binlog to a temporary file.
pub struct TestBinlog {
    bytes: Vec<u8>,
    gtid_offsets: Vec<u64>,
}

impl TestBinlog {
    /// Starts a binlog with a format description event and a previous-GTIDs event recording
    /// `previous` (inclusive intervals) for [`SID`].
    pub fn new(previous: &[(u64, u64)]) -> Self {
        let mut binlog = Self {
            bytes: vec![0xfe, b'b', b'i', b'n'],
            gtid_offsets: Vec::new(),
        };

        binlog.push_event(FORMAT_DESCRIPTION_EVENT, &[0; 100]);

        let mut payload = 1u64.to_le_bytes().to_vec();
        payload.extend_from_slice(&SID);
        payload.extend_from_slice(&(previous.len() as u64).to_le_bytes());
        for (from, to) in previous {
            payload.extend_from_slice(&from.to_le_bytes());
            payload.extend_from_slice(&(to + 1).to_le_bytes());
        }
        binlog.push_event(PREVIOUS_GTIDS_LOG_EVENT, &payload);

        binlog
    }

    /// Appends a transaction: GTID event, query event and XID event.
    pub fn transaction(mut self, gno: u64) -> Self {
        let mut payload = vec![1];
        payload.extend_from_slice(&SID);
        payload.extend_from_slice(&gno.to_le_bytes());
        payload.resize(46, 0);

        let offset = self.push_event(GTID_LOG_EVENT, &payload);
        self.gtid_offsets.push(offset);

        self.push_event(QUERY_EVENT, b"\0\0\0\0\0\0\0\0INSERT INTO t VALUES (1)");
        self.push_event(XID_EVENT, &gno.to_le_bytes());

        self
    }

    pub fn gtid_offsets(&self) -> &[u64] {
        &self.gtid_offsets
    }

    pub fn write(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("failed to create temp binlog");
        file.write_all(&self.bytes)
            .expect("failed to write temp binlog");
        file.flush().expect("failed to flush temp binlog");
        file
    }

    fn push_event(&mut self, type_code: u8, payload: &[u8]) -> u64 {
        let offset = self.bytes.len() as u64;
        let event_length = (19 + payload.len()) as u32;

        self.bytes.extend_from_slice(&0u32.to_le_bytes());
        self.bytes.push(type_code);
        self.bytes.extend_from_slice(&1u32.to_le_bytes());
        self.bytes.extend_from_slice(&event_length.to_le_bytes());
        self.bytes
            .extend_from_slice(&(offset as u32 + event_length).to_le_bytes());
        self.bytes.extend_from_slice(&0u16.to_le_bytes());
        self.bytes.extend_from_slice(payload);

        offset
    }
}
