use bytes::Bytes;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace};

use crate::bail;
use crate::conversions::event::parse_event_header;
use crate::error::{BinlogResult, ErrorKind};
use crate::types::{BINLOG_MAGIC, BINLOG_MAGIC_SIZE, BinlogEvent, EVENT_HEADER_SIZE, EventType};

/// Sequential reader over the events of a binlog.
///
/// Each pull seeks to the current cursor, reads the 19-byte common header and, only if the
/// payload predicate accepts the event type, the payload. The cursor then advances by the event
/// length. The first event is read at offset 4, right after the file marker.
///
/// The binlog has no end-of-stream event this scanner recognizes, so reaching the end of the
/// source surfaces as an [`ErrorKind::ShortRead`] error. As an [`Iterator`], the scanner yields
/// that error once and then stops.
#[must_use = "iterators do nothing unless consumed"]
pub struct BinlogScanner<R, F> {
    reader: R,
    wants_payload: F,
    position: u64,
    verify_magic: bool,
    finished: bool,
}

impl<F> BinlogScanner<File, F>
where
    F: FnMut(EventType) -> bool,
{
    /// Opens the binlog at `path` for scanning.
    ///
    /// The file handle is released when the scanner is dropped.
    pub fn open(path: impl AsRef<Path>, wants_payload: F) -> BinlogResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        debug!(path = %path.display(), "opened binlog for scanning");

        Ok(BinlogScanner::new(file, wants_payload))
    }
}

impl<R, F> BinlogScanner<R, F>
where
    R: Read + Seek,
    F: FnMut(EventType) -> bool,
{
    /// Creates a scanner over `reader`, fetching payloads for the event types accepted by
    /// `wants_payload`.
    pub fn new(reader: R, wants_payload: F) -> Self {
        Self {
            reader,
            wants_payload,
            position: BINLOG_MAGIC_SIZE,
            verify_magic: false,
            finished: false,
        }
    }

    /// Sets whether the file marker is checked before the first event is read.
    pub fn verify_magic(mut self, verify_magic: bool) -> Self {
        self.verify_magic = verify_magic;
        self
    }

    /// Returns the offset at which the next event will be read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads the event at the current cursor and advances past it.
    pub fn next_event(&mut self) -> BinlogResult<BinlogEvent> {
        if self.verify_magic {
            self.check_magic()?;
            self.verify_magic = false;
        }

        let offset = self.position;
        self.reader.seek(SeekFrom::Start(offset))?;

        let mut header_bytes = [0u8; EVENT_HEADER_SIZE];
        let read = read_full(&mut self.reader, &mut header_bytes)?;
        if read < EVENT_HEADER_SIZE {
            bail!(
                ErrorKind::ShortRead,
                "Binlog ended while reading an event header",
                format!(
                    "expected {EVENT_HEADER_SIZE} header bytes at offset {offset}, {read} available"
                )
            );
        }

        let header = parse_event_header(&header_bytes);
        if (header.event_length as usize) < EVENT_HEADER_SIZE {
            bail!(
                ErrorKind::FormatError,
                "Binlog event length is smaller than its header",
                format!(
                    "event at offset {offset} declares length {}",
                    header.event_length
                )
            );
        }

        let payload = if (self.wants_payload)(header.event_type) {
            let payload_offset = offset + EVENT_HEADER_SIZE as u64;
            let payload_length = header.payload_length();
            let mut payload = Vec::new();
            (&mut self.reader)
                .take(payload_length as u64)
                .read_to_end(&mut payload)?;
            let read = payload.len();
            if read < payload_length {
                bail!(
                    ErrorKind::ShortRead,
                    "Binlog ended while reading an event payload",
                    format!(
                        "expected {payload_length} payload bytes at offset {payload_offset}, {read} available"
                    )
                );
            }

            Some(Bytes::from(payload))
        } else {
            None
        };

        self.position = offset + u64::from(header.event_length);

        trace!(
            offset,
            event_type = %header.event_type,
            event_length = header.event_length,
            payload_fetched = payload.is_some(),
            "read binlog event"
        );

        Ok(BinlogEvent {
            offset,
            header,
            payload,
        })
    }

    fn check_magic(&mut self) -> BinlogResult<()> {
        self.reader.seek(SeekFrom::Start(0))?;

        let mut magic = [0u8; BINLOG_MAGIC_SIZE as usize];
        let read = read_full(&mut self.reader, &mut magic)?;
        if read < magic.len() {
            bail!(
                ErrorKind::ShortRead,
                "Binlog ended while reading the file marker",
                format!("expected {} bytes, {read} available", magic.len())
            );
        }

        if magic != BINLOG_MAGIC {
            bail!(
                ErrorKind::FormatError,
                "Binlog file marker is invalid",
                format!("expected {BINLOG_MAGIC:02x?}, found {magic:02x?}")
            );
        }

        Ok(())
    }
}

impl<R, F> Iterator for BinlogScanner<R, F>
where
    R: Read + Seek,
    F: FnMut(EventType) -> bool,
{
    type Item = BinlogResult<BinlogEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.next_event();
        if result.is_err() {
            self.finished = true;
        }

        Some(result)
    }
}

/// Reads until `buf` is full or the reader is exhausted, returning the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(filled)
}
