use std::io::{Read, Seek};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, trace};

use crate::config::ResolverConfig;
use crate::conversions::event::{parse_gtid_event, parse_previous_gtids_event};
use crate::error::BinlogResult;
use crate::replication::scanner::BinlogScanner;
use crate::types::{EventType, Gtid, GtidSet};

/// Decides whether a transaction has already been applied.
///
/// Implemented by [`GtidSet`] and by any `Fn(&Gtid) -> BinlogResult<bool>` closure.
pub trait AppliedGtids {
    fn is_applied(&self, gtid: &Gtid) -> BinlogResult<bool>;
}

impl AppliedGtids for GtidSet {
    fn is_applied(&self, gtid: &Gtid) -> BinlogResult<bool> {
        Ok(self.contains_gtid(gtid))
    }
}

impl<F> AppliedGtids for F
where
    F: Fn(&Gtid) -> BinlogResult<bool>,
{
    fn is_applied(&self, gtid: &Gtid) -> BinlogResult<bool> {
        self(gtid)
    }
}

/// Returns the offset at which replay of `reader` should resume.
///
/// Events are scanned from offset 4. Non-GTID events are skipped by length. The offset of the
/// first GTID event whose transaction is not applied is returned, or, when
/// [`ResolverConfig::include_event_before_first`] is set and an applied transaction precedes it,
/// the offset of the last applied GTID event.
///
/// If every transaction in the binlog is applied, the scan runs off the end of the stream and the
/// resulting [`crate::error::ErrorKind::ShortRead`] error is returned; there is no
/// "nothing to resume" result.
pub fn resolve_resume_position<R, A>(
    reader: R,
    applied: &A,
    config: &ResolverConfig,
) -> BinlogResult<u64>
where
    R: Read + Seek,
    A: AppliedGtids + ?Sized,
{
    let mut scanner = BinlogScanner::new(reader, |event_type| event_type == EventType::Gtid)
        .verify_magic(config.verify_magic);
    let mut last_applied_position: Option<u64> = None;

    loop {
        let event = scanner.next_event()?;
        if event.event_type() != EventType::Gtid {
            continue;
        }

        let gtid = parse_gtid_event(event.payload.as_deref().unwrap_or_default())?;
        if applied.is_applied(&gtid)? {
            trace!(%gtid, offset = event.offset, "transaction already applied");
            last_applied_position = Some(event.offset);
            continue;
        }

        let position = match last_applied_position {
            Some(last_applied) if config.include_event_before_first => last_applied,
            _ => event.offset,
        };

        info!(
            %gtid,
            unapplied_offset = event.offset,
            position,
            "resolved binlog resume position"
        );

        return Ok(position);
    }
}

/// Opens the binlog at `path` and resolves its resume position against the textual GTID set
/// `executed_gtids`.
///
/// The file handle is closed on every return path.
pub fn resolve_resume_position_in_file(
    path: impl AsRef<Path>,
    executed_gtids: &str,
    config: &ResolverConfig,
) -> BinlogResult<u64> {
    let path = path.as_ref();
    let applied = GtidSet::from_str(executed_gtids)?;

    debug!(
        path = %path.display(),
        executed_gtids = %applied,
        include_event_before_first = config.include_event_before_first,
        "resolving binlog resume position"
    );

    let file = std::fs::File::open(path)?;
    resolve_resume_position(file, &applied, config)
}

/// Returns the GTID set recorded by the first previous-GTIDs event of `reader`.
///
/// Scanning runs off the end of the stream with a [`crate::error::ErrorKind::ShortRead`] error if
/// no such event exists.
pub fn read_previous_gtids<R>(reader: R) -> BinlogResult<GtidSet>
where
    R: Read + Seek,
{
    let mut scanner =
        BinlogScanner::new(reader, |event_type| event_type == EventType::PreviousGtids);

    loop {
        let event = scanner.next_event()?;
        if event.event_type() != EventType::PreviousGtids {
            continue;
        }

        let gtids = parse_previous_gtids_event(event.payload.as_deref().unwrap_or_default())?;
        debug!(offset = event.offset, previous_gtids = %gtids, "read previous gtids");

        return Ok(gtids);
    }
}

/// Opens the binlog at `path` and returns its previous-GTIDs snapshot.
pub fn read_previous_gtids_from_path(path: impl AsRef<Path>) -> BinlogResult<GtidSet> {
    let file = std::fs::File::open(path.as_ref())?;
    read_previous_gtids(file)
}
