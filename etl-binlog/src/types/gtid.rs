use std::fmt;
use std::str::FromStr;

use crate::bail;
use crate::error::{BinlogError, BinlogResult, ErrorKind};

/// Separator between GTID set entries of different sources.
const SID_SEPARATOR: char = ',';

/// Separator between a source identifier and its intervals.
const INTERVAL_SEPARATOR: char = ':';

/// Separator between the bounds of a multi-transaction interval.
const RANGE_SEPARATOR: char = '-';

/// Normalizes a source identifier for comparison.
///
/// Canonical UUIDs (`3e11fa47-71ca-11e1-9e33-c80aa9429562`) and compact forms
/// (`3E11FA4771CA11E19E33C80AA9429562`) normalize to the same value.
pub fn normalize_sid(sid: &str) -> String {
    sid.chars()
        .filter(|c| *c != RANGE_SEPARATOR)
        .flat_map(char::to_uppercase)
        .collect()
}

/// Renders a raw 16-byte source identifier as 32 uppercase hex characters.
pub fn render_sid(bytes: &[u8; 16]) -> String {
    let uuid = uuid::Uuid::from_bytes(*bytes);
    uuid.simple()
        .encode_upper(&mut uuid::Uuid::encode_buffer())
        .to_string()
}

/// A single global transaction identifier.
///
/// Textual form is `<sid>:<gno>` where `sid` is the normalized source identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gtid {
    sid: String,
    gno: u64,
}

impl Gtid {
    /// Creates a new [`Gtid`], normalizing the source identifier.
    pub fn new(sid: &str, gno: u64) -> Self {
        Self {
            sid: normalize_sid(sid),
            gno,
        }
    }

    /// Creates a [`Gtid`] from the raw 16 bytes stored in a binlog event.
    pub fn from_sid_bytes(sid: &[u8; 16], gno: u64) -> Self {
        Self {
            sid: render_sid(sid),
            gno,
        }
    }

    /// Returns the normalized source identifier.
    pub fn sid(&self) -> &str {
        &self.sid
    }

    /// Returns the transaction sequence number.
    pub fn gno(&self) -> u64 {
        self.gno
    }
}

impl fmt::Display for Gtid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{INTERVAL_SEPARATOR}{}", self.sid, self.gno)
    }
}

/// A closed range `[from, to]` of transaction sequence numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GtidInterval {
    pub from: u64,
    pub to: u64,
}

impl GtidInterval {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    /// Creates an interval covering exactly one sequence number.
    pub fn single(gno: u64) -> Self {
        Self { from: gno, to: gno }
    }

    /// Returns `true` if this interval fully covers `other`.
    pub fn covers(&self, other: &GtidInterval) -> bool {
        self.from <= other.from && self.to >= other.to
    }
}

impl FromStr for GtidInterval {
    type Err = BinlogError;

    /// Parses `N` as `[N, N]` and `N-M` as `[N, M]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let interval = match s.split_once(RANGE_SEPARATOR) {
            Some((from, to)) => GtidInterval::new(parse_gno(from)?, parse_gno(to)?),
            None => GtidInterval::single(parse_gno(s)?),
        };

        Ok(interval)
    }
}

impl fmt::Display for GtidInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{RANGE_SEPARATOR}{}", self.from, self.to)
    }
}

fn parse_gno(s: &str) -> BinlogResult<u64> {
    if !s.starts_with(|c: char| c.is_ascii_digit()) {
        bail!(
            ErrorKind::FormatError,
            "Invalid transaction number in GTID set",
            format!("`{s}` does not start with a digit")
        );
    }

    match s.parse::<u64>() {
        Ok(gno) => Ok(gno),
        Err(err) => bail!(
            ErrorKind::FormatError,
            "Invalid transaction number in GTID set",
            format!("`{s}` is not a non-negative integer"),
            source: err
        ),
    }
}

/// All intervals recorded for one source.
///
/// Intervals keep the order in which they were parsed or decoded; they are neither sorted nor
/// merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidIntervals {
    pub sid: String,
    pub intervals: Vec<GtidInterval>,
}

impl SidIntervals {
    pub fn new(sid: String, intervals: Vec<GtidInterval>) -> Self {
        Self { sid, intervals }
    }

    /// Returns `true` if some single interval of `self` covers `interval`.
    pub fn covers(&self, interval: &GtidInterval) -> bool {
        self.intervals.iter().any(|current| current.covers(interval))
    }
}

impl fmt::Display for SidIntervals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sid)?;
        for interval in &self.intervals {
            write!(f, "{INTERVAL_SEPARATOR}{interval}")?;
        }

        Ok(())
    }
}

/// A set of global transaction identifiers grouped by source.
///
/// Entries keep their parse/decode order and are not deduplicated by source identifier. Lookups
/// use the first entry with a matching source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GtidSet {
    sids: Vec<SidIntervals>,
}

impl GtidSet {
    pub fn new(sids: Vec<SidIntervals>) -> Self {
        Self { sids }
    }

    pub fn sids(&self) -> &[SidIntervals] {
        &self.sids
    }

    pub fn is_empty(&self) -> bool {
        self.sids.is_empty()
    }

    /// Returns the first entry recorded for `sid`, which must already be normalized.
    pub fn get(&self, sid: &str) -> Option<&SidIntervals> {
        self.sids.iter().find(|entry| entry.sid == sid)
    }

    /// Returns `true` if every interval of `reference` is covered by a single interval of the
    /// same source in `self`.
    ///
    /// Adjacent or overlapping intervals of `self` are not merged, so `1-5:6-10` does not contain
    /// `3-8`.
    pub fn contains(&self, reference: &GtidSet) -> bool {
        reference.sids.iter().all(|reference_sid| {
            let Some(current_sid) = self.get(&reference_sid.sid) else {
                return false;
            };

            reference_sid
                .intervals
                .iter()
                .all(|interval| current_sid.covers(interval))
        })
    }

    /// Returns `true` if `gtid` is covered by a single interval of its source.
    pub fn contains_gtid(&self, gtid: &Gtid) -> bool {
        self.get(gtid.sid())
            .is_some_and(|entry| entry.covers(&GtidInterval::single(gtid.gno())))
    }
}

impl From<Gtid> for GtidSet {
    fn from(gtid: Gtid) -> Self {
        GtidSet::new(vec![SidIntervals::new(
            gtid.sid,
            vec![GtidInterval::single(gtid.gno)],
        )])
    }
}

impl FromStr for GtidSet {
    type Err = BinlogError;

    /// Parses a textual GTID set such as `3E11FA47-71CA-11E1-9E33-C80AA9429562:1-5:7,ABC:3`.
    ///
    /// Empty or whitespace-only input yields the empty set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(GtidSet::default());
        }

        let mut sids = Vec::new();
        for entry in s.split(SID_SEPARATOR) {
            let entry = entry.trim();
            let mut parts = entry.split(INTERVAL_SEPARATOR);
            let sid = parts.next().unwrap_or_default();

            let intervals = parts
                .map(GtidInterval::from_str)
                .collect::<BinlogResult<Vec<_>>>()?;
            if intervals.is_empty() {
                bail!(
                    ErrorKind::FormatError,
                    "Invalid GTID set entry",
                    format!("`{entry}` has no transaction intervals")
                );
            }

            sids.push(SidIntervals::new(normalize_sid(sid), intervals));
        }

        Ok(GtidSet::new(sids))
    }
}

impl fmt::Display for GtidSet {
    /// Renders entries as `sid:from-to:from-to`, joined by commas in stored order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.sids.iter().enumerate() {
            if i > 0 {
                write!(f, "{SID_SEPARATOR}")?;
            }
            write!(f, "{entry}")?;
        }

        Ok(())
    }
}

/// Returns `true` if the GTID set described by `set_desc` contains every transaction described by
/// `gtid_desc`.
///
/// Both arguments use the textual GTID set syntax, so `gtid_desc` may be a single `sid:gno` or a
/// full set.
pub fn gtid_contains(set_desc: &str, gtid_desc: &str) -> BinlogResult<bool> {
    let current = GtidSet::from_str(set_desc)?;
    let reference = GtidSet::from_str(gtid_desc)?;

    Ok(current.contains(&reference))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SID_A: &str = "3E11FA47-71CA-11E1-9E33-C80AA9429562";
    const SID_A_COMPACT: &str = "3E11FA4771CA11E19E33C80AA9429562";
    const SID_B: &str = "e9b1a4d0-0000-11e1-8000-000000000001";

    fn parse(s: &str) -> GtidSet {
        s.parse().unwrap()
    }

    #[test]
    fn parse_empty_and_whitespace_yield_empty_set() {
        assert!(parse("").is_empty());
        assert!(parse("  \n\t ").is_empty());
    }

    #[test]
    fn parse_normalizes_sid_and_intervals() {
        let set = parse(&format!("{SID_A}:1-5:7, {SID_B}:3"));

        assert_eq!(
            set.sids(),
            &[
                SidIntervals::new(
                    SID_A_COMPACT.to_string(),
                    vec![GtidInterval::new(1, 5), GtidInterval::single(7)]
                ),
                SidIntervals::new(
                    "E9B1A4D0000011E18000000000000001".to_string(),
                    vec![GtidInterval::single(3)]
                ),
            ]
        );
    }

    #[test]
    fn parse_canonical_and_compact_sids_are_equivalent() {
        let canonical = parse(&format!("{}:1-10", SID_A.to_lowercase()));
        let compact = parse(&format!("{SID_A_COMPACT}:1-10"));

        assert_eq!(canonical, compact);
    }

    #[test]
    fn parse_keeps_unsorted_and_duplicate_entries() {
        let set = parse("abc:9-10:1-2,abc:5");

        assert_eq!(set.sids().len(), 2);
        assert_eq!(
            set.sids()[0].intervals,
            vec![GtidInterval::new(9, 10), GtidInterval::new(1, 2)]
        );
    }

    #[test]
    fn parse_rejects_entry_without_intervals() {
        let err = "abc".parse::<GtidSet>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatError);

        let err = "abc:1,".parse::<GtidSet>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FormatError);
    }

    #[test]
    fn parse_rejects_invalid_numbers() {
        for input in [
            "abc:x",
            "abc:1-",
            "abc:-3",
            "abc:1-2-3",
            "abc:1:",
            "abc:18446744073709551616",
            "abc:+5",
            "abc:1-+2",
            "abc: 5",
        ] {
            let err = input.parse::<GtidSet>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::FormatError, "input: {input}");
        }
    }

    #[test]
    fn render_uses_stored_order_and_ranges() {
        let set = parse(&format!("{SID_A}:1-5:7,abc:3"));

        insta::assert_snapshot!(set.to_string(), @"3E11FA4771CA11E19E33C80AA9429562:1-5:7-7,ABC:3-3");
    }

    #[test]
    fn parse_render_parse_is_equivalent() {
        let inputs = vec![
            String::new(),
            "abc:1".to_string(),
            format!("{SID_A}:1-5:7:100-200, {SID_B}:3"),
            "abc:9-10:1-2,def:5".to_string(),
        ];

        for input in &inputs {
            let first = parse(input);
            let second = parse(&first.to_string());

            assert!(first.contains(&second), "input: {input}");
            assert!(second.contains(&first), "input: {input}");
        }
    }

    #[test]
    fn contains_itself_and_empty_set() {
        let set = parse(&format!("{SID_A}:1-5:7,{SID_B}:3-9"));

        assert!(set.contains(&set));
        assert!(set.contains(&GtidSet::default()));
        assert!(GtidSet::default().contains(&GtidSet::default()));
    }

    #[test]
    fn contains_fails_when_reference_sid_missing() {
        let current = parse(&format!("{SID_A}:1-100"));
        let reference = parse(&format!("{SID_A}:1-5,{SID_B}:1"));

        assert!(!current.contains(&reference));
        assert!(!GtidSet::default().contains(&reference));
    }

    #[test]
    fn contains_requires_single_covering_interval() {
        let current = parse("abc:1-5:6-10");

        assert!(current.contains(&parse("abc:2-4")));
        assert!(current.contains(&parse("abc:6-10:1")));
        assert!(!current.contains(&parse("abc:3-8")));
        assert!(!current.contains(&parse("abc:11")));
    }

    #[test]
    fn contains_gtid_matches_normalized_sid() {
        let set = parse(&format!("{}:1-5", SID_A.to_lowercase()));

        assert!(set.contains_gtid(&Gtid::new(SID_A, 5)));
        assert!(!set.contains_gtid(&Gtid::new(SID_A, 6)));
        assert!(!set.contains_gtid(&Gtid::new(SID_B, 1)));
    }

    #[test]
    fn gtid_contains_accepts_textual_forms() {
        let set = format!("{SID_A}:1-5");

        assert!(gtid_contains(&set, &format!("{SID_A_COMPACT}:3")).unwrap());
        assert!(!gtid_contains(&set, &format!("{SID_A_COMPACT}:6")).unwrap());
        assert!(gtid_contains(&set, "").unwrap());
        assert_eq!(
            gtid_contains("abc", "abc:1").unwrap_err().kind(),
            ErrorKind::FormatError
        );
    }

    #[test]
    fn gtid_display_and_from_sid_bytes() {
        let gtid = Gtid::from_sid_bytes(&[0xab; 16], 42);

        assert_eq!(gtid.sid(), "ABABABABABABABABABABABABABABABAB");
        assert_eq!(gtid.to_string(), "ABABABABABABABABABABABABABABABAB:42");
        assert_eq!(GtidSet::from(gtid.clone()), parse(&gtid.to_string()));
    }
}
