//! Configuration for binlog scans.

/// Configuration for resolving a resume position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Resume from the last already-applied transaction instead of the first unapplied one, when
    /// such a transaction exists in the scanned file.
    pub include_event_before_first: bool,

    /// Check the 4-byte binlog marker before reading the first event.
    pub verify_magic: bool,
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to resume from the last already-applied transaction.
    pub fn with_include_event_before_first(mut self, include_event_before_first: bool) -> Self {
        self.include_event_before_first = include_event_before_first;
        self
    }

    /// Sets whether to check the binlog marker.
    pub fn with_verify_magic(mut self, verify_magic: bool) -> Self {
        self.verify_magic = verify_magic;
        self
    }
}
