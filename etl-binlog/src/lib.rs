//! Locates where replay of a MySQL binary log should resume.
//!
//! Given a binlog file and the GTID set already applied elsewhere, [`resolve_resume_position`]
//! walks the binlog event by event and returns the offset of the first GTID event whose
//! transaction is not part of that set.
//!
//! # Usage
//!
//! ```rust,no_run
//! use etl_binlog::{ResolverConfig, resolve_resume_position_in_file};
//!
//! let config = ResolverConfig::new().with_include_event_before_first(true);
//! let position = resolve_resume_position_in_file(
//!     "/var/lib/mysql/binlog.000042",
//!     "3E11FA47-71CA-11E1-9E33-C80AA9429562:1-1500",
//!     &config,
//! )?;
//! println!("resume at {position}");
//! # Ok::<(), etl_binlog::error::BinlogError>(())
//! ```

mod config;
pub mod conversions;
pub mod error;
mod macros;
pub mod replication;
#[cfg(test)]
mod test_utils;
pub mod types;

pub use config::ResolverConfig;
pub use error::{BinlogError, BinlogResult, ErrorKind};
pub use replication::resolver::{
    AppliedGtids, read_previous_gtids, read_previous_gtids_from_path, resolve_resume_position,
    resolve_resume_position_in_file,
};
pub use replication::scanner::BinlogScanner;
pub use types::{Gtid, GtidInterval, GtidSet, SidIntervals, gtid_contains};
