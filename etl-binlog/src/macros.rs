//! Macros for binlog error handling.

/// Creates a [`crate::error::BinlogError`] from error kind and description.
///
/// Accepts an optional dynamic detail, and a source error when a detail is given.
#[macro_export]
macro_rules! binlog_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::BinlogError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::BinlogError::from(($kind, $desc, $detail.to_string()))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        $crate::error::BinlogError::from(($kind, $desc, $detail.to_string())).with_source($source)
    };
}

/// Creates and returns a [`crate::error::BinlogError`] from the current function.
///
/// Supports the same optional detail and source arguments as [`binlog_error!`].
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return ::core::result::Result::Err($crate::binlog_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return ::core::result::Result::Err($crate::binlog_error!($kind, $desc, $detail))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::binlog_error!(
            $kind,
            $desc,
            $detail,
            source: $source
        ))
    };
}
