//! Error types and result definitions for binlog scanning.
//!
//! Every fallible operation in this crate returns [`BinlogResult`]. A [`BinlogError`] carries an
//! [`ErrorKind`] for classification, a static description, optional dynamic detail (offsets,
//! expected versus available lengths), the originating error if any, and the callsite where it was
//! created.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::io;
use std::panic::Location;
use std::sync::Arc;

/// Convenient result type for binlog operations using [`BinlogError`] as the error type.
pub type BinlogResult<T> = Result<T, BinlogError>;

/// Categories of errors that can occur while scanning a binlog or handling GTID sets.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Opening, seeking or reading the byte source failed.
    IoError,
    /// A GTID set description or an event payload does not match the expected layout.
    FormatError,
    /// The stream ended while more header or payload bytes were expected.
    ShortRead,
}

/// Main error type for binlog operations.
#[derive(Debug, Clone)]
pub struct BinlogError {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

impl BinlogError {
    /// Returns the [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the detailed error information if available.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the captured backtrace for this error.
    pub fn backtrace(&self) -> &Backtrace {
        self.backtrace.as_ref()
    }

    /// Returns the captured callsite location for this error.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Attaches an originating [`error::Error`] to this error and returns the modified instance.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        BinlogError {
            kind,
            description,
            detail,
            source,
            location: Location::caller(),
            backtrace: Arc::new(Backtrace::capture()),
        }
    }
}

impl PartialEq for BinlogError {
    fn eq(&self, other: &BinlogError) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Display for BinlogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            self.kind,
            self.description,
            self.location.file(),
            self.location.line(),
            self.location.column()
        )?;

        write_detail(self.detail.as_deref(), f, 1)?;
        write_backtrace(self.backtrace.as_ref(), f, 1)?;

        Ok(())
    }
}

impl error::Error for BinlogError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source as &(dyn error::Error + 'static))
    }
}

/// Writes the captured backtrace with indentation.
fn write_backtrace(
    backtrace: &Backtrace,
    f: &mut fmt::Formatter<'_>,
    indent: usize,
) -> fmt::Result {
    let indent_str = "  ".repeat(indent);

    let rendered_backtrace = format!("{backtrace}");
    if !rendered_backtrace.trim().is_empty() {
        write!(f, "\n{indent_str}Backtrace:")?;
        for line in rendered_backtrace.lines() {
            if line.trim().is_empty() {
                write!(f, "\n{indent_str}  ")?;
            } else {
                write!(f, "\n{indent_str}  {line}")?;
            }
        }
    }

    Ok(())
}

/// Writes the detail block with indentation.
fn write_detail(detail: Option<&str>, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
    if let Some(detail) = detail {
        let indent_str = "  ".repeat(indent);
        if detail.trim().is_empty() {
            write!(f, "\n{indent_str}Detail: <empty>")?;
        } else {
            write!(f, "\n{indent_str}Detail:")?;
            for line in detail.lines() {
                write!(f, "\n{indent_str}  {line}")?;
            }
        }
    }

    Ok(())
}

/// Creates a [`BinlogError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for BinlogError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> BinlogError {
        BinlogError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

/// Creates a [`BinlogError`] from an error kind, static description, and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for BinlogError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> BinlogError {
        BinlogError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

/// Converts [`io::Error`] to [`BinlogError`].
///
/// [`io::ErrorKind::UnexpectedEof`] maps to [`ErrorKind::ShortRead`], every other failure to
/// [`ErrorKind::IoError`].
impl From<io::Error> for BinlogError {
    #[track_caller]
    fn from(err: io::Error) -> BinlogError {
        let (kind, description) = match err.kind() {
            io::ErrorKind::UnexpectedEof => (ErrorKind::ShortRead, "Unexpected end of binlog"),
            _ => (ErrorKind::IoError, "I/O operation failed"),
        };

        let detail = err.to_string();
        BinlogError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}
