//! Error taxonomy for archive lookup and extraction.
//!
//! Every failure mode a caller may want to distinguish gets its own
//! variant: "not found" is not "corrupt", and a failed rename is not
//! an upstream read error.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while locating or extracting an archive entry.
#[derive(Debug, Error)]
pub enum ZipError {
    /// A required input (archive path, entry name, destination) was empty.
    #[error("missing or empty {0}")]
    InvalidArgument(&'static str),

    /// Destination path exceeds the filesystem name-length limit.
    /// Rejected before any I/O is attempted.
    #[error("destination path exceeds {limit} characters: {path:?}")]
    PathTooLong { path: PathBuf, limit: usize },

    /// No central directory record matches the requested name.
    #[error("entry not found in archive: {0}")]
    EntryNotFound(String),

    /// The container could not be opened or read.
    #[error("cannot read archive")]
    ArchiveUnreadable(#[source] std::io::Error),

    /// The container's directory or headers could not be parsed, or the
    /// extracted data contradicts the directory metadata.
    #[error("invalid ZIP archive: {0}")]
    ArchiveCorrupt(String),

    /// Entry uses a compression method other than STORED or DEFLATED.
    #[error("unsupported compression method: {0}")]
    UnsupportedMethod(u16),

    /// Read, write, or sync failure while copying entry data.
    #[error("I/O error during extraction")]
    Io(#[from] std::io::Error),

    /// The fully-written temporary file could not be renamed over the
    /// destination.
    #[error("could not replace {path:?}")]
    ReplaceFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ZipError>;
