//! # zipgrab
//!
//! Extract a single entry from a ZIP archive with an atomic replace.
//!
//! The library parses the archive's central directory itself, locates one
//! named entry, streams its bytes out (inflating DEFLATE data inline),
//! and publishes the result with a write-temp/fsync/rename pattern so the
//! destination is never observed partially written.
//!
//! ## Features
//!
//! - Exact-name entry lookup against the central directory
//! - STORED and DEFLATE compression methods
//! - ZIP64 support for archives larger than 4GB
//! - CRC32 and size verification of extracted data
//! - Atomic replacement of the destination file
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use zipgrab::ZipArchive;
//!
//! fn main() -> zipgrab::Result<()> {
//!     let archive = ZipArchive::open(Path::new("app.apk"))?;
//!     let entry = archive.locate("assets/manager.apk")?;
//!     let written = archive.extract(entry, Path::new("/tmp/manager.apk"))?;
//!     println!("extracted {written} bytes");
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use error::{Result, ZipError};
pub use io::{LocalFileReader, ReadAt};
pub use zip::{
    CompressionMethod, FILESYSTEM_FILENAME_MAX_LENGTH, ZipArchive, ZipFileEntry, extract_entry,
};
