//! ZIP archive parsing and single-entry extraction.
//!
//! The module is organized into three parts:
//!
//! - [`structures`]: data structures for ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: low-level parsing of ZIP structures from raw bytes
//! - [`archive`]: the archive handle with lookup and atomic extraction
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The implementation reads the EOCD first (from the end of the file),
//! then the Central Directory, so a single entry can be located and
//! extracted without touching the rest of the archive.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for archives > 4GB
//! - STORED (no compression) method
//! - DEFLATE compression method
//!
//! ## Limitations
//!
//! - No archive writing
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods

mod archive;
mod parser;
mod structures;

pub use archive::{FILESYSTEM_FILENAME_MAX_LENGTH, ZipArchive, extract_entry};
pub use parser::ZipParser;
pub use structures::*;
