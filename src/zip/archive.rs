//! Archive handle: entry lookup and single-entry extraction.

use flate2::read::DeflateDecoder;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, ZipError};
use crate::io::{LocalFileReader, ReadAt};

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// Longest destination path accepted by [`ZipArchive::extract`].
///
/// Matches the common filesystem name-length limit; longer paths are
/// rejected before any I/O happens.
pub const FILESYSTEM_FILENAME_MAX_LENGTH: usize = 255;

/// Chunk size for the extraction copy loop (16 KiB).
const COPY_BUF_SIZE: usize = 16 * 1024;

/// An opened ZIP container.
///
/// Owns the underlying reader and the parsed central directory for its
/// lifetime; both are released when the handle is dropped, on every exit
/// path.
#[derive(Debug)]
pub struct ZipArchive<R: ReadAt> {
    parser: ZipParser<R>,
    entries: Vec<ZipFileEntry>,
}

impl ZipArchive<LocalFileReader> {
    /// Open a local archive and parse its central directory.
    ///
    /// Fails with [`ZipError::ArchiveUnreadable`] when the file cannot be
    /// opened, or [`ZipError::ArchiveCorrupt`] when it is not a ZIP
    /// container.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = LocalFileReader::open(path).map_err(ZipError::ArchiveUnreadable)?;
        Self::with_reader(reader)
    }
}

impl<R: ReadAt> ZipArchive<R> {
    /// Build an archive handle over any random-access source.
    pub fn with_reader(reader: R) -> Result<Self> {
        let parser = ZipParser::new(reader);
        let entries = parser.list_entries()?;
        Ok(Self { parser, entries })
    }

    /// All central directory entries, in directory order.
    pub fn entries(&self) -> &[ZipFileEntry] {
        &self.entries
    }

    /// Find the entry with the given name.
    ///
    /// The match is verbatim: case-sensitive and path-separator-sensitive
    /// against the stored name. When an archive holds duplicate names the
    /// last occurrence in the central directory wins, matching how
    /// sequential unzip tools leave the final copy on disk.
    pub fn locate(&self, name: &str) -> Result<&ZipFileEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.name == name)
            .ok_or_else(|| ZipError::EntryNotFound(name.to_string()))
    }

    /// Extract one entry to `dest`, atomically.
    ///
    /// The decompressed bytes are written to `<dest>.tmp`, synced to
    /// disk, then renamed over `dest`. No partially-written file is ever
    /// observable at `dest`; the rename is the single visibility
    /// transition. Returns the number of bytes written.
    ///
    /// On failure `dest` keeps its prior state and the temporary file is
    /// left behind for diagnosis (logged at warn level). There are no
    /// retries; callers re-invoke the whole operation.
    pub fn extract(&self, entry: &ZipFileEntry, dest: &Path) -> Result<u64> {
        let dest_len = dest.as_os_str().len();
        if dest_len > FILESYSTEM_FILENAME_MAX_LENGTH {
            return Err(ZipError::PathTooLong {
                path: dest.to_path_buf(),
                limit: FILESYSTEM_FILENAME_MAX_LENGTH,
            });
        }

        let mut tmp_name = dest.as_os_str().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let written = match self.write_to_temp(entry, &tmp_path) {
            Ok(written) => written,
            Err(e) => {
                if tmp_path.exists() {
                    log::warn!(
                        "{}: leaving partial temporary file {}",
                        entry.name,
                        tmp_path.display()
                    );
                }
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&tmp_path, dest) {
            log::warn!(
                "{}: could not replace {}, temporary kept at {}",
                entry.name,
                dest.display(),
                tmp_path.display()
            );
            return Err(ZipError::ReplaceFailed {
                path: dest.to_path_buf(),
                source: e,
            });
        }

        Ok(written)
    }

    /// Stream the entry's payload into the temporary file: chunked copy,
    /// inline inflate for DEFLATED, CRC/size verification, then flush and
    /// fsync.
    fn write_to_temp(&self, entry: &ZipFileEntry, tmp_path: &Path) -> Result<u64> {
        let data_offset = self.parser.data_offset(entry)?;

        let section = SectionReader {
            reader: self.parser.reader(),
            offset: data_offset,
            remaining: entry.compressed_size,
        };

        let mut reader: Box<dyn Read + '_> = match entry.method {
            CompressionMethod::Stored => Box::new(section),
            CompressionMethod::Deflated => Box::new(DeflateDecoder::new(section)),
            CompressionMethod::Unknown(m) => return Err(ZipError::UnsupportedMethod(m)),
        };

        let tmp = File::create(tmp_path)?;
        let mut writer = BufWriter::with_capacity(COPY_BUF_SIZE, tmp);
        let mut buf = vec![0u8; COPY_BUF_SIZE];
        let mut hasher = crc32fast::Hasher::new();
        let mut written: u64 = 0;

        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    return Err(ZipError::ArchiveCorrupt(format!(
                        "{}: bad deflate stream: {e}",
                        entry.name
                    )));
                }
                Err(e) => return Err(ZipError::Io(e)),
            };
            hasher.update(&buf[..n]);
            writer.write_all(&buf[..n])?;
            written += n as u64;
        }

        if written != entry.uncompressed_size {
            return Err(ZipError::ArchiveCorrupt(format!(
                "{}: wrote {written} bytes, directory declares {}",
                entry.name, entry.uncompressed_size
            )));
        }

        let crc = hasher.finalize();
        if crc != entry.crc32 {
            return Err(ZipError::ArchiveCorrupt(format!(
                "{}: CRC mismatch, got {crc:08x}, directory declares {:08x}",
                entry.name, entry.crc32
            )));
        }

        let tmp = writer
            .into_inner()
            .map_err(|e| ZipError::Io(e.into_error()))?;
        tmp.sync_all()?;

        Ok(written)
    }
}

/// Locate and extract in one call.
///
/// This is the whole operation end to end: validate inputs, open the
/// archive, resolve the entry, stream it out atomically. Returns the
/// number of bytes written to `dest`.
pub fn extract_entry(archive_path: &Path, name: &str, dest: &Path) -> Result<u64> {
    if archive_path.as_os_str().is_empty() {
        return Err(ZipError::InvalidArgument("archive path"));
    }
    if name.is_empty() {
        return Err(ZipError::InvalidArgument("entry name"));
    }
    if dest.as_os_str().is_empty() {
        return Err(ZipError::InvalidArgument("destination path"));
    }

    let archive = ZipArchive::open(archive_path)?;
    let entry = archive.locate(name)?;
    let written = archive.extract(entry, dest)?;
    log::debug!("{name}: {written} bytes extracted to {}", dest.display());
    Ok(written)
}

/// Sequential reader over a byte range of a [`ReadAt`] source.
///
/// Bounds reads to the entry's compressed payload so a decompressor can
/// never run past the declared data into the next record.
struct SectionReader<'a, R: ReadAt> {
    reader: &'a R,
    offset: u64,
    remaining: u64,
}

impl<R: ReadAt> Read for SectionReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }
        let n = self.remaining.min(buf.len() as u64) as usize;
        self.reader.read_exact_at(self.offset, &mut buf[..n])?;
        self.offset += n as u64;
        self.remaining -= n as u64;
        Ok(n)
    }
}
