//! Low-level ZIP archive parser.
//!
//! ZIP files are read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's tail
//! 2. If ZIP64, follow the locator to the ZIP64 EOCD
//! 3. Read the Central Directory to get metadata for all entries
//! 4. For extraction, read the entry's Local File Header to find its data
//!
//! The parser is generic over [`ReadAt`] so it only ever issues
//! positioned reads against the container; it never consumes a stream.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Cursor, Read};

use crate::error::{Result, ZipError};
use crate::io::ReadAt;

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for an EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Low-level ZIP directory parser.
///
/// Handles reading and parsing the archive's directory structures.
/// Typically used through [`ZipArchive`](super::ZipArchive) rather than
/// directly.
#[derive(Debug)]
pub struct ZipParser<R: ReadAt> {
    reader: R,
    /// Total size of the archive in bytes
    size: u64,
}

impl<R: ReadAt> ZipParser<R> {
    pub fn new(reader: R) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Handles both the common case (no archive comment, EOCD exactly at
    /// the end) and commented archives by searching backwards for the
    /// signature.
    ///
    /// Returns the record and its offset in the file, or
    /// [`ZipError::ArchiveCorrupt`] when no valid EOCD exists.
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        // Fast path: no comment, EOCD is the last 22 bytes.
        if self.size >= EndOfCentralDirectory::SIZE as u64 {
            let offset = self.size - EndOfCentralDirectory::SIZE as u64;
            let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
            self.read_at(offset, &mut buf)?;

            if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
                let eocd = EndOfCentralDirectory::from_bytes(&buf)?;
                return Ok((eocd, offset));
            }
        }

        // The EOCD sits earlier when the archive carries a comment.
        // Scan backwards over the maximum comment span.
        let search_size = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64).min(self.size);
        let search_start = self.size - search_size;

        let mut buf = vec![0u8; search_size as usize];
        self.read_at(search_start, &mut buf)?;

        for i in (0..buf.len().saturating_sub(EndOfCentralDirectory::SIZE)).rev() {
            if &buf[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
                // Candidate EOCD: the declared comment length must account
                // for every byte that follows the record.
                let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;

                if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                    let eocd =
                        EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                    return Ok((eocd, search_start + i as u64));
                }
            }
        }

        Err(ZipError::ArchiveCorrupt("no end of central directory record".into()))
    }

    /// Read the ZIP64 End of Central Directory record.
    ///
    /// Called when the regular EOCD carries saturated fields
    /// (0xFFFF / 0xFFFFFFFF).
    fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64Eocd> {
        // The ZIP64 EOCD locator sits immediately before the regular EOCD.
        let locator_offset = eocd_offset
            .checked_sub(Zip64EocdLocator::SIZE as u64)
            .ok_or_else(|| ZipError::ArchiveCorrupt("missing ZIP64 locator".into()))?;
        let mut locator_buf = vec![0u8; Zip64EocdLocator::SIZE];
        self.read_at(locator_offset, &mut locator_buf)?;

        let locator = Zip64EocdLocator::from_bytes(&locator_buf)?;

        let mut eocd64_buf = vec![0u8; Zip64Eocd::MIN_SIZE];
        self.read_at(locator.eocd64_offset, &mut eocd64_buf)?;

        Zip64Eocd::from_bytes(&eocd64_buf)
    }

    /// Read the central directory and parse every entry record.
    ///
    /// Entries are returned in directory order, which matters for the
    /// duplicate-name rule (last occurrence wins).
    pub fn list_entries(&self) -> Result<Vec<ZipFileEntry>> {
        let (eocd, eocd_offset) = self.find_eocd()?;

        let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset)?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        // One read for the whole directory, then parse in memory.
        let mut cd_data = vec![0u8; cd_size as usize];
        self.read_at(cd_offset, &mut cd_data)?;

        let mut entries = Vec::with_capacity(total_entries as usize);
        let mut cursor = Cursor::new(&cd_data);

        for _ in 0..total_entries {
            let entry = parse_cdfh(&mut cursor)
                .map_err(|e| ZipError::ArchiveCorrupt(format!("bad central directory: {e}")))?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Resolve where an entry's compressed payload begins.
    ///
    /// The Local File Header repeats the name and extra field with
    /// lengths that may differ from the central directory copy, so the
    /// data offset has to be computed from the LFH itself.
    pub fn data_offset(&self, entry: &ZipFileEntry) -> Result<u64> {
        let mut lfh_buf = vec![0u8; LFH_SIZE];
        self.read_at(entry.header_offset, &mut lfh_buf)?;

        if &lfh_buf[0..4] != LFH_SIGNATURE {
            return Err(ZipError::ArchiveCorrupt("invalid local file header".into()));
        }

        let mut cursor = Cursor::new(&lfh_buf);
        cursor.set_position(26); // name length field

        let name_len = cursor
            .read_u16::<LittleEndian>()
            .map_err(|e| ZipError::ArchiveCorrupt(e.to_string()))? as u64;
        let extra_len = cursor
            .read_u16::<LittleEndian>()
            .map_err(|e| ZipError::ArchiveCorrupt(e.to_string()))? as u64;

        Ok(entry.header_offset + LFH_SIZE as u64 + name_len + extra_len)
    }

    /// The underlying data source, for reading entry payloads.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.reader
            .read_exact_at(offset, buf)
            .map_err(ZipError::ArchiveUnreadable)
    }
}

/// Parse one Central Directory File Header from a cursor over the
/// directory bytes, including ZIP64 extended-information extra fields.
fn parse_cdfh(cursor: &mut Cursor<&Vec<u8>>) -> io::Result<ZipFileEntry> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CDFH_SIGNATURE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid central directory file header signature",
        ));
    }

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let _flags = cursor.read_u16::<LittleEndian>()?;
    let method = cursor.read_u16::<LittleEndian>()?;
    let last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let name_len = cursor.read_u16::<LittleEndian>()?;
    let extra_len = cursor.read_u16::<LittleEndian>()?;
    let comment_len = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let mut header_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut name_bytes = vec![0u8; name_len as usize];
    cursor.read_exact(&mut name_bytes)?;
    // Lossy conversion keeps non-UTF8 names representable; lookup is
    // against the converted form.
    let name = String::from_utf8_lossy(&name_bytes).to_string();

    let is_directory = name.ends_with('/');

    // ZIP64 extended information lives in extra field 0x0001; values are
    // present only for header fields that are saturated.
    let extra_end = cursor.position() + extra_len as u64;

    while cursor.position() + 4 <= extra_end {
        let header_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()?;

        if header_id == 0x0001 {
            if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_end {
                uncompressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= extra_end {
                compressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if header_offset == 0xFFFFFFFF && cursor.position() + 8 <= extra_end {
                header_offset = cursor.read_u64::<LittleEndian>()?;
            }
            // Skip any trailing ZIP64 fields (disk number start).
            let remaining = extra_end.saturating_sub(cursor.position());
            cursor.set_position(cursor.position() + remaining);
        } else {
            cursor.set_position(cursor.position() + field_size as u64);
        }
    }

    cursor.set_position(extra_end);

    // File comment is unused.
    cursor.set_position(cursor.position() + comment_len as u64);

    Ok(ZipFileEntry {
        name,
        method: CompressionMethod::from_u16(method),
        compressed_size,
        uncompressed_size,
        crc32,
        header_offset,
        last_mod_time,
        last_mod_date,
        is_directory,
    })
}
