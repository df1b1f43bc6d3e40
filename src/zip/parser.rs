//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures,
//! reading from any source that implements the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. If ZIP64, read the ZIP64 EOCD for large file support
//! 3. Read the Central Directory to get metadata for all entries
//! 4. For raw extraction, read the entry's Local File Header to find
//!    where its stored bytes begin
//!
//! The central directory is the authority for all metadata that ends up
//! in the output record: name, comment and extra field bytes are captured
//! verbatim, never normalized or re-encoded.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::io::ReadAt;

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Extra field ID for ZIP64 extended information.
const EXTRA_ID_ZIP64: u16 = 0x0001;

/// Extra field ID for the Info-ZIP extended timestamp.
const EXTRA_ID_EXTENDED_TIMESTAMP: u16 = 0x5455;

/// Low-level ZIP file parser.
///
/// This struct handles reading and parsing ZIP structures from
/// a data source. It's generic over the reader type to support
/// both local files and HTTP sources.
///
/// Typically used through [`RawExtractor`](super::RawExtractor)
/// rather than directly.
pub struct ZipParser<R: ReadAt> {
    /// The underlying data source
    reader: Arc<R>,
    /// Total size of the archive in bytes
    size: u64,
}

impl<R: ReadAt> ZipParser<R> {
    /// Create a new parser for the given reader.
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// The EOCD is located at the end of the ZIP file. The common case of
    /// an archive without a trailing comment is tried first; otherwise the
    /// tail of the file is scanned backwards for the signature.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArchive`] if no valid EOCD can be found.
    pub async fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        if self.size >= EndOfCentralDirectory::SIZE as u64 {
            let offset = self.size - EndOfCentralDirectory::SIZE as u64;
            let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
            self.reader.read_at(offset, &mut buf).await?;

            // Signature plus a zero-length comment means this really is
            // the record and not comment bytes that happen to match.
            if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && buf[20..22] == [0, 0] {
                return Ok((EndOfCentralDirectory::from_bytes(&buf)?, offset));
            }
        }

        // A trailing archive comment pushes the EOCD away from the end;
        // scan the largest possible tail backwards.
        let search_size = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64).min(self.size);
        let search_start = self.size - search_size;

        let mut buf = vec![0u8; search_size as usize];
        self.reader.read_at(search_start, &mut buf).await?;

        for i in (0..buf.len().saturating_sub(EndOfCentralDirectory::SIZE)).rev() {
            if &buf[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
                continue;
            }
            // Candidate is genuine only if its comment length matches the
            // number of bytes that actually follow it.
            let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;
            if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                let eocd =
                    EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                return Ok((eocd, search_start + i as u64));
            }
        }

        Err(Error::InvalidArchive("end of central directory not found"))
    }

    /// Read the ZIP64 End of Central Directory record.
    ///
    /// Called when the regular EOCD indicates ZIP64 extensions are needed
    /// (fields set to 0xFFFF or 0xFFFFFFFF).
    pub async fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64EOCD> {
        // The ZIP64 EOCD Locator sits immediately before the regular EOCD
        let locator_offset = eocd_offset
            .checked_sub(Zip64EOCDLocator::SIZE as u64)
            .ok_or(Error::InvalidArchive("ZIP64 EOCD locator out of range"))?;
        let mut locator_buf = vec![0u8; Zip64EOCDLocator::SIZE];
        self.reader
            .read_at(locator_offset, &mut locator_buf)
            .await?;

        let locator = Zip64EOCDLocator::from_bytes(&locator_buf)?;

        let mut eocd64_buf = vec![0u8; Zip64EOCD::MIN_SIZE];
        self.reader
            .read_at(locator.eocd64_offset, &mut eocd64_buf)
            .await?;

        Zip64EOCD::from_bytes(&eocd64_buf)
    }

    /// List all entries in the archive, in central-directory order.
    ///
    /// Order matters: lookup by name returns the first match in exactly
    /// this order when an archive holds duplicate names.
    pub async fn entries(&self) -> Result<Vec<ZipFileEntry>> {
        let (eocd, eocd_offset) = self.find_eocd().await?;

        let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset).await?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        // One read for the whole directory (a single Range request for
        // HTTP sources), then parse entry by entry.
        let mut cd_data = vec![0u8; cd_size as usize];
        self.reader.read_at(cd_offset, &mut cd_data).await?;

        let mut entries = Vec::with_capacity(total_entries as usize);
        let mut cursor = Cursor::new(cd_data.as_slice());

        for _ in 0..total_entries {
            entries.push(parse_cdfh(&mut cursor)?);
        }

        Ok(entries)
    }

    /// Get the offset of an entry's stored bytes.
    ///
    /// The Local File Header has its own copies of the variable-length
    /// fields (filename, extra field) which may differ in size from the
    /// central directory's, so the header must be read to find where the
    /// data actually starts.
    pub async fn data_offset(&self, entry: &ZipFileEntry) -> Result<u64> {
        let mut lfh_buf = vec![0u8; LFH_SIZE];
        self.reader.read_at(entry.lfh_offset, &mut lfh_buf).await?;

        if &lfh_buf[0..4] != LFH_SIGNATURE {
            return Err(Error::InvalidArchive("bad local file header"));
        }

        // Filename and extra field lengths sit at fixed offsets 26 and 28
        let file_name_length = u16::from_le_bytes([lfh_buf[26], lfh_buf[27]]) as u64;
        let extra_field_length = u16::from_le_bytes([lfh_buf[28], lfh_buf[29]]) as u64;

        Ok(entry.lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length)
    }

    /// Get a reference to the underlying reader.
    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }
}

/// Parse one Central Directory File Header from a cursor.
///
/// Captures the name, comment and extra field bytes verbatim, resolves
/// ZIP64 sizes/offsets, and picks up the extended-timestamp mtime when
/// the entry carries one.
fn parse_cdfh(cursor: &mut Cursor<&[u8]>) -> Result<ZipFileEntry> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CDFH_SIGNATURE {
        return Err(Error::InvalidArchive("bad central directory file header"));
    }

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let _flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let mut compressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let mut uncompressed_size = cursor.read_u32::<LittleEndian>()? as u64;
    let file_name_length = cursor.read_u16::<LittleEndian>()?;
    let extra_field_length = cursor.read_u16::<LittleEndian>()?;
    let file_comment_length = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let mut lfh_offset = cursor.read_u32::<LittleEndian>()? as u64;

    let mut name = vec![0u8; file_name_length as usize];
    cursor.read_exact(&mut name)?;

    // The extra field is both parsed (ZIP64, timestamps) and carried
    // through to the output record untouched.
    let mut extra = vec![0u8; extra_field_length as usize];
    cursor.read_exact(&mut extra)?;

    let mut comment = vec![0u8; file_comment_length as usize];
    cursor.read_exact(&mut comment)?;

    let mut unix_mtime = None;

    let mut fields = Cursor::new(extra.as_slice());
    while fields.position() + 4 <= extra.len() as u64 {
        let header_id = fields.read_u16::<LittleEndian>()?;
        let field_size = fields.read_u16::<LittleEndian>()? as u64;
        let field_end = (fields.position() + field_size).min(extra.len() as u64);

        match header_id {
            EXTRA_ID_ZIP64 => {
                // Fields are present only when the corresponding 32-bit
                // header field saturated at 0xFFFFFFFF
                if uncompressed_size == 0xFFFFFFFF && fields.position() + 8 <= field_end {
                    uncompressed_size = fields.read_u64::<LittleEndian>()?;
                }
                if compressed_size == 0xFFFFFFFF && fields.position() + 8 <= field_end {
                    compressed_size = fields.read_u64::<LittleEndian>()?;
                }
                if lfh_offset == 0xFFFFFFFF && fields.position() + 8 <= field_end {
                    lfh_offset = fields.read_u64::<LittleEndian>()?;
                }
            }
            EXTRA_ID_EXTENDED_TIMESTAMP => {
                // Central-directory variant: flags byte, then the mtime
                // (only) when bit 0 is set
                if fields.position() + 1 <= field_end {
                    let flags = fields.read_u8()?;
                    if flags & 0x01 != 0 && fields.position() + 4 <= field_end {
                        unix_mtime = Some(fields.read_u32::<LittleEndian>()? as i64);
                    }
                }
            }
            _ => {}
        }

        fields.set_position(field_end);
    }

    Ok(ZipFileEntry {
        name,
        comment,
        extra,
        compression_method: CompressionMethod::from_u16(compression_method),
        compressed_size,
        uncompressed_size,
        crc32,
        lfh_offset,
        last_mod_time,
        last_mod_date,
        unix_mtime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn cdfh_bytes(
        name: &[u8],
        extra: &[u8],
        comment: &[u8],
        method: u16,
        sizes: (u32, u32),
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(CDFH_SIGNATURE);
        buf.write_u16::<LittleEndian>(20).unwrap(); // version made by
        buf.write_u16::<LittleEndian>(20).unwrap(); // version needed
        buf.write_u16::<LittleEndian>(0).unwrap(); // flags
        buf.write_u16::<LittleEndian>(method).unwrap();
        buf.write_u16::<LittleEndian>(0x6385).unwrap(); // mod time
        buf.write_u16::<LittleEndian>(0x586F).unwrap(); // mod date
        buf.write_u32::<LittleEndian>(0xDEADBEEF).unwrap(); // crc32
        buf.write_u32::<LittleEndian>(sizes.0).unwrap();
        buf.write_u32::<LittleEndian>(sizes.1).unwrap();
        buf.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(extra.len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(comment.len() as u16).unwrap();
        buf.write_u16::<LittleEndian>(0).unwrap(); // disk number
        buf.write_u16::<LittleEndian>(0).unwrap(); // internal attrs
        buf.write_u32::<LittleEndian>(0).unwrap(); // external attrs
        buf.write_u32::<LittleEndian>(64).unwrap(); // lfh offset
        buf.extend_from_slice(name);
        buf.extend_from_slice(extra);
        buf.extend_from_slice(comment);
        buf
    }

    #[test]
    fn cdfh_captures_metadata_verbatim() {
        let extra = {
            let mut e = Vec::new();
            e.write_u16::<LittleEndian>(0x9999).unwrap(); // unknown field
            e.write_u16::<LittleEndian>(2).unwrap();
            e.extend_from_slice(&[0xAA, 0xBB]);
            e
        };
        let raw = cdfh_bytes(b"dir/file.bin", &extra, b"a comment", 8, (10, 20));
        let mut cursor = Cursor::new(raw.as_slice());

        let entry = parse_cdfh(&mut cursor).unwrap();
        assert_eq!(entry.name, b"dir/file.bin");
        assert_eq!(entry.comment, b"a comment");
        assert_eq!(entry.extra, extra);
        assert_eq!(entry.compression_method, CompressionMethod::Deflate);
        assert_eq!(entry.compressed_size, 10);
        assert_eq!(entry.uncompressed_size, 20);
        assert_eq!(entry.crc32, 0xDEADBEEF);
        assert_eq!(entry.lfh_offset, 64);
        assert_eq!(entry.unix_mtime, None);
        assert_eq!(cursor.position(), raw.len() as u64);
    }

    #[test]
    fn cdfh_reads_extended_timestamp() {
        let extra = {
            let mut e = Vec::new();
            e.write_u16::<LittleEndian>(EXTRA_ID_EXTENDED_TIMESTAMP).unwrap();
            e.write_u16::<LittleEndian>(5).unwrap();
            e.write_u8(0x03).unwrap(); // mtime + atime flagged
            e.write_u32::<LittleEndian>(1_700_000_000).unwrap();
            e
        };
        let raw = cdfh_bytes(b"x", &extra, b"", 0, (3, 3));
        let mut cursor = Cursor::new(raw.as_slice());

        let entry = parse_cdfh(&mut cursor).unwrap();
        assert_eq!(entry.unix_mtime, Some(1_700_000_000));
        // pass-through is still verbatim
        assert_eq!(entry.extra, extra);
    }

    #[test]
    fn cdfh_resolves_zip64_sizes() {
        let extra = {
            let mut e = Vec::new();
            e.write_u16::<LittleEndian>(EXTRA_ID_ZIP64).unwrap();
            e.write_u16::<LittleEndian>(16).unwrap();
            e.write_u64::<LittleEndian>(5_000_000_000).unwrap(); // uncompressed
            e.write_u64::<LittleEndian>(4_999_999_999).unwrap(); // compressed
            e
        };
        let raw = cdfh_bytes(b"big", &extra, b"", 8, (0xFFFFFFFF, 0xFFFFFFFF));
        let mut cursor = Cursor::new(raw.as_slice());

        let entry = parse_cdfh(&mut cursor).unwrap();
        assert_eq!(entry.uncompressed_size, 5_000_000_000);
        assert_eq!(entry.compressed_size, 4_999_999_999);
    }

    #[test]
    fn cdfh_rejects_bad_signature() {
        let mut raw = cdfh_bytes(b"x", b"", b"", 0, (0, 0));
        raw[0] = b'Q';
        let mut cursor = Cursor::new(raw.as_slice());
        assert!(matches!(
            parse_cdfh(&mut cursor),
            Err(Error::InvalidArchive(_))
        ));
    }
}
