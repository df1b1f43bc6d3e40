use std::sync::Arc;

use crate::error::{Error, Result};
use crate::io::ReadAt;

use super::parser::ZipParser;
use super::structures::ZipFileEntry;

/// A located entry paired with its stored bytes, exactly as archived.
///
/// For compressed entries `data` holds the still-compressed stream and
/// `data.len()` equals the reported compressed size; for stored entries
/// the two sizes coincide. The sizes are trusted from the central
/// directory, never verified against a checksum.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub header: ZipFileEntry,
    pub data: Vec<u8>,
}

/// Strategy for finding an entry in a parsed central directory.
///
/// The default is exact byte-for-byte name matching; alternative
/// strategies (indexed, case-insensitive) can be injected without
/// touching extraction or encoding.
pub trait EntryLocator: Send + Sync {
    fn locate<'a>(&self, entries: &'a [ZipFileEntry], name: &[u8]) -> Option<&'a ZipFileEntry>;
}

/// Byte-for-byte name lookup, first match in central-directory order.
///
/// No normalization of case, path separators or leading/trailing slashes:
/// callers must pass the exact archive-internal name. When an archive
/// holds duplicate names the first directory entry wins.
pub struct ExactNameLocator;

impl EntryLocator for ExactNameLocator {
    fn locate<'a>(&self, entries: &'a [ZipFileEntry], name: &[u8]) -> Option<&'a ZipFileEntry> {
        entries.iter().find(|e| e.name == name)
    }
}

/// Raw (non-inflating) ZIP entry extractor.
///
/// Reads an entry's stored bytes verbatim. Never decompresses and never
/// checks the CRC: the output record is meant to carry the payload
/// exactly as archived, compression included.
pub struct RawExtractor<R: ReadAt> {
    parser: ZipParser<R>,
    locator: Box<dyn EntryLocator>,
}

impl<R: ReadAt> RawExtractor<R> {
    /// Create an extractor with exact-name lookup.
    pub fn new(reader: Arc<R>) -> Self {
        Self::with_locator(reader, Box::new(ExactNameLocator))
    }

    /// Create an extractor with a custom lookup strategy.
    pub fn with_locator(reader: Arc<R>, locator: Box<dyn EntryLocator>) -> Self {
        Self {
            parser: ZipParser::new(reader),
            locator,
        }
    }

    /// List all entries in the archive.
    pub async fn entries(&self) -> Result<Vec<ZipFileEntry>> {
        self.parser.entries().await
    }

    /// Find an entry by its archive-internal name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntryNotFound`] when no entry matches. Lower-level
    /// read failures keep their own error kinds, so an absent entry is
    /// always distinguishable from a broken archive.
    pub async fn find_entry(&self, name: &[u8]) -> Result<ZipFileEntry> {
        let entries = self.parser.entries().await?;
        self.locator
            .locate(&entries, name)
            .cloned()
            .ok_or_else(|| Error::EntryNotFound(String::from_utf8_lossy(name).into_owned()))
    }

    /// Read an entry's stored bytes verbatim.
    ///
    /// No partial result escapes: a read failure drops the buffer and
    /// surfaces the underlying cause.
    pub async fn read_raw(&self, entry: &ZipFileEntry) -> Result<RawEntry> {
        let data_offset = self.parser.data_offset(entry).await?;

        let mut data = vec![0u8; entry.compressed_size as usize];
        self.parser.reader().read_at(data_offset, &mut data).await?;

        Ok(RawEntry {
            header: entry.clone(),
            data,
        })
    }

    /// Locate an entry and read its stored bytes in one step.
    pub async fn extract_raw(&self, name: &[u8]) -> Result<RawEntry> {
        let entry = self.find_entry(name).await?;
        self.read_raw(&entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::structures::CompressionMethod;

    fn entry(name: &[u8], size: u64) -> ZipFileEntry {
        ZipFileEntry {
            name: name.to_vec(),
            comment: Vec::new(),
            extra: Vec::new(),
            compression_method: CompressionMethod::Stored,
            compressed_size: size,
            uncompressed_size: size,
            crc32: 0,
            lfh_offset: 0,
            last_mod_time: 0,
            last_mod_date: 0,
            unix_mtime: None,
        }
    }

    #[test]
    fn exact_locator_is_byte_exact() {
        let entries = vec![entry(b"A.txt", 1), entry(b"a.txt", 2)];
        let found = ExactNameLocator.locate(&entries, b"a.txt").unwrap();
        assert_eq!(found.compressed_size, 2);
        assert!(ExactNameLocator.locate(&entries, b"a.TXT").is_none());
        assert!(ExactNameLocator.locate(&entries, b"/a.txt").is_none());
    }

    #[test]
    fn exact_locator_first_match_wins() {
        let entries = vec![entry(b"dup", 1), entry(b"dup", 2)];
        let found = ExactNameLocator.locate(&entries, b"dup").unwrap();
        assert_eq!(found.compressed_size, 1);
    }
}
