//! The output record: assembly from a raw entry and DER serialization.

use crate::error::{Error, Result};
use crate::zip::{CompressionMethod, RawEntry};

use super::der;

/// Coarse file-type classification carried in the output record.
///
/// Wire values are fixed and versioned; `Unknown` is reserved and never
/// produced by [`FileType::classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FileType {
    Unknown = 0,
    Regular = 1,
    Directory = 2,
    Symlink = 3,
}

impl FileType {
    /// Classify an entry from its name and payload length.
    ///
    /// | size | suffix | type |
    /// |:----:|:------:|:----:|
    /// | >0   |        | file |
    /// | 0    | /      | dir  |
    /// | 0    |        | link |
    ///
    /// Size takes precedence over the name. No other heuristics: an empty
    /// regular file whose name lacks the '/' suffix is indistinguishable
    /// from a symlink placeholder under this rule, a known limitation.
    pub fn classify(name: &[u8], payload_len: usize) -> Self {
        if payload_len > 0 {
            FileType::Regular
        } else if name.last() == Some(&b'/') {
            FileType::Directory
        } else {
            FileType::Symlink
        }
    }
}

/// Stable substitute for the archive's native compression-method code.
///
/// The native code space is open-ended (vendor and future methods); every
/// code beyond the two recognized ones maps to `Unspecified` so any
/// archive still produces valid, if lossy, output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum CompressionTag {
    Unspecified = 0,
    Store = 1,
    Deflate = 2,
}

impl CompressionTag {
    /// Total mapping from the ZIP method code; never fails.
    pub fn from_method(method: CompressionMethod) -> Self {
        match method {
            CompressionMethod::Stored => CompressionTag::Store,
            CompressionMethod::Deflate => CompressionTag::Deflate,
            CompressionMethod::Unknown(_) => CompressionTag::Unspecified,
        }
    }
}

/// The one record this crate emits.
///
/// Owns copies of every byte and text field: nothing aliases the archive
/// handle, which may be long closed by the time the record is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asn1ZipEntry {
    /// Archive-internal entry name (UTF8String on the wire).
    pub name: Vec<u8>,
    /// Entry comment (UTF8String on the wire).
    pub comment: Vec<u8>,
    /// Central-directory extra field, verbatim.
    pub extra: Vec<u8>,
    /// Stored payload, exactly as archived.
    pub raw_content: Vec<u8>,
    pub compressed_size: i64,
    pub uncompressed_size: i64,
    /// Last modification in Unix seconds.
    pub modified: i64,
    /// CRC32 of the uncompressed data, reinterpreted as signed.
    pub crc32: i32,
    pub method: CompressionTag,
    pub file_type: FileType,
}

impl Asn1ZipEntry {
    /// Assemble the record from a raw entry.
    ///
    /// Field-by-field copy plus the two derived fields. Sizes are widened
    /// into the signed schema range with a checked conversion; a size past
    /// `i64::MAX` is reported rather than wrapped.
    pub fn from_raw(raw: RawEntry) -> Result<Self> {
        let RawEntry { header, data } = raw;

        let file_type = FileType::classify(&header.name, data.len());
        let method = CompressionTag::from_method(header.compression_method);
        let modified = header.modified_unix();

        Ok(Self {
            compressed_size: widen(header.compressed_size, "compressed size")?,
            uncompressed_size: widen(header.uncompressed_size, "uncompressed size")?,
            modified,
            crc32: header.crc32 as i32,
            name: header.name,
            comment: header.comment,
            extra: header.extra,
            raw_content: data,
            method,
            file_type,
        })
    }

    /// Serialize as a DER SEQUENCE.
    ///
    /// The field order is the schema's contract, not an encoder default:
    /// name, comment, extraHeader, rawContent, compressedSize,
    /// uncompressedSize, modified, crc32, method, fileType. Together with
    /// DER's shortest-form rules this makes the encoding deterministic:
    /// equal records always produce byte-identical output.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let mut body = Vec::with_capacity(self.raw_content.len() + 128);
        der::write_utf8_string(&mut body, "entry name", &self.name)?;
        der::write_utf8_string(&mut body, "entry comment", &self.comment)?;
        der::write_octet_string(&mut body, &self.extra);
        der::write_octet_string(&mut body, &self.raw_content);
        der::write_integer(&mut body, self.compressed_size);
        der::write_integer(&mut body, self.uncompressed_size);
        der::write_integer(&mut body, self.modified);
        der::write_integer(&mut body, self.crc32 as i64);
        der::write_enumerated(&mut body, self.method as u32);
        der::write_enumerated(&mut body, self.file_type as u32);

        let mut out = Vec::with_capacity(body.len() + 8);
        der::write_tlv(&mut out, der::TAG_SEQUENCE, &body);
        Ok(out)
    }
}

fn widen(value: u64, field: &'static str) -> Result<i64> {
    i64::try_from(value).map_err(|_| Error::IntegerOverflow { field, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::ZipFileEntry;

    fn raw(name: &[u8], data: &[u8]) -> RawEntry {
        RawEntry {
            header: ZipFileEntry {
                name: name.to_vec(),
                comment: b"c".to_vec(),
                extra: vec![1, 2, 3],
                compression_method: CompressionMethod::Stored,
                compressed_size: data.len() as u64,
                uncompressed_size: data.len() as u64,
                crc32: 0xFFFF_FFFF,
                lfh_offset: 0,
                last_mod_time: 0,
                last_mod_date: (20 << 9) | (1 << 5) | 1, // 2000-01-01
                unix_mtime: None,
            },
            data: data.to_vec(),
        }
    }

    #[test]
    fn classify_precedence() {
        assert_eq!(FileType::classify(b"data.txt", 5), FileType::Regular);
        assert_eq!(FileType::classify(b"dir/", 0), FileType::Directory);
        assert_eq!(FileType::classify(b"link", 0), FileType::Symlink);
        // size beats the directory suffix
        assert_eq!(FileType::classify(b"dir/", 5), FileType::Regular);
        assert_eq!(FileType::classify(b"", 0), FileType::Symlink);
    }

    #[test]
    fn compression_tag_total() {
        assert_eq!(
            CompressionTag::from_method(CompressionMethod::Stored),
            CompressionTag::Store
        );
        assert_eq!(
            CompressionTag::from_method(CompressionMethod::Deflate),
            CompressionTag::Deflate
        );
        for code in [1u16, 9, 12, 14, 93, 99, u16::MAX] {
            assert_eq!(
                CompressionTag::from_method(CompressionMethod::Unknown(code)),
                CompressionTag::Unspecified
            );
        }
    }

    #[test]
    fn assemble_copies_fields() {
        let record = Asn1ZipEntry::from_raw(raw(b"a.bin", b"payload")).unwrap();
        assert_eq!(record.name, b"a.bin");
        assert_eq!(record.comment, b"c");
        assert_eq!(record.extra, [1, 2, 3]);
        assert_eq!(record.raw_content, b"payload");
        assert_eq!(record.compressed_size, 7);
        assert_eq!(record.uncompressed_size, 7);
        assert_eq!(record.crc32, -1);
        assert_eq!(record.modified, 946_684_800);
        assert_eq!(record.method, CompressionTag::Store);
        assert_eq!(record.file_type, FileType::Regular);
    }

    #[test]
    fn assemble_flags_size_overflow() {
        let mut item = raw(b"huge", b"");
        item.header.uncompressed_size = u64::MAX;
        let err = Asn1ZipEntry::from_raw(item).unwrap_err();
        assert!(matches!(
            err,
            Error::IntegerOverflow {
                field: "uncompressed size",
                value: u64::MAX,
            }
        ));
    }

    #[test]
    fn der_layout_known_answer() {
        let mut item = raw(b"a", b"hi");
        item.header.comment.clear();
        item.header.extra.clear();
        item.header.crc32 = 1;
        item.header.unix_mtime = Some(2);
        let encoded = Asn1ZipEntry::from_raw(item).unwrap().to_der().unwrap();

        #[rustfmt::skip]
        let expected = [
            0x30, 0x1D, // SEQUENCE, 29 content bytes
            0x0C, 0x01, b'a', // name
            0x0C, 0x00, // comment
            0x04, 0x00, // extra
            0x04, 0x02, b'h', b'i', // raw content
            0x02, 0x01, 0x02, // compressed size
            0x02, 0x01, 0x02, // uncompressed size
            0x02, 0x01, 0x02, // modified
            0x02, 0x01, 0x01, // crc32
            0x0A, 0x01, 0x01, // method: store
            0x0A, 0x01, 0x01, // file type: regular
        ];
        assert_eq!(encoded, expected);
    }

    #[test]
    fn der_is_deterministic() {
        let record = Asn1ZipEntry::from_raw(raw(b"x", b"abc")).unwrap();
        assert_eq!(record.to_der().unwrap(), record.clone().to_der().unwrap());
    }

    #[test]
    fn der_separates_fields() {
        // Neighboring byte fields must not run together: moving a byte
        // from the end of one field to the start of the next changes the
        // encoding.
        let mut a = raw(b"x", b"abc");
        a.header.extra = vec![b'9'];
        let mut b = raw(b"x", b"9abc");
        b.header.extra = Vec::new();
        let ea = Asn1ZipEntry::from_raw(a).unwrap().to_der().unwrap();
        let eb = Asn1ZipEntry::from_raw(b).unwrap().to_der().unwrap();
        assert_ne!(ea, eb);
    }

    #[test]
    fn der_rejects_non_utf8_name() {
        let record = Asn1ZipEntry::from_raw(raw(&[0xC3, 0x28], b"")).unwrap();
        assert!(matches!(
            record.to_der(),
            Err(Error::InvalidUtf8 { field: "entry name" })
        ));
    }
}
