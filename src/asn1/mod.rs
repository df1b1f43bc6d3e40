//! ASN.1 DER output: the canonical record and its encoder.
//!
//! One entry's metadata and raw payload become a single fixed-schema
//! DER SEQUENCE:
//!
//! ```text
//! Asn1ZipEntry ::= SEQUENCE {
//!   name              UTF8String,
//!   comment           UTF8String,
//!   extraHeader       OCTET STRING,
//!   rawContent        OCTET STRING,
//!   compressedSize    INTEGER,
//!   uncompressedSize  INTEGER,
//!   modified          INTEGER,   -- Unix seconds
//!   crc32             INTEGER,
//!   method            ENUMERATED,
//!   fileType          ENUMERATED }
//! ```
//!
//! The payload travels still-compressed; consumers that want the file
//! contents must understand the compression named by `method`.

pub mod der;
mod record;

pub use record::{Asn1ZipEntry, CompressionTag, FileType};
