//! # zip2asn1
//!
//! Locate a single named entry inside a ZIP archive, read its raw
//! (still-compressed) bytes without decompressing them, and re-encode the
//! entry's metadata plus payload as one fixed-schema ASN.1 DER record.
//!
//! Archives can live on the local filesystem or behind an HTTP server:
//! remote archives are read with Range requests, so only the central
//! directory and the one entry are ever transferred.
//!
//! ## Pipeline
//!
//! 1. Parse the central directory ([`RawExtractor::entries`])
//! 2. Locate the entry by exact name ([`RawExtractor::find_entry`])
//! 3. Read its stored bytes verbatim ([`RawExtractor::read_raw`])
//! 4. Assemble the canonical record ([`Asn1ZipEntry::from_raw`])
//! 5. Serialize deterministically ([`Asn1ZipEntry::to_der`])
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use zip2asn1::{Asn1ZipEntry, LocalFileReader, RawExtractor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let reader = Arc::new(LocalFileReader::new(Path::new("archive.zip"))?);
//!     let extractor = RawExtractor::new(reader);
//!
//!     let raw = extractor.extract_raw(b"hello.txt").await?;
//!     let der = Asn1ZipEntry::from_raw(raw)?.to_der()?;
//!     println!("{} bytes", der.len());
//!
//!     Ok(())
//! }
//! ```

pub mod asn1;
pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use asn1::{Asn1ZipEntry, CompressionTag, FileType};
pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{HttpRangeReader, LocalFileReader, ReadAt};
pub use zip::{EntryLocator, ExactNameLocator, RawEntry, RawExtractor, ZipFileEntry};
