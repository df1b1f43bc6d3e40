//! ZIP archive parsing and raw extraction.
//!
//! This module reads ZIP central directories and extracts the stored
//! bytes of individual entries without decompressing them, supporting
//! both standard ZIP format and ZIP64 extensions for large archives.
//!
//! ## Architecture
//!
//! The module is organized into three main components:
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Low-level parsing of ZIP structures from raw bytes
//! - [`extractor`]: Entry lookup and raw payload extraction
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! This implementation reads the EOCD first (from the end of the file),
//! then the Central Directory, which allows locating an entry without
//! reading the entire archive - perfect for HTTP Range requests.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - Raw extraction of any entry regardless of its compression method
//! - Extended-timestamp extra field (0x5455) modification times
//!
//! ## Limitations
//!
//! - No decompression: payloads are read exactly as stored
//! - No encryption support
//! - No multi-disk archive support

mod extractor;
mod parser;
mod structures;

pub use extractor::{EntryLocator, ExactNameLocator, RawEntry, RawExtractor};
pub use parser::ZipParser;
pub use structures::*;
