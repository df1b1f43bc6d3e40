mod http;
mod local;

pub use http::HttpRangeReader;
pub use local::LocalFileReader;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for random access reading from a data source.
///
/// Implementations must fill the whole buffer. The extractor copies raw
/// payload bytes verbatim into the output record, so a short read would
/// silently truncate the payload.
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read exactly `buf.len()` bytes starting at `offset`.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Get the total size of the data source.
    fn size(&self) -> u64;
}
