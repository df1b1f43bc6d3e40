use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::ReadAt;
use crate::error::{Error, Result};

/// How many times a timed-out or refused Range request is re-sent before
/// the read is reported as failed.
const MAX_TRANSPORT_RETRIES: u32 = 3;

/// HTTP Range reader for remote ZIP archives.
///
/// Lets the pipeline pull the central directory and a single entry's raw
/// bytes from a remote archive without downloading the whole file.
pub struct HttpRangeReader {
    client: Client,
    url: String,
    size: u64,
}

impl HttpRangeReader {
    /// Create a new HTTP Range reader.
    ///
    /// Sends a HEAD request to verify Range support and learn the size.
    pub async fn new(url: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let resp = client.head(&url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::HttpRange(format!(
                "HEAD request failed with status {}",
                resp.status()
            )));
        }

        let accept_ranges = resp
            .headers()
            .get("accept-ranges")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none");
        if !accept_ranges.contains("bytes") {
            return Err(Error::HttpRange(
                "remote server does not support Range requests".into(),
            ));
        }

        let size = resp
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::HttpRange("remote server did not return Content-Length".into()))?;

        Ok(Self { client, url, size })
    }

    async fn fetch_range(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            let range = format!("bytes={}-{}", start, end);
            match self.client.get(&self.url).header("Range", &range).send().await {
                Ok(resp) => {
                    if resp.status() != reqwest::StatusCode::PARTIAL_CONTENT {
                        return Err(Error::HttpRange(format!(
                            "Range request failed with status {}",
                            resp.status()
                        )));
                    }
                    return Ok(resp.bytes().await?.to_vec());
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    attempt += 1;
                    if attempt >= MAX_TRANSPORT_RETRIES {
                        return Err(e.into());
                    }
                    tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl ReadAt for HttpRangeReader {
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        if offset + buf.len() as u64 > self.size {
            return Err(Error::HttpRange(format!(
                "range {}..{} past end of {}-byte resource",
                offset,
                offset + buf.len() as u64,
                self.size
            )));
        }

        // Servers may answer a Range request with fewer bytes than asked
        // for; keep requesting the remainder until the buffer is full.
        let end = offset + buf.len() as u64 - 1;
        let mut received = 0usize;
        while received < buf.len() {
            let chunk = self.fetch_range(offset + received as u64, end).await?;
            if chunk.is_empty() {
                return Err(Error::HttpRange("empty Range response body".into()));
            }
            let n = chunk.len().min(buf.len() - received);
            buf[received..received + n].copy_from_slice(&chunk[..n]);
            received += n;
        }
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}
