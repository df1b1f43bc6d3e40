//! Main entry point for the zip2asn1 CLI application.
//!
//! Wires the pipeline together: open the archive source, locate the
//! requested entry, read its raw bytes, assemble the canonical record and
//! write the DER encoding to the chosen sink. Every step propagates its
//! error unchanged; this boundary prints it once and exits non-zero.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

use zip2asn1::{Asn1ZipEntry, Cli, HttpRangeReader, LocalFileReader, RawExtractor, ReadAt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.is_http_url() {
        let reader = Arc::new(HttpRangeReader::new(cli.archive.clone()).await?);
        run(reader, &cli).await
    } else {
        let reader = Arc::new(LocalFileReader::new(Path::new(&cli.archive))?);
        run(reader, &cli).await
    }
}

/// Run the requested operation against an opened archive source.
async fn run<R: ReadAt + 'static>(reader: Arc<R>, cli: &Cli) -> Result<()> {
    let extractor = RawExtractor::new(reader);

    if cli.list {
        return list_entries(&extractor).await;
    }

    // required_unless_present guarantees the name outside list mode
    let name = cli.entry.as_deref().unwrap_or_default();

    let raw = extractor.extract_raw(name.as_bytes()).await?;
    let encoded = Asn1ZipEntry::from_raw(raw)?.to_der()?;

    // The record is complete before the first byte is written: the sink
    // receives the whole encoding or nothing.
    write_sink(&encoded, cli.output.as_deref()).await
}

/// Print entry names, one per line, in central-directory order.
async fn list_entries<R: ReadAt + 'static>(extractor: &RawExtractor<R>) -> Result<()> {
    let entries = extractor.entries().await?;
    for entry in &entries {
        println!("{}", entry.name_lossy());
    }
    Ok(())
}

/// Write the encoded record to a file or stdout.
async fn write_sink(encoded: &[u8], output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = tokio::fs::File::create(path).await?;
            file.write_all(encoded).await?;
            file.flush().await?;
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(encoded).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
