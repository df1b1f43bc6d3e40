use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "zip2asn1")]
#[command(version)]
#[command(about = "Extract a raw ZIP entry and re-encode it as an ASN.1 DER record", long_about = None)]
#[command(after_help = "Examples:\n  \
  zip2asn1 data.zip docs/readme.md           encode entry as DER to stdout\n  \
  zip2asn1 data.zip img.png -o img.der       write the DER record to a file\n  \
  zip2asn1 -l https://example.com/a.zip      list entries of a remote ZIP\n  \
  ZIP_NAME=data.zip ZIP_ITEM_NAME=a zip2asn1 read inputs from the environment")]
pub struct Cli {
    /// ZIP file path or HTTP URL
    #[arg(value_name = "ARCHIVE", env = "ZIP_NAME")]
    pub archive: String,

    /// Archive-internal name of the entry to encode (exact match)
    #[arg(value_name = "ENTRY", env = "ZIP_ITEM_NAME", required_unless_present = "list")]
    pub entry: Option<String>,

    /// List entry names instead of encoding
    #[arg(short = 'l', long = "list")]
    pub list: bool,

    /// Write the DER record here instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<String>,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.archive.starts_with("http://") || self.archive.starts_with("https://")
    }
}
