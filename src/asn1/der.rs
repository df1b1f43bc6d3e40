//! Minimal DER (Distinguished Encoding Rules) writer.
//!
//! Emits exactly the subset of ASN.1 the output record needs: INTEGER,
//! ENUMERATED, UTF8String, OCTET STRING and SEQUENCE, all with definite
//! lengths. DER leaves no encoding choices open, so a given value always
//! serializes to the same bytes: lengths use the shortest form and
//! integers the shortest two's-complement representation.

use crate::error::{Error, Result};

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_ENUMERATED: u8 = 0x0A;
pub const TAG_UTF8_STRING: u8 = 0x0C;
/// SEQUENCE with the constructed bit set.
pub const TAG_SEQUENCE: u8 = 0x30;

/// Append one tag-length-value triple.
pub fn write_tlv(out: &mut Vec<u8>, tag: u8, content: &[u8]) {
    out.push(tag);
    write_length(out, content.len());
    out.extend_from_slice(content);
}

/// Append a definite length in its shortest form.
///
/// Lengths below 128 use the single-byte short form; anything larger uses
/// the long form with the minimal number of big-endian length octets.
fn write_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let be = (len as u64).to_be_bytes();
    let skip = be.iter().take_while(|&&b| b == 0).count();
    out.push(0x80 | (be.len() - skip) as u8);
    out.extend_from_slice(&be[skip..]);
}

/// Shortest two's-complement big-endian form of `value`.
///
/// Leading octets are dropped while they carry no information: a 0x00
/// octet followed by a byte without the sign bit, or a 0xFF octet
/// followed by a byte with it. At least one octet always remains.
fn signed_minimal(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < bytes.len() - 1 {
        let redundant = match bytes[start] {
            0x00 => bytes[start + 1] & 0x80 == 0,
            0xFF => bytes[start + 1] & 0x80 != 0,
            _ => false,
        };
        if !redundant {
            break;
        }
        start += 1;
    }
    bytes[start..].to_vec()
}

/// Append an INTEGER.
pub fn write_integer(out: &mut Vec<u8>, value: i64) {
    write_tlv(out, TAG_INTEGER, &signed_minimal(value));
}

/// Append an ENUMERATED value.
///
/// Content octets follow the same rules as INTEGER.
pub fn write_enumerated(out: &mut Vec<u8>, value: u32) {
    write_tlv(out, TAG_ENUMERATED, &signed_minimal(value as i64));
}

/// Append a UTF8String.
///
/// The bytes come straight from the archive and may hold anything, so
/// they are validated here; `field` names the offender in the error.
pub fn write_utf8_string(out: &mut Vec<u8>, field: &'static str, bytes: &[u8]) -> Result<()> {
    if std::str::from_utf8(bytes).is_err() {
        return Err(Error::InvalidUtf8 { field });
    }
    write_tlv(out, TAG_UTF8_STRING, bytes);
    Ok(())
}

/// Append an OCTET STRING.
pub fn write_octet_string(out: &mut Vec<u8>, bytes: &[u8]) {
    write_tlv(out, TAG_OCTET_STRING, bytes);
}
