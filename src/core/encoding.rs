//! XML Encoding Detection and Conversion
//!
//! Detects UTF-16 input from its BOM or byte pattern and converts it to
//! UTF-8 before scanning. UTF-8 input only has its BOM stripped.

use crate::error::MapError;
use std::borrow::Cow;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Detected encoding of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl XmlEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        match input {
            [0xFF, 0xFE, ..] | [b'<', 0x00, ..] => XmlEncoding::Utf16Le,
            [0xFE, 0xFF, ..] | [0x00, b'<', ..] => XmlEncoding::Utf16Be,
            _ => XmlEncoding::Utf8,
        }
    }

    pub fn is_utf16(self) -> bool {
        !matches!(self, XmlEncoding::Utf8)
    }
}

/// Strip a leading UTF-8 byte order mark
#[inline]
pub fn strip_utf8_bom(input: &[u8]) -> &[u8] {
    input.strip_prefix(&UTF8_BOM[..]).unwrap_or(input)
}

/// Return the document as UTF-8 bytes, converting UTF-16 when detected
pub fn to_utf8(input: &[u8]) -> Result<Cow<'_, [u8]>, MapError> {
    match XmlEncoding::detect(input) {
        XmlEncoding::Utf8 => Ok(Cow::Borrowed(strip_utf8_bom(input))),
        XmlEncoding::Utf16Le => decode_utf16(input, [0xFF, 0xFE], u16::from_le_bytes).map(Cow::Owned),
        XmlEncoding::Utf16Be => decode_utf16(input, [0xFE, 0xFF], u16::from_be_bytes).map(Cow::Owned),
    }
}

fn decode_utf16(
    input: &[u8],
    bom: [u8; 2],
    unit: fn([u8; 2]) -> u16,
) -> Result<Vec<u8>, MapError> {
    let bytes = input.strip_prefix(&bom[..]).unwrap_or(input);

    if bytes.len() % 2 != 0 {
        return Err(MapError::UnsupportedEncoding(
            "UTF-16 input with an odd number of bytes".to_string(),
        ));
    }

    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| unit([chunk[0], chunk[1]]))
        .collect();

    String::from_utf16(&code_units)
        .map(String::into_bytes)
        .map_err(|e| MapError::UnsupportedEncoding(format!("invalid UTF-16: {}", e)))
}
