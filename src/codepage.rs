//! Language-driver byte to text encoding resolution.
//!
//! The DBF header carries a one-byte "language driver" ID naming the codepage
//! of character data. This module maps the documented driver IDs onto the
//! decoders of the `encoding` crate. ISO-8859-1 is the historical DBF default
//! and the fallback for every unrecognized ID.

use encoding::EncodingRef;
use encoding::all::{
    BIG5_2003, GBK, IBM866, ISO_8859_1, MAC_CYRILLIC, MAC_ROMAN, WINDOWS_31J, WINDOWS_874,
    WINDOWS_949, WINDOWS_1250, WINDOWS_1251, WINDOWS_1252, WINDOWS_1253, WINDOWS_1254,
    WINDOWS_1255, WINDOWS_1256, WINDOWS_1257,
};

/// The historical DBF default encoding (ISO-8859-1 / Latin-1)
pub fn default_encoding() -> EncodingRef {
    ISO_8859_1
}

/// Resolve a DBF language-driver byte to a text encoding.
///
/// OEM DOS codepages (437, 850, 852, 857, 861, 863, 865, 737) have no decoder
/// in the `encoding` crate and take the Latin-1 default, as does any driver ID
/// not in the documented table.
pub fn resolve(language_driver: u8) -> EncodingRef {
    match language_driver {
        3 => WINDOWS_1252,   // Windows ANSI Latin-1
        4 => MAC_ROMAN,      // Standard Macintosh
        38 => ISO_8859_1,    // ISO Latin-1
        101 => IBM866,       // Russian MS-DOS
        120 => BIG5_2003,    // Chinese (Taiwan, Hong Kong)
        121 => WINDOWS_949,  // Korean
        122 => GBK,          // Chinese (PRC, Singapore)
        123 => WINDOWS_31J,  // Japanese Shift-JIS
        124 => WINDOWS_874,  // Thai
        125 => WINDOWS_1255, // Hebrew Windows
        126 => WINDOWS_1256, // Arabic Windows
        150 => MAC_CYRILLIC, // Russian Macintosh
        200 => WINDOWS_1250, // Eastern European Windows
        201 => WINDOWS_1251, // Russian Windows
        202 => WINDOWS_1254, // Turkish Windows
        203 => WINDOWS_1253, // Greek Windows
        204 => WINDOWS_1257, // Baltic Windows
        _ => ISO_8859_1,
    }
}
