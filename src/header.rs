//! Fixed-layout decoding of the DBF file header and column descriptors.
//!
//! Both structures are 32 bytes on disk, little-endian throughout. They are
//! decoded once at open time with explicit byte-slice extraction and stay
//! immutable for the life of the reader.

use encoding::{DecoderTrap, Encoding};
use encoding::all::ISO_8859_1;

use crate::error::{DbfError, DbfResult};

/// Size in bytes of the fixed file header
pub const HEADER_LEN: usize = 32;
/// Size in bytes of one column descriptor record
pub const DESCRIPTOR_LEN: usize = 32;
/// Byte terminating the column descriptor array
pub const FIELD_TERMINATOR: u8 = 0x0D;
/// Leading record byte marking a logically deleted record
pub const DELETED_MARKER: u8 = b'*';

/// The fixed 32-byte DBF file header
#[derive(Debug, Clone)]
pub struct FileHeader {
    /// DBF version byte
    pub version: u8,
    /// Last update date as raw (year, month, day) bytes
    pub last_update: (u8, u8, u8),
    /// Number of data records in the file
    pub record_count: u32,
    /// Offset in bytes of the first data record
    pub header_size: u16,
    /// Size in bytes of one record, including the deletion flag
    pub row_size: u16,
    /// MDX index flag byte
    pub mdx: u8,
    /// Language driver (codepage) byte
    pub language_driver: u8,
}

impl FileHeader {
    /// Decode the header from its 32-byte on-disk form.
    ///
    /// Fails with [`DbfError::Format`] when the declared sizes or record
    /// count are not usable.
    pub fn from_bytes(buf: &[u8; HEADER_LEN]) -> DbfResult<Self> {
        let record_count = i32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
        if record_count < 0 {
            return Err(DbfError::format(format!(
                "negative record count: {record_count}"
            )));
        }

        let header_size = u16::from_le_bytes([buf[8], buf[9]]);
        if header_size == 0 {
            return Err(DbfError::format("declared header size is zero"));
        }

        let row_size = u16::from_le_bytes([buf[10], buf[11]]);
        if row_size == 0 {
            return Err(DbfError::format("declared row size is zero"));
        }

        Ok(Self {
            version: buf[0],
            last_update: (buf[1], buf[2], buf[3]),
            record_count: record_count as u32,
            header_size,
            row_size,
            mdx: buf[28],
            language_driver: buf[29],
        })
    }
}

/// Declared type of a DBF column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `C` — fixed-width character data
    Character,
    /// `D` — date stored as eight text bytes, `YYYYMMDD`
    Date,
    /// `T` — Julian day number plus milliseconds since midnight
    Timestamp,
    /// `L` — one-byte logical flag
    Logical,
    /// `N` — number stored as right-aligned text
    Numeric,
    /// `F` — floating point stored as text
    Float,
    /// Any other type code; decoded like character data
    Other(u8),
}

impl FieldType {
    pub fn from_code(code: u8) -> Self {
        match code {
            b'C' => Self::Character,
            b'D' => Self::Date,
            b'T' => Self::Timestamp,
            b'L' => Self::Logical,
            b'N' => Self::Numeric,
            b'F' => Self::Float,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::Character => b'C',
            Self::Date => b'D',
            Self::Timestamp => b'T',
            Self::Logical => b'L',
            Self::Numeric => b'N',
            Self::Float => b'F',
            Self::Other(code) => *code,
        }
    }
}

/// One 32-byte column descriptor.
///
/// Declaration order defines the sequential byte offsets of the columns
/// within a record; the stored 4-byte address field is legacy and ignored.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    /// Column name, at most 10 characters
    pub name: String,
    /// Declared field type
    pub field_type: FieldType,
    /// Declared field length in bytes
    pub length: u8,
    /// Declared decimal count
    pub decimal_count: u8,
}

impl ColumnDescriptor {
    /// Decode a descriptor from its 32-byte on-disk form.
    pub fn from_bytes(buf: &[u8; DESCRIPTOR_LEN]) -> DbfResult<Self> {
        // 11-byte fixed-width name, NUL padded
        let name_bytes = &buf[..11];
        let name_end = name_bytes.iter().position(|&b| b == 0).unwrap_or(11);
        let name = ISO_8859_1
            .decode(&name_bytes[..name_end], DecoderTrap::Strict)
            .map_err(|e| DbfError::format(format!("undecodable column name: {e}")))?
            .trim()
            .to_string();

        Ok(Self {
            name,
            field_type: FieldType::from_code(buf[11]),
            length: buf[16],
            decimal_count: buf[17],
        })
    }
}
