use std::io;

use thiserror::Error;

/// Any error raised while reading or mapping a DBF file
#[derive(Error, Debug)]
pub enum DbfError {
    /// I/O related errors: missing file, unreadable stream, seek failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed or truncated header / column descriptors
    #[error("invalid DBF format: {0}")]
    Format(String),

    /// Bytes not decodable under the resolved encoding
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Row-to-record mapping failed for one element
    #[error("mapping error: {0}")]
    Mapping(String),
}

impl DbfError {
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Self::Format(msg.into())
    }

    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn mapping<S: Into<String>>(msg: S) -> Self {
        Self::Mapping(msg.into())
    }
}

/// Alias for fallible operations in this crate
pub type DbfResult<T> = Result<T, DbfError>;
