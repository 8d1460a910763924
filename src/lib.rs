//! Sequential reader for dBASE (DBF) binary files.
//!
//! This crate decodes the fixed DBF header and column descriptors, then
//! exposes each data record either as an untyped name→text [`DbfRow`] or as
//! a strongly-typed user record driven by a declarative [`TableBinding`].
//! Reading is synchronous, fully lazy, and single-threaded; the reader owns
//! its file handle exclusively and releases it on drop.
//!
//! ```no_run
//! use dbf_stream::DbfReader;
//!
//! # fn main() -> dbf_stream::DbfResult<()> {
//! let mut reader = DbfReader::open("people.dbf")?;
//! println!("columns: {:?}", reader.columns());
//! for row in reader.rows() {
//!     let row = row?;
//!     println!("{:?}", row.get("NAME"));
//! }
//! # Ok(())
//! # }
//! ```

pub mod codepage;
pub mod error;
pub mod header;
pub mod mapping;
pub mod reader;
pub mod row;
pub mod text;
pub mod value;

#[cfg(test)]
mod integration_tests;

// Re-export the error taxonomy
pub use error::{DbfError, DbfResult};

// Re-export the format model
pub use header::{ColumnDescriptor, FieldType, FileHeader};

// Re-export the reading surface
pub use reader::{DbfReader, Records, Rows};
pub use row::DbfRow;

// Re-export the mapping surface
pub use mapping::{FieldBinding, FieldConvert, FromRow, TableBinding, resolve_field};
