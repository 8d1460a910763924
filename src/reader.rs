//! Sequential DBF reader: open, cursor movement, and lazy row production.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::marker::PhantomData;
use std::path::Path;

use encoding::EncodingRef;
use log::{debug, trace};

use crate::codepage;
use crate::error::{DbfError, DbfResult};
use crate::header::{
    ColumnDescriptor, DELETED_MARKER, DESCRIPTOR_LEN, FIELD_TERMINATOR, FileHeader, HEADER_LEN,
};
use crate::mapping::FromRow;
use crate::row::DbfRow;
use crate::value;

/// Sequential reader over one DBF file.
///
/// The header and column list are decoded once at open and stay immutable;
/// the only mutable state is the record cursor and the underlying file
/// offset. The file handle is exclusively owned and closes when the reader
/// is dropped.
pub struct DbfReader {
    file: File,
    header: FileHeader,
    columns: Vec<ColumnDescriptor>,
    column_names: Vec<String>,
    encoding: EncodingRef,
    position: i64,
}

impl std::fmt::Debug for DbfReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbfReader")
            .field("file", &self.file)
            .field("header", &self.header)
            .field("columns", &self.columns)
            .field("column_names", &self.column_names)
            .field("encoding", &self.encoding.name())
            .field("position", &self.position)
            .finish()
    }
}

impl DbfReader {
    /// Open a DBF file, resolving the text encoding from the header's
    /// language-driver byte.
    pub fn open<P: AsRef<Path>>(path: P) -> DbfResult<Self> {
        Self::open_inner(path.as_ref(), None)
    }

    /// Open a DBF file with a caller-supplied encoding, which takes
    /// precedence over the language-driver byte.
    pub fn open_with_encoding<P: AsRef<Path>>(path: P, encoding: EncodingRef) -> DbfResult<Self> {
        Self::open_inner(path.as_ref(), Some(encoding))
    }

    fn open_inner(path: &Path, encoding_override: Option<EncodingRef>) -> DbfResult<Self> {
        let mut file = File::open(path)?;

        let mut header_buf = [0u8; HEADER_LEN];
        read_exact_or_format(&mut file, &mut header_buf, "file header")?;
        let header = FileHeader::from_bytes(&header_buf)?;

        if file.metadata()?.len() < u64::from(header.header_size) {
            return Err(DbfError::format(format!(
                "file is shorter than the declared header size of {} bytes",
                header.header_size
            )));
        }

        let columns = read_columns(&mut file)?;
        let column_names = columns.iter().map(|c| c.name.clone()).collect();

        let encoding =
            encoding_override.unwrap_or_else(|| codepage::resolve(header.language_driver));

        // position 0 is the first data record
        file.seek(SeekFrom::Start(u64::from(header.header_size)))?;

        debug!(
            "opened {}: version 0x{:02x}, {} columns, {} records, encoding {}",
            path.display(),
            header.version,
            columns.len(),
            header.record_count,
            encoding.name()
        );

        Ok(Self {
            file,
            header,
            columns,
            column_names,
            encoding,
            position: 0,
        })
    }

    /// The decoded file header.
    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    /// Full column descriptors in declaration order.
    pub fn column_descriptors(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.column_names
    }

    /// The text encoding used for character data.
    pub fn encoding(&self) -> EncodingRef {
        self.encoding
    }

    /// Number of records the file declares, deleted ones included.
    pub fn max_rows(&self) -> u32 {
        self.header.record_count
    }

    /// Current record cursor.
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Move the record cursor.
    ///
    /// The value is stored unconditionally, but the file offset only moves
    /// when the target lies inside `[0, max_rows)`. An out-of-range value is
    /// accepted without error and performs no seek, so the next read picks up
    /// wherever the file offset already was. This leniency is long-standing
    /// observable behavior; keep it.
    pub fn set_position(&mut self, position: i64) -> DbfResult<()> {
        self.position = position;

        if position < 0 || position >= i64::from(self.header.record_count) {
            return Ok(());
        }

        let offset = u64::from(self.header.header_size)
            + position as u64 * u64::from(self.header.row_size);
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Whether the cursor is at or past the last record.
    pub fn eof(&self) -> bool {
        self.position >= i64::from(self.header.record_count)
    }

    /// Read the record at the cursor and advance by one.
    ///
    /// Returns `Ok(None)` at end of file. Records whose first byte is the
    /// deletion marker are skipped iteratively; each one still advances the
    /// cursor, but produces no output.
    pub fn read_row(&mut self) -> DbfResult<Option<DbfRow>> {
        loop {
            if self.eof() {
                return Ok(None);
            }

            let mut record = vec![0u8; usize::from(self.header.row_size)];
            self.file.read_exact(&mut record)?;
            self.position += 1;

            if record[0] == DELETED_MARKER {
                trace!("skipping deleted record at position {}", self.position - 1);
                continue;
            }

            return self.decode_record(&record).map(Some);
        }
    }

    fn decode_record(&self, record: &[u8]) -> DbfResult<DbfRow> {
        let mut row = DbfRow::with_capacity(self.columns.len());
        let mut offset = 1; // byte 0 is the deletion flag

        for column in &self.columns {
            let end = offset + usize::from(column.length);
            if end > record.len() {
                return Err(DbfError::format(format!(
                    "record of {} bytes is too short for column '{}'",
                    record.len(),
                    column.name
                )));
            }

            let decoded = value::decode_field(column, &record[offset..end], self.encoding)?;
            row.push(column.name.clone(), decoded);
            offset = end;
        }

        Ok(row)
    }

    /// Lazy sequence of untyped rows.
    ///
    /// Rows are fetched from disk one at a time as the iterator advances.
    /// After full consumption the cursor rewinds to 0, so the same reader
    /// can be iterated from the start again.
    pub fn rows(&mut self) -> Rows<'_> {
        Rows {
            reader: self,
            finished: false,
        }
    }

    /// Lazy sequence of typed records, driven by `T`'s table binding.
    ///
    /// A mapping failure is yielded as an `Err` element for that record only;
    /// iteration continues with the next row.
    pub fn records<T: FromRow>(&mut self) -> Records<'_, T> {
        Records {
            rows: self.rows(),
            _marker: PhantomData,
        }
    }
}

/// Iterator over untyped rows; see [`DbfReader::rows`].
pub struct Rows<'a> {
    reader: &'a mut DbfReader,
    finished: bool,
}

impl Iterator for Rows<'_> {
    type Item = DbfResult<DbfRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.reader.read_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.finished = true;
                // rewind so the reader is restartable
                match self.reader.set_position(0) {
                    Ok(()) => None,
                    Err(e) => Some(Err(e)),
                }
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Iterator over typed records; see [`DbfReader::records`].
pub struct Records<'a, T> {
    rows: Rows<'a>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: FromRow> Iterator for Records<'_, T> {
    type Item = DbfResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rows.next()? {
            Ok(row) => Some(T::from_row(&row)),
            Err(e) => Some(Err(e)),
        }
    }
}

fn read_exact_or_format(file: &mut File, buf: &mut [u8], what: &str) -> DbfResult<()> {
    file.read_exact(buf).map_err(|e| {
        if e.kind() == ErrorKind::UnexpectedEof {
            DbfError::format(format!("file truncated while reading {what}"))
        } else {
            DbfError::Io(e)
        }
    })
}

fn read_columns(file: &mut File) -> DbfResult<Vec<ColumnDescriptor>> {
    let mut columns = Vec::new();

    loop {
        let mut first = [0u8; 1];
        read_exact_or_format(file, &mut first, "column descriptors")?;
        if first[0] == FIELD_TERMINATOR {
            return Ok(columns);
        }

        let mut descriptor = [0u8; DESCRIPTOR_LEN];
        descriptor[0] = first[0];
        read_exact_or_format(file, &mut descriptor[1..], "column descriptor")?;
        columns.push(ColumnDescriptor::from_bytes(&descriptor)?);
    }
}
