//! End-to-end tests over on-disk DBF fixtures.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::DbfError;
use crate::mapping::{FieldBinding, FromRow, TableBinding, resolve_field};
use crate::reader::DbfReader;
use crate::row::DbfRow;

struct FixtureColumn {
    name: &'static str,
    type_code: u8,
    length: u8,
}

const fn col(name: &'static str, type_code: u8, length: u8) -> FixtureColumn {
    FixtureColumn {
        name,
        type_code,
        length,
    }
}

/// One fixture record: deletion flag plus raw field payloads, padded with
/// spaces to each column's declared length.
struct FixtureRecord {
    deleted: bool,
    fields: Vec<Vec<u8>>,
}

fn record(fields: &[&[u8]]) -> FixtureRecord {
    FixtureRecord {
        deleted: false,
        fields: fields.iter().map(|f| f.to_vec()).collect(),
    }
}

fn deleted_record(fields: &[&[u8]]) -> FixtureRecord {
    FixtureRecord {
        deleted: true,
        fields: fields.iter().map(|f| f.to_vec()).collect(),
    }
}

fn write_dbf(
    dir: &TempDir,
    name: &str,
    language_driver: u8,
    columns: &[FixtureColumn],
    records: &[FixtureRecord],
) -> PathBuf {
    let path = dir.path().join(name);
    let row_size: u16 = 1 + columns.iter().map(|c| u16::from(c.length)).sum::<u16>();
    let header_size: u16 = 32 + 32 * columns.len() as u16 + 1;

    let mut buf = Vec::new();
    buf.push(0x03u8); // dBASE III without memo
    buf.extend_from_slice(&[24, 6, 15]); // last update
    buf.extend_from_slice(&(records.len() as i32).to_le_bytes());
    buf.extend_from_slice(&header_size.to_le_bytes());
    buf.extend_from_slice(&row_size.to_le_bytes());
    buf.extend_from_slice(&[0u8; 16]);
    buf.push(0); // mdx
    buf.push(language_driver);
    buf.extend_from_slice(&[0u8; 2]);

    for column in columns {
        let mut descriptor = [0u8; 32];
        descriptor[..column.name.len()].copy_from_slice(column.name.as_bytes());
        descriptor[11] = column.type_code;
        descriptor[16] = column.length;
        buf.extend_from_slice(&descriptor);
    }
    buf.push(0x0D);

    for rec in records {
        buf.push(if rec.deleted { b'*' } else { b' ' });
        for (column, field) in columns.iter().zip(&rec.fields) {
            let mut padded = field.clone();
            padded.resize(usize::from(column.length), b' ');
            buf.extend_from_slice(&padded);
        }
    }

    write_bytes(&path, &buf);
    path
}

fn write_bytes(path: &Path, bytes: &[u8]) {
    let mut file = File::create(path).unwrap();
    file.write_all(bytes).unwrap();
}

fn people_columns() -> Vec<FixtureColumn> {
    vec![
        col("NAME", b'C', 10),
        col("AGE", b'N', 4),
        col("BIRTH", b'D', 8),
        col("ACTIVE", b'L', 1),
    ]
}

fn people_fixture(dir: &TempDir) -> PathBuf {
    write_dbf(
        dir,
        "people.dbf",
        0,
        &people_columns(),
        &[
            record(&[b"JOHN", b"42", b"19820615", b"Y"]),
            record(&[b"JANE", b"37", b"19870301", b"N"]),
            record(&[b"BOB", b"", b"19900101", b"Y"]),
        ],
    )
}

#[test]
fn test_open_decodes_header_and_columns() {
    let dir = TempDir::new().unwrap();
    let mut reader = DbfReader::open(people_fixture(&dir)).unwrap();

    assert_eq!(reader.columns(), &["NAME", "AGE", "BIRTH", "ACTIVE"]);
    assert_eq!(reader.max_rows(), 3);
    assert_eq!(reader.header().version, 0x03);

    // the column widths plus the deletion flag account for the whole row
    let widths: u16 = reader
        .column_descriptors()
        .iter()
        .map(|c| u16::from(c.length))
        .sum();
    assert_eq!(widths + 1, reader.header().row_size);

    let first = reader.read_row().unwrap().unwrap();
    assert_eq!(first.columns().collect::<Vec<_>>(), vec![
        "NAME", "AGE", "BIRTH", "ACTIVE"
    ]);
}

#[test]
fn test_sequential_read_until_eof() {
    let dir = TempDir::new().unwrap();
    let mut reader = DbfReader::open(people_fixture(&dir)).unwrap();

    let mut names = Vec::new();
    while let Some(row) = reader.read_row().unwrap() {
        names.push(row["NAME"].to_string());
    }

    assert_eq!(names, vec!["JOHN", "JANE", "BOB"]);
    assert!(reader.eof());
    assert_eq!(reader.position(), 3);
    // reading past the end stays empty, never errors
    assert!(reader.read_row().unwrap().is_none());
}

#[test]
fn test_field_decoding_end_to_end() {
    let dir = TempDir::new().unwrap();
    let mut reader = DbfReader::open(people_fixture(&dir)).unwrap();

    let row = reader.read_row().unwrap().unwrap();
    assert_eq!(&row["NAME"], "JOHN");
    assert_eq!(&row["AGE"], "42");
    assert_eq!(&row["BIRTH"], "1982.06.15");
    assert_eq!(&row["ACTIVE"], "1");

    let row = reader.read_row().unwrap().unwrap();
    assert_eq!(&row["ACTIVE"], "0");

    // empty numeric text stays empty at this layer; the mapper zero-fills
    let row = reader.read_row().unwrap().unwrap();
    assert_eq!(&row["AGE"], "");
}

#[test]
fn test_deleted_records_are_skipped_but_advance_position() {
    let dir = TempDir::new().unwrap();
    let path = write_dbf(
        &dir,
        "deleted.dbf",
        0,
        &[col("NAME", b'C', 10)],
        &[
            record(&[b"FIRST"]),
            deleted_record(&[b"GONE"]),
            record(&[b"LAST"]),
        ],
    );
    let mut reader = DbfReader::open(path).unwrap();

    let row = reader.read_row().unwrap().unwrap();
    assert_eq!(&row["NAME"], "FIRST");
    assert_eq!(reader.position(), 1);

    // the deleted record is consumed silently on the way to the next row
    let row = reader.read_row().unwrap().unwrap();
    assert_eq!(&row["NAME"], "LAST");
    assert_eq!(reader.position(), 3);
    assert!(reader.eof());
}

#[test]
fn test_rows_iterator_is_restartable() {
    let dir = TempDir::new().unwrap();
    let mut reader = DbfReader::open(people_fixture(&dir)).unwrap();

    let first_pass: Vec<DbfRow> = reader.rows().map(|r| r.unwrap()).collect();
    assert_eq!(first_pass.len(), 3);
    assert_eq!(reader.position(), 0);

    // a fresh iteration reproduces the same first row
    let second_pass: Vec<DbfRow> = reader.rows().map(|r| r.unwrap()).collect();
    assert_eq!(second_pass[0], first_pass[0]);
    assert_eq!(second_pass.len(), 3);
}

#[test]
fn test_out_of_range_position_is_ignored() {
    let dir = TempDir::new().unwrap();
    let mut reader = DbfReader::open(people_fixture(&dir)).unwrap();

    let row = reader.read_row().unwrap().unwrap();
    assert_eq!(&row["NAME"], "JOHN");

    // negative position: stored, but no seek happens, so the next read picks
    // up at the record the file offset already points at
    reader.set_position(-1).unwrap();
    assert_eq!(reader.position(), -1);
    assert!(!reader.eof());
    let row = reader.read_row().unwrap().unwrap();
    assert_eq!(&row["NAME"], "JANE");
    assert_eq!(reader.position(), 0);

    // past-the-end position: stored, reads act as at EOF
    reader.set_position(99).unwrap();
    assert_eq!(reader.position(), 99);
    assert!(reader.eof());
    assert!(reader.read_row().unwrap().is_none());

    // an in-range position still seeks normally afterwards
    reader.set_position(1).unwrap();
    let row = reader.read_row().unwrap().unwrap();
    assert_eq!(&row["NAME"], "JANE");
}

#[test]
fn test_unknown_language_driver_falls_back_to_latin1() {
    let dir = TempDir::new().unwrap();
    let path = write_dbf(
        &dir,
        "unknown_driver.dbf",
        255,
        &[col("NAME", b'C', 4)],
        &[record(&[&[67, 97, 102, 233]])], // "Café" in ISO-8859-1
    );
    let mut reader = DbfReader::open(path).unwrap();

    assert_eq!(reader.encoding().name(), "iso-8859-1");
    let row = reader.read_row().unwrap().unwrap();
    assert_eq!(&row["NAME"], "Café");
}

#[test]
fn test_caller_supplied_encoding_wins() {
    let dir = TempDir::new().unwrap();
    // driver 201 would resolve to windows-1251; the override must win
    let path = write_dbf(
        &dir,
        "override.dbf",
        201,
        &[col("NAME", b'C', 4)],
        &[record(&[b"ABCD"])],
    );
    let reader =
        DbfReader::open_with_encoding(&path, encoding::all::WINDOWS_1252).unwrap();
    assert_eq!(reader.encoding().name(), "windows-1252");

    let reader = DbfReader::open(&path).unwrap();
    assert_eq!(reader.encoding().name(), "windows-1251");
}

#[test]
fn test_undecodable_bytes_propagate_as_encoding_error() {
    let dir = TempDir::new().unwrap();
    let path = write_dbf(
        &dir,
        "bad_bytes.dbf",
        0,
        &[col("NAME", b'C', 2)],
        &[record(&[&[0xFF, 0xFE]])],
    );

    // 0xFF 0xFE is not valid UTF-8, and strict decoding must not substitute
    let mut reader = DbfReader::open_with_encoding(path, encoding::all::UTF_8).unwrap();
    let err = reader.read_row().unwrap_err();
    assert!(matches!(err, DbfError::Encoding(_)));
}

#[test]
fn test_timestamp_field_end_to_end() {
    let dir = TempDir::new().unwrap();

    let mut stamp = Vec::new();
    stamp.extend_from_slice(&2451545i32.to_le_bytes()); // 2000-01-01
    stamp.extend_from_slice(&((13 * 3600 + 30 * 60) * 1000i32).to_le_bytes());

    let path = write_dbf(
        &dir,
        "stamps.dbf",
        0,
        &[col("SEEN", b'T', 8)],
        &[record(&[&stamp])],
    );
    let mut reader = DbfReader::open(path).unwrap();

    let row = reader.read_row().unwrap().unwrap();
    assert_eq!(&row["SEEN"], "01/01/2000 13:30:00");
}

#[test]
fn test_numeric_comma_separator_end_to_end() {
    let dir = TempDir::new().unwrap();
    let path = write_dbf(
        &dir,
        "prices.dbf",
        0,
        &[col("PRICE", b'N', 8)],
        &[record(&[b"  102,75"]), record(&[b"  free  "])],
    );
    let mut reader = DbfReader::open(path).unwrap();

    assert_eq!(&reader.read_row().unwrap().unwrap()["PRICE"], "102.75");
    // non-numeric text is left as trimmed text
    assert_eq!(&reader.read_row().unwrap().unwrap()["PRICE"], "free");
}

#[test]
fn test_empty_file_is_immediately_eof() {
    let dir = TempDir::new().unwrap();
    let path = write_dbf(&dir, "empty.dbf", 0, &people_columns(), &[]);
    let mut reader = DbfReader::open(path).unwrap();

    assert!(reader.eof());
    assert!(reader.read_row().unwrap().is_none());
    assert_eq!(reader.rows().count(), 0);
}

#[test]
fn test_truncated_header_is_format_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.dbf");
    write_bytes(&path, &[0x03, 0, 0, 0, 1]);

    let err = DbfReader::open(path).unwrap_err();
    assert!(matches!(err, DbfError::Format(_)));
}

#[test]
fn test_missing_terminator_is_format_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no_terminator.dbf");

    // valid header followed by one descriptor and then end of file
    let mut buf = Vec::new();
    buf.push(0x03u8);
    buf.extend_from_slice(&[24, 6, 15]);
    buf.extend_from_slice(&1i32.to_le_bytes());
    buf.extend_from_slice(&65u16.to_le_bytes()); // 32 + 32 + terminator
    buf.extend_from_slice(&11u16.to_le_bytes());
    buf.extend_from_slice(&[0u8; 20]);
    let mut descriptor = [0u8; 32];
    descriptor[..4].copy_from_slice(b"NAME");
    descriptor[11] = b'C';
    descriptor[16] = 10;
    buf.extend_from_slice(&descriptor);
    // no 0x0D where the terminator belongs, and the file ends mid-descriptor
    buf.push(b' ');
    write_bytes(&path, &buf);

    let err = DbfReader::open(path).unwrap_err();
    assert!(matches!(err, DbfError::Format(_)));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = DbfReader::open("/nonexistent/path/people.dbf").unwrap_err();
    assert!(matches!(err, DbfError::Io(_)));
}

#[derive(Debug, Default, PartialEq)]
struct Person {
    full_name: String,
    age: i32,
    active: bool,
    internal_note: String,
}

static PERSON_BINDING: TableBinding = TableBinding {
    table: "PEOPLE",
    fields: &[
        FieldBinding::new("full_name").column("NAME").primary_key(),
        FieldBinding::new("AGE"),
        FieldBinding::new("ACTIVE"),
        FieldBinding::new("internal_note").ignored(),
    ],
};

impl FromRow for Person {
    fn binding() -> &'static TableBinding {
        &PERSON_BINDING
    }

    fn from_row(row: &DbfRow) -> crate::DbfResult<Self> {
        let fields = Self::binding().fields;
        Ok(Self {
            full_name: resolve_field(row, &fields[0])?,
            age: resolve_field(row, &fields[1])?,
            active: resolve_field(row, &fields[2])?,
            internal_note: Default::default(),
        })
    }
}

#[test]
fn test_typed_records_end_to_end() {
    let dir = TempDir::new().unwrap();
    let mut reader = DbfReader::open(people_fixture(&dir)).unwrap();

    let people: Vec<Person> = reader.records::<Person>().map(|r| r.unwrap()).collect();
    assert_eq!(people.len(), 3);
    assert_eq!(people[0], Person {
        full_name: "JOHN".to_string(),
        age: 42,
        active: true,
        internal_note: String::new(),
    });
    // empty numeric text maps to zero
    assert_eq!(people[2].age, 0);
    assert_eq!(people[2].full_name, "BOB");
}

#[test]
fn test_typed_records_are_restartable() {
    let dir = TempDir::new().unwrap();
    let mut reader = DbfReader::open(people_fixture(&dir)).unwrap();

    let first: Vec<String> = reader
        .records::<Person>()
        .map(|r| r.unwrap().full_name)
        .collect();
    let second: Vec<String> = reader
        .records::<Person>()
        .map(|r| r.unwrap().full_name)
        .collect();
    assert_eq!(first, second);
}

#[test]
fn test_mapping_failure_does_not_abort_iteration() {
    let dir = TempDir::new().unwrap();
    let path = write_dbf(
        &dir,
        "mixed.dbf",
        0,
        &[col("NAME", b'C', 10), col("AGE", b'C', 6), col("ACTIVE", b'L', 1)],
        &[
            record(&[b"GOOD", b"30", b"Y"]),
            record(&[b"BAD", b"thirty", b"Y"]),
            record(&[b"ALSOGOOD", b"31", b"N"]),
        ],
    );
    let mut reader = DbfReader::open(path).unwrap();

    let results: Vec<crate::DbfResult<Person>> = reader.records::<Person>().collect();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().age, 30);
    assert!(matches!(results[1], Err(DbfError::Mapping(_))));
    assert_eq!(results[2].as_ref().unwrap().age, 31);
}

#[test]
fn test_ignored_property_survives_missing_column() {
    let dir = TempDir::new().unwrap();
    // no INTERNAL_NOTE column anywhere in the file
    let mut reader = DbfReader::open(people_fixture(&dir)).unwrap();

    let person = reader.records::<Person>().next().unwrap().unwrap();
    assert_eq!(person.internal_note, String::new());
}
