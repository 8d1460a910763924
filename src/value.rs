//! Per-type decoding of raw field bytes into text.
//!
//! Every field decodes to a `String`; typed coercion is the mapping layer's
//! job. The cursor hands each column exactly its declared length in bytes,
//! sliced sequentially out of the record buffer.

use chrono::{Duration, NaiveDate, NaiveTime};
use encoding::{DecoderTrap, EncodingRef};

use crate::error::{DbfError, DbfResult};
use crate::header::{ColumnDescriptor, FieldType};
use crate::text;

/// Decode one column's raw byte range according to its declared type.
pub fn decode_field(
    column: &ColumnDescriptor,
    bytes: &[u8],
    encoding: EncodingRef,
) -> DbfResult<String> {
    let value = match column.field_type {
        FieldType::Date => decode_date(column, bytes, encoding)?,
        FieldType::Timestamp => decode_timestamp_field(column, bytes)?,
        FieldType::Logical => decode_logical(bytes),
        _ => decode_text(bytes, encoding)?,
    };
    Ok(text::clean(&value))
}

/// Date fields carry eight text bytes, `YYYYMMDD`, reassembled as
/// `"YYYY.MM.DD"`. No calendar validation is performed.
fn decode_date(column: &ColumnDescriptor, bytes: &[u8], encoding: EncodingRef) -> DbfResult<String> {
    if bytes.len() < 8 {
        return Err(DbfError::format(format!(
            "date column '{}' is {} bytes, expected at least 8",
            column.name,
            bytes.len()
        )));
    }

    let year = decode_strict(&bytes[0..4], encoding)?;
    let month = decode_strict(&bytes[4..6], encoding)?;
    let day = decode_strict(&bytes[6..8], encoding)?;
    Ok(text::compact(&format!("{year}.{month}.{day}")))
}

fn decode_timestamp_field(column: &ColumnDescriptor, bytes: &[u8]) -> DbfResult<String> {
    if bytes.len() < 8 {
        return Err(DbfError::format(format!(
            "timestamp column '{}' is {} bytes, expected at least 8",
            column.name,
            bytes.len()
        )));
    }

    let julian = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let millis = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    decode_timestamp(julian, millis)
}

/// One byte: `'Y'` means true, anything else false.
fn decode_logical(bytes: &[u8]) -> String {
    let flag = if bytes.first() == Some(&b'Y') { "1" } else { "0" };
    flag.to_string()
}

/// Character, numeric and unknown types: decode with the resolved encoding,
/// normalize, and canonicalize plain decimal text.
fn decode_text(bytes: &[u8], encoding: EncodingRef) -> DbfResult<String> {
    let decoded = decode_strict(bytes, encoding)?;
    let cleaned = text::clean(&decoded);
    Ok(canonical_decimal(&cleaned).unwrap_or(cleaned))
}

fn decode_strict(bytes: &[u8], encoding: EncodingRef) -> DbfResult<String> {
    encoding
        .decode(bytes, DecoderTrap::Strict)
        .map_err(|e| DbfError::encoding(format!("{} decode failed: {e}", encoding.name())))
}

/// Assemble a timestamp field from its Julian day number and
/// milliseconds-since-midnight, formatted invariantly as
/// `MM/DD/YYYY HH:MM:SS`.
pub fn decode_timestamp(julian: i32, millis: i32) -> DbfResult<String> {
    let (year, month, day) = julian_to_gregorian(i64::from(julian));
    let year = i32::try_from(year)
        .ok()
        .filter(|y| (1..=9999).contains(y))
        .ok_or_else(|| DbfError::format(format!("julian day {julian} out of range")))?;

    let date = NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .ok_or_else(|| DbfError::format(format!("julian day {julian} out of range")))?;
    let datetime = date
        .and_time(NaiveTime::MIN)
        .checked_add_signed(Duration::milliseconds(i64::from(millis)))
        .ok_or_else(|| DbfError::format(format!("timestamp overflow: {millis} ms")))?;

    Ok(datetime.format("%m/%d/%Y %H:%M:%S").to_string())
}

/// Julian day number to Gregorian (year, month, day), integer arithmetic only.
/// See <http://en.wikipedia.org/wiki/Julian_day>.
fn julian_to_gregorian(julian: i64) -> (i64, i64, i64) {
    let s1 = julian + 68569;
    let n = 4 * s1 / 146097;
    let s2 = s1 - (146097 * n + 3) / 4;
    let i = 4000 * (s2 + 1) / 1461001;
    let s3 = s2 - 1461 * i / 4 + 31;
    let q = 80 * s3 / 2447;
    let s4 = q / 11;

    let year = 100 * (n - 49) + i + s4;
    let month = q + 2 - 12 * s4;
    let day = s3 - 2447 * q / 80;
    (year, month, day)
}

/// Re-emit text that parses as a plain decimal in canonical invariant form.
///
/// Accepts `,` as a decimal separator and an optional leading sign; rejects
/// exponents and anything that is not digits around at most one separator.
/// Returns `None` when the text is not a decimal, leaving it as plain text.
pub fn canonical_decimal(input: &str) -> Option<String> {
    let normalized = input.replace(',', ".");

    let (sign, digits) = match normalized.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", normalized.strip_prefix('+').unwrap_or(&normalized)),
    };
    if digits.is_empty() {
        return None;
    }

    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (digits, None),
    };
    let all_digits =
        |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !frac_part.map_or(true, all_digits) {
        return None;
    }
    if int_part.is_empty() && frac_part.map_or(true, str::is_empty) {
        return None;
    }

    let int_canonical = int_part.trim_start_matches('0');
    let int_canonical = if int_canonical.is_empty() { "0" } else { int_canonical };

    let mut out = String::new();
    // a value of zero never keeps its sign
    let is_zero = int_canonical == "0" && frac_part.map_or(true, |f| f.bytes().all(|b| b == b'0'));
    if !is_zero {
        out.push_str(sign);
    }
    out.push_str(int_canonical);
    match frac_part {
        Some(frac) if !frac.is_empty() => {
            out.push('.');
            out.push_str(frac);
        }
        _ => {}
    }
    Some(out)
}
