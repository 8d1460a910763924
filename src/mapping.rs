//! Row-to-record mapping driven by statically registered descriptor tables.
//!
//! A record type declares a [`TableBinding`]: the table name it reads from
//! and one [`FieldBinding`] per property. The binding replaces runtime
//! reflection; it is built once as a `static` and queried by name. Ignored
//! fields keep their `Default` value and are invisible to lookup and
//! validation alike.
//!
//! ```
//! use dbf_stream::{DbfResult, DbfRow, FieldBinding, FromRow, TableBinding, resolve_field};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     full_name: String,
//!     age: i32,
//!     notes: String,
//! }
//!
//! static PERSON_BINDING: TableBinding = TableBinding {
//!     table: "PERSONS",
//!     fields: &[
//!         FieldBinding::new("full_name").column("NAME").primary_key(),
//!         FieldBinding::new("AGE"),
//!         FieldBinding::new("notes").ignored(),
//!     ],
//! };
//!
//! impl FromRow for Person {
//!     fn binding() -> &'static TableBinding {
//!         &PERSON_BINDING
//!     }
//!
//!     fn from_row(row: &DbfRow) -> DbfResult<Self> {
//!         let fields = Self::binding().fields;
//!         Ok(Self {
//!             full_name: resolve_field(row, &fields[0])?,
//!             age: resolve_field(row, &fields[1])?,
//!             notes: Default::default(), // ignored, never read
//!         })
//!     }
//! }
//! ```

use crate::error::{DbfError, DbfResult};
use crate::row::DbfRow;

/// Static mapping metadata for one target record type.
#[derive(Debug, Clone, Copy)]
pub struct TableBinding {
    /// Source table name; informational only
    pub table: &'static str,
    /// One binding per property, in declaration order
    pub fields: &'static [FieldBinding],
}

impl TableBinding {
    /// Find a field binding by property name.
    pub fn field(&self, property: &str) -> Option<&FieldBinding> {
        self.fields.iter().find(|f| f.property == property)
    }

    /// The bindings that participate in reading, ignored ones excluded.
    pub fn included(&self) -> impl Iterator<Item = &FieldBinding> {
        self.fields.iter().filter(|f| !f.ignore)
    }

    /// The primary-key bindings, if any were flagged.
    pub fn primary_keys(&self) -> impl Iterator<Item = &FieldBinding> {
        self.fields.iter().filter(|f| f.primary_key)
    }
}

/// Mapping metadata for one property of a record type.
#[derive(Debug, Clone, Copy)]
pub struct FieldBinding {
    /// Property name on the record type
    pub property: &'static str,
    /// Explicit source column; `None` means the property name itself
    pub column: Option<&'static str>,
    /// Whether this field is part of the record's unique key
    pub primary_key: bool,
    /// Excluded from both read and validation
    pub ignore: bool,
}

impl FieldBinding {
    pub const fn new(property: &'static str) -> Self {
        Self {
            property,
            column: None,
            primary_key: false,
            ignore: false,
        }
    }

    /// Override the source column name.
    pub const fn column(mut self, name: &'static str) -> Self {
        self.column = Some(name);
        self
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// The column this field reads from: the override if present, else the
    /// property name.
    pub fn source_column(&self) -> &str {
        self.column.unwrap_or(self.property)
    }
}

/// A type constructible from a decoded [`DbfRow`] via its static binding.
pub trait FromRow: Sized {
    /// The statically registered mapping metadata for this type.
    fn binding() -> &'static TableBinding;

    /// Build one record from a row. Implementations call [`resolve_field`]
    /// for every non-ignored binding and leave ignored properties at their
    /// defaults.
    fn from_row(row: &DbfRow) -> DbfResult<Self>;
}

/// Invariant text-to-value conversion for mapped field targets.
pub trait FieldConvert: Sized {
    /// Numeric targets substitute `"0"` for empty source text.
    const EMPTY_AS_ZERO: bool = false;

    fn convert(text: &str) -> Result<Self, String>;
}

impl FieldConvert for String {
    fn convert(text: &str) -> Result<Self, String> {
        Ok(text.to_string())
    }
}

impl FieldConvert for bool {
    fn convert(text: &str) -> Result<Self, String> {
        match text {
            "1" => Ok(true),
            "0" => Ok(false),
            other if other.eq_ignore_ascii_case("true") => Ok(true),
            other if other.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(format!("'{other}' is not a logical value")),
        }
    }
}

macro_rules! impl_numeric_convert {
    ($($ty:ty),+) => {
        $(
            impl FieldConvert for $ty {
                const EMPTY_AS_ZERO: bool = true;

                fn convert(text: &str) -> Result<Self, String> {
                    text.parse::<$ty>().map_err(|e| {
                        format!("'{text}' is not a valid {}: {e}", stringify!($ty))
                    })
                }
            }
        )+
    };
}

impl_numeric_convert!(i16, i32, i64, u32, u64, f32, f64);

/// Resolve one bound field out of a row and convert it to its target type.
///
/// Fails with [`DbfError::Mapping`] when the resolved column is absent from
/// the row or the text is not representable as the target type.
pub fn resolve_field<T: FieldConvert>(row: &DbfRow, binding: &FieldBinding) -> DbfResult<T> {
    let column = binding.source_column();
    let text = row
        .get(column)
        .ok_or_else(|| DbfError::mapping(format!("column '{column}' not present in row")))?;

    let text = if text.is_empty() && T::EMPTY_AS_ZERO {
        "0"
    } else {
        text
    };

    T::convert(text).map_err(|e| DbfError::mapping(format!("column '{column}': {e}")))
}
