use std::ops::Index;

/// One decoded DBF record: an ordered column-name → text mapping.
///
/// Insertion order matches the column declaration order of the file, which is
/// semantically significant for position-sensitive consumers. Rows are
/// transient values owned by the caller; the reader never retains them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbfRow {
    entries: Vec<(String, String)>,
}

impl DbfRow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a (column, value) pair, preserving declaration order.
    pub fn push(&mut self, column: String, value: String) {
        self.entries.push((column, value));
    }

    /// Look up a value by column name; first match wins.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Iterate (column, value) pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Index<&str> for DbfRow {
    type Output = str;

    fn index(&self, column: &str) -> &str {
        self.get(column)
            .unwrap_or_else(|| panic!("no column named '{column}' in row"))
    }
}
