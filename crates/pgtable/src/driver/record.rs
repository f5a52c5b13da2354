use std::fmt;

/// A decoded result cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Float(f32),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
    /// A value the driver could not decode, tagged with its Postgres type name.
    Unsupported(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the cell variant, used in decode diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::SmallInt(_) => "smallint",
            Self::Int(_) => "int",
            Self::BigInt(_) => "bigint",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

/// String rendering of a cell. NULL and undecodable cells render as the empty
/// string, booleans as `1`/`0`.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null | Self::Unsupported(_) => Ok(()),
            Self::Bool(b) => f.write_str(if *b { "1" } else { "0" }),
            Self::SmallInt(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
        }
    }
}

/// One result row with cells addressable by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: Vec<String>,
    cells: Vec<Cell>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style append.
    pub fn with(mut self, column: impl Into<String>, cell: Cell) -> Self {
        self.push(column, cell);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, cell: Cell) {
        self.columns.push(column.into());
        self.cells.push(cell);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// The cell for `column`, if the row has that column.
    pub fn cell(&self, column: &str) -> Option<&Cell> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.cells[i])
    }

    /// Whether `column` is present and NULL.
    pub fn is_null(&self, column: &str) -> bool {
        self.cell(column).is_some_and(Cell::is_null)
    }

    /// Read `column` as a string (NULL reads as `""`).
    pub fn get_string(&self, column: &str) -> Option<String> {
        self.cell(column).map(Cell::to_string)
    }

    /// Read `column` as raw bytes, if it holds a binary cell.
    pub fn get_bytes(&self, column: &str) -> Option<&[u8]> {
        match self.cell(column) {
            Some(Cell::Bytes(b)) => Some(b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_render_as_strings() {
        assert_eq!(Cell::Null.to_string(), "");
        assert_eq!(Cell::Bool(true).to_string(), "1");
        assert_eq!(Cell::Bool(false).to_string(), "0");
        assert_eq!(Cell::Int(-7).to_string(), "-7");
        assert_eq!(Cell::Double(1.5).to_string(), "1.5");
        assert_eq!(Cell::Text("Ann".into()).to_string(), "Ann");
        assert_eq!(Cell::Bytes(b"raw".to_vec()).to_string(), "raw");
    }

    #[test]
    fn undecodable_cells_render_empty_but_are_not_null() {
        let cell = Cell::Unsupported("tsvector".into());
        assert_eq!(cell.to_string(), "");
        assert_eq!(cell.kind_name(), "unsupported");
        assert!(!cell.is_null());

        let r = Record::new().with("doc", cell);
        assert_eq!(r.get_string("doc").as_deref(), Some(""));
        assert_eq!(r.get_bytes("doc"), None);
    }

    #[test]
    fn record_lookups_by_name() {
        let r = Record::new()
            .with("id", Cell::Int(1))
            .with("name", Cell::Null)
            .with("data", Cell::Bytes(vec![1, 2]));

        assert_eq!(r.len(), 3);
        assert_eq!(r.get_string("id").as_deref(), Some("1"));
        assert!(r.is_null("name"));
        assert!(!r.is_null("id"));
        assert!(!r.is_null("missing"));
        assert_eq!(r.get_bytes("data"), Some(&[1u8, 2][..]));
        assert_eq!(r.get_bytes("id"), None);
        assert_eq!(r.get_string("missing"), None);
    }
}
