use crate::error::Result;
use std::io::Read;
use std::path::Path;

/// Untyped cell grid as exported from a spreadsheet.
///
/// Rows may be ragged. A cell past the end of its row, an absent cell, and a
/// cell holding only whitespace all read as null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGrid {
    rows: Vec<Vec<Option<String>>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Builds a grid from plain strings, treating blank strings as null.
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell = cell.as_ref();
                        (!cell.trim().is_empty()).then(|| cell.to_string())
                    })
                    .collect()
            })
            .collect();

        Self { rows }
    }

    /// Reads a header-less CSV export. Every record becomes a row, including
    /// the title rows the cleaners skip later.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        Ok(Self::from_rows(rows))
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)?
            .get(col)?
            .as_deref()
            .filter(|value| !value.trim().is_empty())
    }

    /// Indices of the rows remaining after the first `count` are dropped.
    pub fn rows_after(&self, count: usize) -> std::ops::Range<usize> {
        count.min(self.height())..self.height()
    }

    /// Whether any row past the first `skip` holds a non-null value in `col`.
    pub fn column_has_values(&self, col: usize, skip: usize) -> bool {
        self.rows_after(skip)
            .any(|row| self.cell(row, col).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_rows_read_as_null() {
        let grid = RawGrid::from_rows(vec![vec!["a", "1", "2"], vec!["b"], vec![]]);

        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.cell(0, 1), Some("1"));
        assert_eq!(grid.cell(1, 2), None);
        assert_eq!(grid.cell(2, 0), None);
        assert_eq!(grid.cell(10, 0), None);
    }

    #[test]
    fn test_blank_cells_are_null() {
        let grid = RawGrid::new(vec![vec![Some("  ".to_string()), Some("x".to_string()), None]]);
        assert_eq!(grid.cell(0, 0), None);
        assert_eq!(grid.cell(0, 1), Some("x"));
        assert_eq!(grid.cell(0, 2), None);
    }

    #[test]
    fn test_column_has_values_respects_skip() {
        let grid = RawGrid::from_rows(vec![vec!["title", "", "note"], vec!["a", "", ""]]);
        assert!(grid.column_has_values(2, 0));
        assert!(!grid.column_has_values(2, 1));
        assert!(!grid.column_has_values(1, 0));
        assert!(!grid.column_has_values(0, 5));
    }

    #[test]
    fn test_from_csv_reader_is_flexible() {
        let data = "재무상태표,,\n계정과목,당기,전기\n유동자산,\"1,000\",900,extra\n";
        let grid = RawGrid::from_csv_reader(data.as_bytes()).unwrap();

        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.cell(0, 1), None);
        assert_eq!(grid.cell(2, 1), Some("1,000"));
        assert_eq!(grid.cell(2, 3), Some("extra"));
    }
}
