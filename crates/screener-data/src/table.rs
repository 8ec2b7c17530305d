//! Tolerant reader for semicolon-delimited tables.
//!
//! The first non-comment line is the header. Lines starting with `#` are
//! comments. A row with more fields than the header is malformed and is
//! skipped with a [`Diagnostic::SkippedRow`]; a row with fewer fields keeps
//! its trailing cells absent. Cells are trimmed, and an empty cell is absent.

use crate::diagnostics::Diagnostic;
use crate::error::{DataError, Result};
use csv::{ReaderBuilder, StringRecord};

/// Field delimiter of every tabular resource.
pub const DELIMITER: u8 = b';';

/// Leading marker of comment lines.
pub const COMMENT: u8 = b'#';

const BOM: char = '\u{feff}';

/// One data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    line: u64,
    cells: Vec<Option<String>>,
}

impl Row {
    /// 1-based line number in the source text.
    pub const fn line(&self) -> u64 {
        self.line
    }

    /// Cell at column `index`, `None` when absent or empty.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.cells.get(index).and_then(|cell| cell.as_deref())
    }
}

/// A parsed table.
#[derive(Debug, Clone)]
pub struct Table {
    resource: String,
    headers: Vec<String>,
    rows: Vec<Row>,
    diagnostics: Vec<Diagnostic>,
}

impl Table {
    /// Parse `text`, naming it `resource` in diagnostics.
    ///
    /// # Errors
    /// Returns [`DataError::Parse`] when the text holds no header row, and
    /// [`DataError::Csv`] when the header itself cannot be decoded.
    pub fn parse(resource: impl Into<String>, text: &str) -> Result<Self> {
        let resource = resource.into();
        let mut reader = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .comment(Some(COMMENT))
            .flexible(true)
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let h = if i == 0 { h.trim_start_matches(BOM) } else { h };
                h.trim().to_string()
            })
            .collect();

        if headers.iter().all(String::is_empty) {
            return Err(DataError::Parse(format!("{resource}: no header row")));
        }

        let mut rows = Vec::new();
        let mut diagnostics = Vec::new();
        let mut skip = |line: u64, reason: String| {
            let diagnostic = Diagnostic::SkippedRow {
                resource: resource.clone(),
                line,
                reason,
            };
            diagnostic.emit();
            diagnostics.push(diagnostic);
        };

        for result in reader.records() {
            match result {
                Ok(record) => {
                    let line = record_line(&record);
                    if record.len() > headers.len() {
                        skip(
                            line,
                            format!(
                                "expected {} fields, saw {}",
                                headers.len(),
                                record.len()
                            ),
                        );
                        continue;
                    }
                    let cells = record
                        .iter()
                        .map(|cell| {
                            let cell = cell.trim();
                            (!cell.is_empty()).then(|| cell.to_string())
                        })
                        .collect();
                    rows.push(Row { line, cells });
                }
                Err(e) => {
                    let line = e.position().map_or(0, |p| p.line());
                    skip(line, e.to_string());
                }
            }
        }

        Ok(Self {
            resource,
            headers,
            rows,
            diagnostics,
        })
    }

    /// Resource name given at parse time.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Column names in source order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Index of the column named exactly `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Index of the first of `names` present, tried in order.
    pub fn column_any(&self, names: &[&str]) -> Option<usize> {
        names.iter().find_map(|name| self.column(name))
    }

    /// Data rows that were kept.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of kept rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no row was kept.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows skipped while parsing.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the table, keeping only its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

fn record_line(record: &StringRecord) -> u64 {
    record.position().map_or(0, |p| p.line())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_header_and_rows() {
        let table = Table::parse("t", "Name;Symbol\nAcme ; ACM\nBeta;\n").unwrap();
        assert_eq!(table.headers(), ["Name", "Symbol"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get(0), Some("Acme"));
        assert_eq!(table.rows()[0].get(1), Some("ACM"));
        assert_eq!(table.rows()[1].get(1), None);
        assert!(table.diagnostics().is_empty());
    }

    #[test]
    fn test_skips_comments_and_strips_bom() {
        let text = "\u{feff}# generated nightly\nName;Close\n# mid-file note\nAcme;12.5\n";
        let table = Table::parse("t", text).unwrap();
        assert_eq!(table.column("Name"), Some(0));
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get(1), Some("12.5"));
    }

    #[test]
    fn test_long_rows_skipped_short_rows_padded() {
        let text = "Name;Symbol;Market\nAcme;ACM;Paris;extra\nBeta;BTA\n";
        let table = Table::parse("universe", text).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].get(0), Some("Beta"));
        assert_eq!(table.rows()[0].get(2), None);

        assert_eq!(table.diagnostics().len(), 1);
        match &table.diagnostics()[0] {
            Diagnostic::SkippedRow { resource, line, .. } => {
                assert_eq!(resource, "universe");
                assert_eq!(*line, 2);
            }
            other => panic!("unexpected diagnostic {other:?}"),
        }
    }

    #[test]
    fn test_quoted_delimiter() {
        let table = Table::parse("t", "Name;Sector\n\"Acme; Inc\";Tech\n").unwrap();
        assert_eq!(table.rows()[0].get(0), Some("Acme; Inc"));
    }

    #[test]
    fn test_empty_body_is_parse_error() {
        assert!(matches!(Table::parse("t", ""), Err(DataError::Parse(_))));
        assert!(matches!(
            Table::parse("t", "# only a comment\n"),
            Err(DataError::Parse(_))
        ));
    }

    #[test]
    fn test_column_any_prefers_first_spelling() {
        let table = Table::parse("t", "name;Name\na;b\n").unwrap();
        assert_eq!(table.column_any(&["Name", "name"]), Some(1));
        assert_eq!(table.column_any(&["Ticker"]), None);
    }
}
