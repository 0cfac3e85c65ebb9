use super::column::{ColumnLayout, detect_alignment};
use super::row::{EditError, Row};
use super::schema::{self, TableSchema};
use crate::core::io::error::ParseError;

/// An ordered set of rows sharing one field schema and one column layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    header: String,
    layout: Vec<ColumnLayout>,
    rows: Vec<Row>,
}

impl Table {
    pub(crate) fn new(
        name: &str,
        columns: Vec<String>,
        header: String,
        layout: Vec<ColumnLayout>,
    ) -> Self {
        Self {
            name: name.to_string(),
            columns,
            header,
            layout,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Verbatim text preceding the first row (`loop_` and tag lines); empty for PDB tables.
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn layout(&self) -> &[ColumnLayout] {
        &self.layout
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn schema(&self) -> Option<&'static TableSchema> {
        schema::lookup(&self.name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of the first column present among `candidates`.
    pub fn first_column(&self, candidates: &[&str]) -> Option<usize> {
        candidates.iter().find_map(|c| self.column_index(c))
    }

    pub fn require_column(&self, name: &str) -> Result<usize, ParseError> {
        self.column_index(name)
            .ok_or_else(|| ParseError::MissingField {
                table: self.name.clone(),
                field: name.to_string(),
            })
    }

    /// Column holding the chain key, per the table schema.
    pub fn chain_column(&self) -> Option<usize> {
        self.schema()
            .and_then(|s| self.first_column(s.chain_fields))
    }

    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.value(column))
    }

    /// Rewrites one value, re-padding it with the column's recorded alignment.
    pub fn set_value(&mut self, row: usize, column: usize, value: &str) -> Result<(), EditError> {
        let Some(&layout) = self.layout.get(column) else {
            return Err(EditError::MissingColumn { column });
        };
        let Some(r) = self.rows.get_mut(row) else {
            return Err(EditError::MissingRow { row });
        };
        r.replace_value(column, value, layout)
    }

    pub(crate) fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    /// A table with the same schema, header and layout holding only `rows`.
    pub(crate) fn with_rows(&self, rows: Vec<Row>) -> Self {
        Self {
            name: self.name.clone(),
            columns: self.columns.clone(),
            header: self.header.clone(),
            layout: self.layout.clone(),
            rows,
        }
    }

    /// Derives the alignment of every delimited column from the parsed rows.
    pub(crate) fn detect_layout(&mut self) {
        for (column, layout) in self.layout.iter_mut().enumerate() {
            if let ColumnLayout::Delimited { alignment } = layout {
                *alignment =
                    detect_alignment(self.rows.iter().filter_map(|r| r.spans().get(column).copied()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::column::{Alignment, Span};

    fn qa_table() -> Table {
        let columns: Vec<String> = ["ordinal_id", "label_asym_id", "label_seq_id", "metric_value"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let layout = vec![
            ColumnLayout::Delimited {
                alignment: Alignment::Ragged
            };
            columns.len()
        ];
        let mut table = Table::new("ma_qa_metric_local", columns, "loop_\n".into(), layout);
        table.push_row(Row::new(
            "1 A 9  91.2\n".into(),
            vec![Span::new(0, 1), Span::new(2, 3), Span::new(4, 5), Span::new(7, 11)],
            None,
        ));
        table.push_row(Row::new(
            "2 A 10 88.0\n".into(),
            vec![Span::new(0, 1), Span::new(2, 3), Span::new(4, 6), Span::new(7, 11)],
            None,
        ));
        table.detect_layout();
        table
    }

    #[test]
    fn detect_layout_records_alignment_per_column() {
        let table = qa_table();
        assert_eq!(
            table.layout()[2],
            ColumnLayout::Delimited {
                alignment: Alignment::Left
            }
        );
        assert_eq!(
            table.layout()[3],
            ColumnLayout::Delimited {
                alignment: Alignment::Left
            }
        );
    }

    #[test]
    fn chain_column_comes_from_schema() {
        let table = qa_table();
        assert_eq!(table.chain_column(), Some(1));
    }

    #[test]
    fn require_column_reports_table_and_field() {
        let table = qa_table();
        assert_eq!(table.require_column("label_seq_id").unwrap(), 2);
        let err = table.require_column("label_comp_id").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingField { ref table, ref field }
                if table == "ma_qa_metric_local" && field == "label_comp_id"
        ));
    }

    #[test]
    fn set_value_keeps_column_width() {
        let mut table = qa_table();
        table.set_value(0, 2, "99").unwrap();
        assert_eq!(table.rows()[0].text(), "1 A 99 91.2\n");
        assert_eq!(table.value(0, 3), Some("91.2"));
    }

    #[test]
    fn set_value_outside_the_table_is_an_error() {
        let mut table = qa_table();
        let before = table.clone();
        assert_eq!(
            table.set_value(5, 2, "99"),
            Err(EditError::MissingRow { row: 5 })
        );
        assert_eq!(
            table.set_value(0, 9, "99"),
            Err(EditError::MissingColumn { column: 9 })
        );
        assert_eq!(table, before);
    }

    #[test]
    fn with_rows_keeps_metadata() {
        let table = qa_table();
        let subset = table.with_rows(vec![table.rows()[1].clone()]);
        assert_eq!(subset.name(), table.name());
        assert_eq!(subset.header(), table.header());
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.value(0, 2), Some("10"));
    }
}
