use super::column::{Alignment, ColumnLayout, Span};
use super::record::{RecordClass, RecordKind};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Value '{value}' does not fit in a {width}-character column")]
pub struct FieldOverflow {
    pub value: String,
    pub width: usize,
}

/// Why a value could not be rewritten.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error(transparent)]
    Overflow(#[from] FieldOverflow),

    #[error("Row {row} does not exist")]
    MissingRow { row: usize },

    #[error("Column {column} does not exist")]
    MissingColumn { column: usize },
}

/// One record of a table: the verbatim source line plus the location of each value in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    text: String,             // Source line, including its line terminator
    spans: Vec<Span>,         // One value span per table column
    class: Option<RecordClass>, // Set for coordinate rows only
    kind: RecordKind,
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

impl Row {
    pub(crate) fn new(text: String, spans: Vec<Span>, class: Option<RecordClass>) -> Self {
        Self {
            text,
            spans,
            class,
            kind: RecordKind::default(),
        }
    }

    pub(crate) fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = kind;
        self
    }

    /// The row exactly as it will be written, line terminator included.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn class(&self) -> Option<RecordClass> {
        self.class
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub(crate) fn set_class(&mut self, class: RecordClass) {
        self.class = Some(class);
    }

    /// Raw text of the value in `column`, without surrounding padding.
    pub fn value(&self, column: usize) -> Option<&str> {
        self.spans
            .get(column)
            .and_then(|span| self.text.get(span.start..span.end))
    }

    fn content_end(&self) -> usize {
        self.text.trim_end_matches(['\r', '\n']).len()
    }

    /// Replaces the value in `column`, re-padding according to the column layout.
    ///
    /// Text outside the edited region is left untouched; spans of later values are shifted
    /// when the row grows or shrinks.
    pub(crate) fn replace_value(
        &mut self,
        column: usize,
        value: &str,
        layout: ColumnLayout,
    ) -> Result<(), EditError> {
        let Some(&span) = self.spans.get(column) else {
            return Err(EditError::MissingColumn { column });
        };
        let (region_start, region_end, replacement, new_span) = match layout {
            ColumnLayout::Fixed {
                start,
                end,
                alignment,
            } => self.fixed_edit(start, end, alignment, value)?,
            ColumnLayout::Delimited { alignment } => {
                self.delimited_edit(column, span, alignment, value)
            }
        };

        let old_len = region_end - region_start;
        let new_len = replacement.len();
        self.text
            .replace_range(region_start..region_end, &replacement);

        for (i, s) in self.spans.iter_mut().enumerate() {
            if i == column {
                *s = new_span;
            } else if s.start >= region_end {
                s.start = s.start + new_len - old_len;
                s.end = s.end + new_len - old_len;
            }
        }
        Ok(())
    }

    fn fixed_edit(
        &self,
        start: usize,
        end: usize,
        alignment: Alignment,
        value: &str,
    ) -> Result<(usize, usize, String, Span), FieldOverflow> {
        let width = end - start;
        if value.len() > width {
            return Err(FieldOverflow {
                value: value.to_string(),
                width,
            });
        }
        let content_end = self.content_end();
        let region_end = end.min(content_end).max(start);
        let (replacement, new_span) = match alignment {
            Alignment::Right => (
                format!("{:>width$}", value, width = width),
                Span::new(end - value.len(), end),
            ),
            Alignment::Left | Alignment::Ragged => (
                format!("{:<width$}", value, width = width),
                Span::new(start, start + value.len()),
            ),
        };
        Ok((start, region_end, replacement, new_span))
    }

    fn delimited_edit(
        &self,
        column: usize,
        span: Span,
        alignment: Alignment,
        value: &str,
    ) -> (usize, usize, String, Span) {
        let bytes = self.text.as_bytes();
        let has_next = column + 1 < self.spans.len();
        let has_prev = column > 0;

        match alignment {
            Alignment::Left if has_next => {
                let mut pad_end = span.end;
                let content_end = self.content_end();
                while pad_end < content_end && is_blank(bytes[pad_end]) {
                    pad_end += 1;
                }
                let region_len = pad_end - span.start;
                let new_len = region_len.max(value.len() + 1);
                let replacement = format!("{:<width$}", value, width = new_len);
                (
                    span.start,
                    pad_end,
                    replacement,
                    Span::new(span.start, span.start + value.len()),
                )
            }
            Alignment::Right => {
                let mut pad_start = span.start;
                while pad_start > 0 && is_blank(bytes[pad_start - 1]) {
                    pad_start -= 1;
                }
                let region_len = span.end - pad_start;
                let min_sep = usize::from(has_prev);
                let new_len = region_len.max(value.len() + min_sep);
                let replacement = format!("{:>width$}", value, width = new_len);
                (
                    pad_start,
                    span.end,
                    replacement,
                    Span::new(pad_start + new_len - value.len(), pad_start + new_len),
                )
            }
            _ => (
                span.start,
                span.end,
                value.to_string(),
                Span::new(span.start, span.start + value.len()),
            ),
        }
    }
}
