use std::io;
use std::str::Utf8Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Input is not valid UTF-8 text: {0}")]
    Encoding(#[from] Utf8Error),

    #[error(
        "Row {row} of table '{table}' (line {line}) has {found} value(s), but the header declares {expected}"
    )]
    ColumnMismatch {
        table: String,
        row: usize,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "Row {row} of table '{table}' (line {line}) is {found} characters long; at least {required} are required"
    )]
    RowTooShort {
        table: String,
        row: usize,
        line: usize,
        required: usize,
        found: usize,
    },

    #[error("Unterminated quoted value in table '{table}' at line {line}")]
    UnterminatedQuote { table: String, line: usize },

    #[error("Loop header at line {line} mixes categories '{expected}' and '{found}'")]
    MixedCategories {
        line: usize,
        expected: String,
        found: String,
    },

    #[error(
        "Table '{table}' appears a second time at line {line}; concatenated data blocks must be read as separate documents"
    )]
    DuplicateTable { table: String, line: usize },

    #[error(
        "Row {row} of table '{table}' (line {line}) has unknown record class '{value}' in field '{field}'"
    )]
    UnknownRecordClass {
        table: String,
        row: usize,
        line: usize,
        field: String,
        value: String,
    },

    #[error(
        "Item '{item}' of category '{table}' (line {line}) must hold one value on the same line"
    )]
    UnsupportedItemValue {
        table: String,
        item: String,
        line: usize,
    },

    #[error("Table '{table}' is missing required field '{field}'")]
    MissingField { table: String, field: String },
}
