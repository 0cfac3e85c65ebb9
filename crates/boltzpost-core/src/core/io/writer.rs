use crate::core::models::document::{Segment, StructureDocument};
use std::fmt;
use std::io::{self, Write};

/// Emits every segment in order: raw text verbatim, table runs as their current row text.
fn emit<E>(
    doc: &StructureDocument,
    mut sink: impl FnMut(&str) -> Result<(), E>,
) -> Result<(), E> {
    for segment in doc.segments() {
        match segment {
            Segment::Raw(text) => sink(text)?,
            Segment::Table { id, rows } => {
                let Some(table) = doc.table_by_id(*id) else {
                    continue;
                };
                if rows.start == 0 {
                    sink(table.header())?;
                }
                for row in table.rows().get(rows.clone()).unwrap_or(&[]) {
                    sink(row.text())?;
                }
            }
        }
    }
    Ok(())
}

/// Serializes `doc` to `writer`.
///
/// A document that has not been edited is written back byte for byte.
pub fn write(doc: &StructureDocument, writer: &mut impl Write) -> io::Result<()> {
    emit(doc, |text| writer.write_all(text.as_bytes()))
}

impl fmt::Display for StructureDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        emit(self, |text| f.write_str(text))
    }
}
