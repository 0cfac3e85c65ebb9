use super::error::ParseError;
use super::traits::StructureFile;
use crate::core::models::column::{Alignment, ColumnLayout, Span};
use crate::core::models::document::{Format, StructureDocument};
use crate::core::models::ids::TableId;
use crate::core::models::record::{RecordClass, RecordKind};
use crate::core::models::row::Row;
use crate::core::models::schema::ATOM_SITE;
use crate::core::models::table::Table;
use std::collections::HashMap;

/// Fixed columns of coordinate records, named after their mmCIF counterparts.
const COLUMNS: [(&str, usize, usize, Alignment); 8] = [
    ("group_PDB", 0, 6, Alignment::Left),
    ("id", 6, 11, Alignment::Right),
    ("auth_atom_id", 12, 16, Alignment::Left),
    ("auth_comp_id", 17, 20, Alignment::Right),
    ("auth_asym_id", 21, 22, Alignment::Left),
    ("auth_seq_id", 22, 26, Alignment::Right),
    ("pdbx_PDB_ins_code", 26, 27, Alignment::Left),
    ("B_iso_or_equiv", 60, 66, Alignment::Right),
];

/// A coordinate record must reach the end of the residue number field.
const MIN_RECORD_LEN: usize = 26;

fn record_name(line: &str) -> &str {
    line.get(..6).unwrap_or(line).trim_end()
}

fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Span of the non-blank part of `line[start..end]`, clamped to the line content.
fn value_span(line: &str, start: usize, end: usize) -> Span {
    let bytes = line.as_bytes();
    let end = end.min(bytes.len());
    let mut s = start.min(end);
    let mut e = end;
    while s < e && is_blank(bytes[s]) {
        s += 1;
    }
    while e > s && is_blank(bytes[e - 1]) {
        e -= 1;
    }
    Span::new(s, e)
}

fn atom_table() -> Table {
    let columns = COLUMNS.iter().map(|(name, ..)| name.to_string()).collect();
    let layout = COLUMNS
        .iter()
        .map(|&(_, start, end, alignment)| ColumnLayout::Fixed {
            start,
            end,
            alignment,
        })
        .collect();
    Table::new(ATOM_SITE, columns, String::new(), layout)
}

/// Reader for the fixed-column PDB text format.
///
/// `ATOM`, `HETATM`, `ANISOU` and `TER` records become rows of an `atom_site` table with
/// fixed column layouts; all other records are kept as raw text between row runs.
pub struct PdbFile;

impl StructureFile for PdbFile {
    type Error = ParseError;

    fn format() -> Format {
        Format::Pdb
    }

    fn parse(text: &str) -> Result<StructureDocument, ParseError> {
        let mut doc = StructureDocument::new(Format::Pdb);
        let mut table_id: Option<TableId> = None;
        let mut row_count = 0;
        let mut serial_classes: HashMap<String, RecordClass> = HashMap::new();
        let mut last_class: Option<RecordClass> = None;

        for (index, line) in text.split_inclusive('\n').enumerate() {
            let record = record_name(line);
            if !matches!(record, "ATOM" | "HETATM" | "ANISOU" | "TER") {
                doc.push_raw(line);
                continue;
            }

            let content = line.trim_end_matches(['\r', '\n']);
            if content.len() < MIN_RECORD_LEN {
                if record == "TER" {
                    doc.push_raw(line);
                    continue;
                }
                return Err(ParseError::RowTooShort {
                    table: ATOM_SITE.to_string(),
                    row: row_count,
                    line: index + 1,
                    required: MIN_RECORD_LEN,
                    found: content.len(),
                });
            }

            let spans: Vec<Span> = COLUMNS
                .iter()
                .map(|&(_, start, end, _)| value_span(content, start, end))
                .collect();
            let serial = content
                .get(spans[1].start..spans[1].end)
                .unwrap_or_default()
                .to_string();

            let class = match record {
                "ATOM" | "HETATM" | "TER" => {
                    let class = record
                        .parse::<RecordClass>()
                        .map_err(|e| ParseError::UnknownRecordClass {
                            table: ATOM_SITE.to_string(),
                            row: row_count,
                            line: index + 1,
                            field: "group_PDB".to_string(),
                            value: e.0,
                        })?;
                    if record != "TER" {
                        serial_classes.insert(serial, class);
                    }
                    class
                }
                _ => serial_classes
                    .get(&serial)
                    .copied()
                    .or(last_class)
                    .ok_or_else(|| ParseError::UnknownRecordClass {
                        table: ATOM_SITE.to_string(),
                        row: row_count,
                        line: index + 1,
                        field: "group_PDB".to_string(),
                        value: record.to_string(),
                    })?,
            };
            last_class = Some(class);

            let id = *table_id.get_or_insert_with(|| doc.add_table(atom_table()));
            let row = Row::new(line.to_string(), spans, Some(class))
                .with_kind(RecordKind::from_marker(record));
            doc.push_row(id, row);
            row_count += 1;
        }

        Ok(doc)
    }
}
