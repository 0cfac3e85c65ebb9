use super::error::ParseError;
use super::tokenizer::tokenize;
use super::traits::StructureFile;
use crate::core::models::column::{Alignment, ColumnLayout, Span};
use crate::core::models::document::{Format, StructureDocument};
use crate::core::models::record::RecordClass;
use crate::core::models::row::Row;
use crate::core::models::schema;
use crate::core::models::table::Table;

fn has_keyword(line: &str, keyword: &str) -> bool {
    line.get(..keyword.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
}

/// Splits `_category.item` into its two halves.
fn split_tag(tag: &str) -> Option<(&str, &str)> {
    let tag = tag.split_whitespace().next()?;
    tag.strip_prefix('_')?.split_once('.')
}

/// Whether a line can belong to the body of a loop.
fn is_loop_row(line: &str) -> bool {
    let trimmed = line.trim();
    !(trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with('_')
        || trimmed.starts_with(';')
        || has_keyword(trimmed, "loop_")
        || has_keyword(trimmed, "data_")
        || has_keyword(trimmed, "save_")
        || has_keyword(trimmed, "global_")
        || has_keyword(trimmed, "stop_"))
}

/// Reader for the mmCIF text format.
///
/// Tracked categories become tables, whether written as a loop or as a run of
/// `_category.item value` lines (a single row). Every other line (untracked items and loops,
/// text fields, comments) is carried through as raw text.
pub struct MmcifFile;

impl StructureFile for MmcifFile {
    type Error = ParseError;

    fn format() -> Format {
        Format::Mmcif
    }

    fn parse(text: &str) -> Result<StructureDocument, ParseError> {
        let lines: Vec<&str> = text.split_inclusive('\n').collect();
        let mut doc = StructureDocument::new(Format::Mmcif);
        let mut i = 0;

        while i < lines.len() {
            match split_tag(lines[i]) {
                Some((category, _)) if schema::is_tracked(category) => {
                    i = read_items(&mut doc, &lines, i, category)?;
                    continue;
                }
                _ => {}
            }
            if !has_keyword(lines[i].trim(), "loop_") {
                doc.push_raw(lines[i]);
                i += 1;
                continue;
            }

            let mut body = i + 1;
            while body < lines.len() && lines[body].trim_start().starts_with('_') {
                body += 1;
            }
            let tags = &lines[i + 1..body];
            let category = tags.first().and_then(|t| split_tag(t)).map(|(c, _)| c);

            match category {
                Some(category) if schema::is_tracked(category) => {
                    i = read_loop(&mut doc, &lines, i, body, category)?;
                }
                _ => {
                    // Untracked loop: header and rows pass through line by line.
                    doc.push_raw(&lines[i..body].concat());
                    i = body;
                }
            }
        }

        Ok(doc)
    }
}

/// Reads one tracked loop whose header spans `lines[start..body]`; returns the index of
/// the first line after the loop.
fn read_loop(
    doc: &mut StructureDocument,
    lines: &[&str],
    start: usize,
    body: usize,
    category: &str,
) -> Result<usize, ParseError> {
    if doc.table_id(category).is_some() {
        return Err(ParseError::DuplicateTable {
            table: category.to_string(),
            line: start + 1,
        });
    }

    let mut columns = Vec::with_capacity(body - start - 1);
    for (offset, tag) in lines[start + 1..body].iter().enumerate() {
        match split_tag(tag) {
            Some((c, item)) if c == category => columns.push(item.to_string()),
            other => {
                return Err(ParseError::MixedCategories {
                    line: start + offset + 2,
                    expected: category.to_string(),
                    found: other.map_or_else(|| tag.trim().to_string(), |(c, _)| c.to_string()),
                });
            }
        }
    }

    let width = columns.len();
    let layout = vec![
        ColumnLayout::Delimited {
            alignment: Alignment::Ragged
        };
        width
    ];
    let mut table = Table::new(category, columns, lines[start..body].concat(), layout);

    let mut end = body;
    while end < lines.len() && is_loop_row(lines[end]) {
        let line = lines[end];
        let spans = tokenize(line).map_err(|_| ParseError::UnterminatedQuote {
            table: category.to_string(),
            line: end + 1,
        })?;
        if spans.len() != width {
            return Err(ParseError::ColumnMismatch {
                table: category.to_string(),
                row: table.len(),
                line: end + 1,
                expected: width,
                found: spans.len(),
            });
        }
        table.push_row(Row::new(line.to_string(), spans, None));
        end += 1;
    }

    classify_rows(&mut table, body + 1)?;
    table.detect_layout();

    let rows = table.len();
    let id = doc.add_table(table);
    doc.push_table_run(id, 0..rows);
    Ok(end)
}

/// Reads a tracked category written as consecutive `_category.item value` lines into a
/// table with one row; the row text is the item lines themselves. Returns the index of the
/// first line after the items.
fn read_items(
    doc: &mut StructureDocument,
    lines: &[&str],
    start: usize,
    category: &str,
) -> Result<usize, ParseError> {
    if doc.table_id(category).is_some() {
        return Err(ParseError::DuplicateTable {
            table: category.to_string(),
            line: start + 1,
        });
    }

    let mut columns = Vec::new();
    let mut spans = Vec::new();
    let mut text = String::new();
    let mut end = start;
    while end < lines.len() {
        let line = lines[end];
        let Some((c, item)) = split_tag(line) else {
            break;
        };
        if c != category {
            break;
        }
        let tokens = tokenize(line).map_err(|_| ParseError::UnterminatedQuote {
            table: category.to_string(),
            line: end + 1,
        })?;
        // Values on continuation lines or in `;` text fields are not supported.
        let [_, value] = tokens[..] else {
            return Err(ParseError::UnsupportedItemValue {
                table: category.to_string(),
                item: item.to_string(),
                line: end + 1,
            });
        };
        columns.push(item.to_string());
        spans.push(Span::new(text.len() + value.start, text.len() + value.end));
        text.push_str(line);
        end += 1;
    }

    let layout = vec![
        ColumnLayout::Delimited {
            alignment: Alignment::Ragged
        };
        columns.len()
    ];
    let mut table = Table::new(category, columns, String::new(), layout);
    table.push_row(Row::new(text, spans, None));
    classify_rows(&mut table, start + 1)?;

    let id = doc.add_table(table);
    doc.push_table_run(id, 0..1);
    Ok(end)
}

/// Decodes the record-class marker of every row, for tables that carry one.
fn classify_rows(table: &mut Table, first_line: usize) -> Result<(), ParseError> {
    let Some(field) = table.schema().and_then(|s| s.class_field) else {
        return Ok(());
    };
    let column = table.require_column(field)?;
    let name = table.name().to_string();

    for (index, row) in table.rows_mut().iter_mut().enumerate() {
        let marker = row.value(column).unwrap_or_default();
        let class = marker
            .parse::<RecordClass>()
            .map_err(|_| ParseError::UnknownRecordClass {
                table: name.clone(),
                row: index,
                line: first_line + index,
                field: field.to_string(),
                value: marker.to_string(),
            })?;
        row.set_class(class);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::traits::StructureFile;
    use crate::core::models::document::Segment;
    use crate::core::models::schema::{ATOM_SITE, POLY_SEQ_SCHEME, QA_METRIC_LOCAL};
    use crate::testing;

    const SMALL: &str = "\
data_test
_entry.id test
#
loop_
_atom_type.symbol
C
N
#
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.auth_seq_id
ATOM   1 A 1 1
ATOM   2 A 2 2
HETATM 3 B . 1
#
loop_
_ma_qa_metric_local.label_asym_id
_ma_qa_metric_local.label_seq_id
_ma_qa_metric_local.metric_value
A 1 90.1
A 2 85.5
#
";

    #[test]
    fn unmodified_document_round_trips_exactly() {
        let doc = MmcifFile::parse(SMALL).unwrap();
        assert_eq!(doc.to_string(), SMALL);

        let fixture = testing::two_chain_mmcif();
        let doc = MmcifFile::parse(&fixture).unwrap();
        assert_eq!(doc.to_string(), fixture);
    }

    #[test]
    fn crlf_line_endings_round_trip() {
        let text = SMALL.replace('\n', "\r\n");
        let doc = MmcifFile::parse(&text).unwrap();
        assert_eq!(doc.table(ATOM_SITE).unwrap().value(1, 3), Some("2"));
        assert_eq!(doc.to_string(), text);
    }

    #[test]
    fn only_tracked_loops_become_tables() {
        let doc = MmcifFile::parse(SMALL).unwrap();
        assert_eq!(doc.table_names(), vec![ATOM_SITE, QA_METRIC_LOCAL]);
        assert!(doc.table("atom_type").is_none());
        assert!(matches!(doc.segments()[0], Segment::Raw(ref t) if t.contains("_atom_type.symbol")));
    }

    #[test]
    fn rows_carry_decoded_record_classes() {
        let doc = MmcifFile::parse(SMALL).unwrap();
        let atoms = doc.table(ATOM_SITE).unwrap();
        let classes: Vec<_> = atoms.rows().iter().map(|r| r.class()).collect();
        assert_eq!(
            classes,
            vec![
                Some(RecordClass::Atom),
                Some(RecordClass::Atom),
                Some(RecordClass::Heteroatom)
            ]
        );
        assert_eq!(atoms.columns()[2], "label_asym_id");
        assert_eq!(atoms.value(2, 3), Some("."));
    }

    #[test]
    fn column_count_mismatch_reports_row_and_line() {
        let text = SMALL.replace("ATOM   2 A 2 2\n", "ATOM   2 A 2\n");
        let err = MmcifFile::parse(&text).unwrap_err();
        match err {
            ParseError::ColumnMismatch {
                table,
                row,
                line,
                expected,
                found,
            } => {
                assert_eq!(table, ATOM_SITE);
                assert_eq!(row, 1);
                assert_eq!(line, 16);
                assert_eq!(expected, 5);
                assert_eq!(found, 4);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_record_class_is_rejected() {
        let text = SMALL.replace("HETATM 3", "SIGATM 3");
        let err = MmcifFile::parse(&text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnknownRecordClass { ref value, row: 2, .. } if value == "SIGATM"
        ));
    }

    #[test]
    fn atom_table_without_group_field_is_rejected() {
        let text = "loop_\n_atom_site.id\n_atom_site.label_seq_id\n1 1\n";
        let err = MmcifFile::parse(text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingField { ref field, .. } if field == "group_PDB"
        ));
    }

    #[test]
    fn loop_mixing_categories_is_rejected() {
        let text = "loop_\n_atom_site.group_PDB\n_atom_type.symbol\nATOM C\n";
        let err = MmcifFile::parse(text).unwrap_err();
        assert!(matches!(err, ParseError::MixedCategories { line: 3, .. }));
    }

    #[test]
    fn second_data_block_is_reported_as_duplicate_table() {
        let text = format!("{SMALL}{SMALL}");
        let err = MmcifFile::parse(&text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::DuplicateTable { ref table, .. } if table == ATOM_SITE
        ));
    }

    #[test]
    fn unterminated_quote_in_tracked_loop_is_rejected() {
        let text = SMALL.replace("A 2 85.5", "A 2 '85.5");
        let err = MmcifFile::parse(&text).unwrap_err();
        assert!(matches!(err, ParseError::UnterminatedQuote { .. }));
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let bytes = b"data_x\n_entry.id \xff\n";
        let err = MmcifFile::parse_bytes(bytes).unwrap_err();
        assert!(matches!(err, ParseError::Encoding(_)));
    }

    #[test]
    fn empty_loop_keeps_its_header() {
        let text = "loop_\n_ma_qa_metric_local.label_asym_id\n_ma_qa_metric_local.label_seq_id\n#\n";
        let doc = MmcifFile::parse(text).unwrap();
        assert!(doc.table(QA_METRIC_LOCAL).unwrap().is_empty());
        assert_eq!(doc.to_string(), text);
    }

    const ITEMS: &str = "\
data_single
#
_pdbx_poly_seq_scheme.asym_id   A
_pdbx_poly_seq_scheme.seq_id    1
_pdbx_poly_seq_scheme.mon_id    ALA
_pdbx_poly_seq_scheme.pdb_seq_num 1
_pdbx_poly_seq_scheme.auth_seq_num 1
#
_entry.id single
";

    #[test]
    fn tracked_items_become_a_one_row_table() {
        let doc = MmcifFile::parse(ITEMS).unwrap();
        let scheme = doc.table(POLY_SEQ_SCHEME).unwrap();
        assert_eq!(scheme.len(), 1);
        assert!(scheme.header().is_empty());
        assert_eq!(scheme.columns()[1], "seq_id");
        assert_eq!(scheme.value(0, scheme.column_index("mon_id").unwrap()), Some("ALA"));
        assert_eq!(scheme.value(0, scheme.column_index("auth_seq_num").unwrap()), Some("1"));
        assert_eq!(doc.to_string(), ITEMS);
    }

    #[test]
    fn edited_item_value_stays_on_its_line() {
        let mut doc = MmcifFile::parse(ITEMS).unwrap();
        let scheme = doc.table_mut(POLY_SEQ_SCHEME).unwrap();
        let seq = scheme.column_index("seq_id").unwrap();
        scheme.set_value(0, seq, "100").unwrap();
        let text = doc.to_string();
        assert!(text.contains("_pdbx_poly_seq_scheme.seq_id    100\n"));
        assert!(text.contains("_pdbx_poly_seq_scheme.mon_id    ALA\n"));
    }

    #[test]
    fn item_value_on_a_continuation_line_is_rejected() {
        let text = ITEMS.replace("mon_id    ALA", "mon_id\nALA");
        let err = MmcifFile::parse(&text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnsupportedItemValue { ref table, ref item, line: 5 }
                if table == POLY_SEQ_SCHEME && item == "mon_id"
        ));
    }

    #[test]
    fn items_after_a_loop_of_the_same_category_are_a_duplicate() {
        let text = "loop_\n_pdbx_poly_seq_scheme.asym_id\n_pdbx_poly_seq_scheme.seq_id\nA 1\n#\n_pdbx_poly_seq_scheme.asym_id B\n";
        let err = MmcifFile::parse(text).unwrap_err();
        assert!(matches!(err, ParseError::DuplicateTable { line: 6, .. }));
    }
}
