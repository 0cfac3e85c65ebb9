use crate::core::io::error::ParseError;
use crate::core::models::document::StructureDocument;
use crate::core::models::record::RecordClass;
use crate::core::models::row::{EditError, FieldOverflow};
use crate::core::models::schema::{self, ATOM_SITE, POLY_SEQ_SCHEME, RenumberScope};
use crate::core::models::table::Table;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum RenumberError {
    #[error(
        "Nothing to renumber: no polymer atom rows found{}",
        .chain.as_ref().map(|c| format!(" in chain '{c}'")).unwrap_or_default()
    )]
    EmptyScope { chain: Option<String> },

    #[error("Invalid start index '{0}': expected an integer")]
    InvalidStartIndex(String),

    #[error("Row {row} of table '{table}' has non-integer residue position '{value}' in field '{field}'")]
    InvalidIndex {
        table: String,
        row: usize,
        field: String,
        value: String,
    },

    #[error("Row {row} of table '{table}': renumbered '{field}' does not fit: {source}")]
    FieldOverflow {
        table: String,
        row: usize,
        field: String,
        #[source]
        source: FieldOverflow,
    },

    #[error("Row {row} of table '{table}': cannot rewrite '{field}': {source}")]
    Edit {
        table: String,
        row: usize,
        field: String,
        #[source]
        source: EditError,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Parses a user-supplied start index.
pub fn parse_start_index(text: &str) -> Result<i64, RenumberError> {
    text.trim()
        .parse()
        .map_err(|_| RenumberError::InvalidStartIndex(text.to_string()))
}

/// The shift applied to every residue position in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenumberPlan {
    pub chain_filter: Option<String>,
    pub start_index: i64,
    /// Smallest primary position among the scoped atom rows.
    pub min_observed: i64,
    pub offset: i64,
}

/// What a renumbering changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenumberSummary {
    pub plan: RenumberPlan,
    /// Rows rewritten per table, in document order.
    pub tables: Vec<(String, usize)>,
}

impl RenumberSummary {
    pub fn rows_changed(&self) -> usize {
        self.tables.iter().map(|(_, n)| n).sum()
    }
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value == "." || value == "?"
}

fn atom_table(doc: &StructureDocument) -> Option<&Table> {
    doc.table(ATOM_SITE)
}

fn chain_column(table: &Table) -> Result<usize, RenumberError> {
    table.chain_column().ok_or_else(|| {
        let field = table
            .schema()
            .and_then(|s| s.chain_fields.first())
            .copied()
            .unwrap_or("label_asym_id");
        ParseError::MissingField {
            table: table.name().to_string(),
            field: field.to_string(),
        }
        .into()
    })
}

/// Reads a residue position; placeholders yield `None`.
fn read_position(table: &Table, row: usize, column: usize) -> Result<Option<i64>, RenumberError> {
    let value = table.value(row, column).unwrap_or_default();
    if is_placeholder(value) {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| RenumberError::InvalidIndex {
            table: table.name().to_string(),
            row,
            field: table.columns()[column].clone(),
            value: value.to_string(),
        })
}

fn is_polymer_row(table: &Table, row: usize, chain_col: usize, chain: Option<&str>) -> bool {
    table.rows()[row].class() == Some(RecordClass::Atom)
        && chain.is_none_or(|c| table.value(row, chain_col) == Some(c))
}

impl RenumberPlan {
    /// Derives the offset that moves the first scoped residue to `start_index`.
    ///
    /// # Errors
    ///
    /// Returns [`RenumberError::EmptyScope`] when no polymer atom row matches the chain
    /// filter, and a parse error when the atom table lacks chain or position fields.
    pub fn compute(
        doc: &StructureDocument,
        start_index: i64,
        chain_filter: Option<&str>,
    ) -> Result<Self, RenumberError> {
        let empty = || RenumberError::EmptyScope {
            chain: chain_filter.map(str::to_string),
        };
        let table = atom_table(doc).ok_or_else(empty)?;
        let chain_col = chain_column(table)?;
        let position_fields = table.schema().map(|s| s.position_fields).unwrap_or_default();
        let position_col = table.first_column(position_fields).ok_or_else(|| {
            ParseError::MissingField {
                table: table.name().to_string(),
                field: position_fields.first().copied().unwrap_or("label_seq_id").to_string(),
            }
        })?;

        let mut min_observed: Option<i64> = None;
        for row in 0..table.len() {
            if !is_polymer_row(table, row, chain_col, chain_filter) {
                continue;
            }
            if let Some(position) = read_position(table, row, position_col)? {
                min_observed = Some(min_observed.map_or(position, |m| m.min(position)));
            }
        }
        let min_observed = min_observed.ok_or_else(empty)?;

        Ok(Self {
            chain_filter: chain_filter.map(str::to_string),
            start_index,
            min_observed,
            offset: start_index - min_observed,
        })
    }

    fn shift(&self, table: &Table, row: usize, column: usize, position: i64) -> Result<i64, RenumberError> {
        position
            .checked_add(self.offset)
            .ok_or_else(|| RenumberError::InvalidIndex {
                table: table.name().to_string(),
                row,
                field: table.columns()[column].clone(),
                value: position.to_string(),
            })
    }
}

/// Chains and entities whose numbering moves.
#[derive(Debug, Default)]
struct Scope {
    chains: HashSet<String>,
    entities: HashSet<String>,
}

impl Scope {
    fn resolve(doc: &StructureDocument, plan: &RenumberPlan) -> Result<Self, RenumberError> {
        let mut scope = Scope::default();
        let Some(table) = atom_table(doc) else {
            return Ok(scope);
        };
        let chain_col = chain_column(table)?;
        let entity_col = table
            .schema()
            .and_then(|s| s.entity_field)
            .and_then(|f| table.column_index(f));

        let mut entity_chains: HashMap<String, HashSet<String>> = HashMap::new();
        for row in 0..table.len() {
            if !is_polymer_row(table, row, chain_col, None) {
                continue;
            }
            let chain = table.value(row, chain_col).unwrap_or_default();
            if plan.chain_filter.as_deref().is_none_or(|c| c == chain) {
                scope.chains.insert(chain.to_string());
            }
            if let Some(entity) = entity_col.and_then(|c| table.value(row, c)) {
                entity_chains
                    .entry(entity.to_string())
                    .or_default()
                    .insert(chain.to_string());
            }
        }

        // The poly scheme also ties entities to chains, including chains without coordinates.
        if let Some(poly) = doc.table(POLY_SEQ_SCHEME) {
            let entity_col = poly.schema().and_then(|s| s.entity_field).and_then(|f| poly.column_index(f));
            if let (Some(chain_col), Some(entity_col)) = (poly.chain_column(), entity_col) {
                for row in 0..poly.len() {
                    if let (Some(chain), Some(entity)) = (poly.value(row, chain_col), poly.value(row, entity_col)) {
                        entity_chains
                            .entry(entity.to_string())
                            .or_default()
                            .insert(chain.to_string());
                    }
                }
            }
        }

        for (entity, members) in entity_chains {
            if members.is_subset(&scope.chains) {
                scope.entities.insert(entity);
            } else if !members.is_disjoint(&scope.chains) {
                warn!(
                    entity = %entity,
                    "Entity is shared with chains outside the selection; its sequence numbering is left unchanged."
                );
            }
        }
        Ok(scope)
    }

    /// Rows of `table` that refer to scoped residues.
    ///
    /// A table without its key column is wholly in scope when every chain is; with a chain
    /// filter the key is needed to tell chains apart, so its absence is `MissingField`.
    fn rows(&self, table: &Table, kind: RenumberScope, filtered: bool) -> Result<Vec<usize>, RenumberError> {
        let key_field = match kind {
            RenumberScope::Atoms | RenumberScope::Chain => {
                table.schema().and_then(|s| s.chain_fields.first()).copied()
            }
            RenumberScope::Entity => table.schema().and_then(|s| s.entity_field),
            RenumberScope::None => return Ok(Vec::new()),
        };
        let key_column = match kind {
            RenumberScope::Entity => key_field.and_then(|f| table.column_index(f)),
            _ => table.chain_column(),
        };
        let keys = match kind {
            RenumberScope::Entity => &self.entities,
            _ => &self.chains,
        };
        if key_column.is_none() && filtered {
            return Err(ParseError::MissingField {
                table: table.name().to_string(),
                field: key_field.unwrap_or("label_asym_id").to_string(),
            }
            .into());
        }
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        Ok((0..table.len())
            .filter(|&row| {
                kind != RenumberScope::Atoms || table.rows()[row].class() == Some(RecordClass::Atom)
            })
            .filter(|&row| match key_column {
                Some(column) => table.value(row, column).is_some_and(|k| keys.contains(k)),
                None => true,
            })
            .collect())
    }
}

fn apply(doc: &mut StructureDocument, plan: &RenumberPlan) -> Result<Vec<(String, usize)>, RenumberError> {
    let scope = Scope::resolve(doc, plan)?;
    let names: Vec<String> = doc.table_names().into_iter().map(str::to_string).collect();
    let mut changed = Vec::new();

    for name in names {
        let Some(table) = doc.table_mut(&name) else {
            continue;
        };
        let Some(kind) = table.schema().map(|s| s.scope) else {
            continue;
        };
        let rows = scope.rows(table, kind, plan.chain_filter.is_some())?;
        let columns: Vec<usize> = table
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, field)| schema::is_position_field(&name, field))
            .map(|(i, _)| i)
            .collect();
        if rows.is_empty() || columns.is_empty() {
            continue;
        }

        let mut count = 0;
        for row in rows {
            let mut touched = false;
            for &column in &columns {
                let Some(position) = read_position(table, row, column)? else {
                    continue;
                };
                let renumbered = plan.shift(table, row, column, position)?;
                table
                    .set_value(row, column, &renumbered.to_string())
                    .map_err(|e| {
                        let table_name = name.clone();
                        let field = table.columns()[column].clone();
                        match e {
                            EditError::Overflow(source) => RenumberError::FieldOverflow {
                                table: table_name,
                                row,
                                field,
                                source,
                            },
                            source => RenumberError::Edit {
                                table: table_name,
                                row,
                                field,
                                source,
                            },
                        }
                    })?;
                touched = true;
            }
            count += usize::from(touched);
        }
        debug!(table = %name, rows = count, "Renumbered table.");
        changed.push((name, count));
    }
    Ok(changed)
}

/// Renumbers residue positions in place so the first scoped residue becomes `start_index`.
///
/// Polymer atom rows of the selected chain (all chains when `chain_filter` is `None`) and
/// every row elsewhere that refers to those residues move by the same offset; heteroatom
/// rows are never touched. On error the document is left exactly as it was.
pub fn renumber(
    doc: &mut StructureDocument,
    start_index: i64,
    chain_filter: Option<&str>,
) -> Result<RenumberSummary, RenumberError> {
    let plan = RenumberPlan::compute(doc, start_index, chain_filter)?;
    let mut working = doc.clone();
    let tables = apply(&mut working, &plan)?;
    *doc = working;

    info!(
        chain = plan.chain_filter.as_deref().unwrap_or("*"),
        offset = plan.offset,
        start = plan.start_index,
        "Renumbered residues."
    );
    Ok(RenumberSummary { plan, tables })
}

/// Like [`renumber`], but returns a renumbered copy and leaves `doc` alone.
pub fn renumbered(
    doc: &StructureDocument,
    start_index: i64,
    chain_filter: Option<&str>,
) -> Result<(StructureDocument, RenumberSummary), RenumberError> {
    let mut copy = doc.clone();
    let summary = renumber(&mut copy, start_index, chain_filter)?;
    Ok((copy, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::mmcif::MmcifFile;
    use crate::core::io::pdb::PdbFile;
    use crate::core::io::traits::StructureFile;
    use crate::core::models::schema::{ENTITY_POLY_SEQ, QA_METRIC_LOCAL};
    use crate::testing;

    fn column_values(doc: &StructureDocument, table: &str, chain: Option<(&str, &str)>, field: &str) -> Vec<String> {
        let table = doc.table(table).unwrap();
        let col = table.column_index(field).unwrap();
        (0..table.len())
            .filter(|&r| chain.is_none_or(|(f, c)| table.value(r, table.column_index(f).unwrap()) == Some(c)))
            .filter(|&r| table.rows()[r].class() != Some(RecordClass::Heteroatom))
            .map(|r| table.value(r, col).unwrap().to_string())
            .collect()
    }

    fn range(from: i64, to: i64) -> Vec<String> {
        (from..=to).map(|n| n.to_string()).collect()
    }

    #[test]
    fn chain_a_moves_to_start_index_and_chain_b_stays() {
        let mut doc = MmcifFile::parse(&testing::two_chain_mmcif()).unwrap();
        let summary = renumber(&mut doc, 671, Some("A")).unwrap();

        assert_eq!(summary.plan.min_observed, 1);
        assert_eq!(summary.plan.offset, 670);
        let chain_a = Some(("label_asym_id", "A"));
        let chain_b = Some(("label_asym_id", "B"));
        assert_eq!(column_values(&doc, ATOM_SITE, chain_a, "label_seq_id"), range(671, 720));
        assert_eq!(column_values(&doc, ATOM_SITE, chain_a, "auth_seq_id"), range(671, 720));
        assert_eq!(column_values(&doc, ATOM_SITE, chain_b, "label_seq_id"), range(1, 30));
        assert_eq!(column_values(&doc, QA_METRIC_LOCAL, chain_a, "label_seq_id"), range(671, 720));
        assert_eq!(column_values(&doc, QA_METRIC_LOCAL, chain_b, "label_seq_id"), range(1, 30));
        for field in ["seq_id", "pdb_seq_num", "auth_seq_num"] {
            assert_eq!(
                column_values(&doc, POLY_SEQ_SCHEME, Some(("asym_id", "A")), field),
                range(671, 720)
            );
        }
        assert_eq!(
            column_values(&doc, ENTITY_POLY_SEQ, Some(("entity_id", "1")), "num"),
            range(671, 720)
        );
        assert_eq!(
            column_values(&doc, ENTITY_POLY_SEQ, Some(("entity_id", "2")), "num"),
            range(1, 30)
        );
    }

    #[test]
    fn renumbering_preserves_every_other_byte() {
        let original = testing::two_chain_mmcif();
        let mut doc = MmcifFile::parse(&original).unwrap();
        renumber(&mut doc, 671, Some("A")).unwrap();
        let output = doc.to_string();

        assert_eq!(output.lines().count(), original.lines().count());
        for (before, after) in original.lines().zip(output.lines()) {
            assert_eq!(before.len(), after.len(), "width changed: {before:?} -> {after:?}");
        }

        let mut back = MmcifFile::parse(&output).unwrap();
        renumber(&mut back, 1, Some("A")).unwrap();
        assert_eq!(back.to_string(), original);
    }

    #[test]
    fn unknown_chain_is_an_empty_scope_and_leaves_document_untouched() {
        let original = testing::two_chain_mmcif();
        let mut doc = MmcifFile::parse(&original).unwrap();
        let err = renumber(&mut doc, 671, Some("C")).unwrap_err();
        assert!(matches!(err, RenumberError::EmptyScope { chain: Some(ref c) } if c == "C"));
        assert_eq!(doc.to_string(), original);
    }

    #[test]
    fn without_filter_all_chains_share_one_offset() {
        let mut doc = MmcifFile::parse(&testing::two_chain_mmcif()).unwrap();
        let summary = renumber(&mut doc, 101, None).unwrap();
        assert_eq!(summary.plan.offset, 100);
        assert_eq!(
            column_values(&doc, ATOM_SITE, Some(("label_asym_id", "B")), "label_seq_id"),
            range(101, 130)
        );
        assert_eq!(
            column_values(&doc, ENTITY_POLY_SEQ, Some(("entity_id", "2")), "num"),
            range(101, 130)
        );
    }

    #[test]
    fn heteroatom_rows_are_byte_identical() {
        let original = MmcifFile::parse(&testing::two_chain_mmcif()).unwrap();
        let (doc, _) = renumbered(&original, 500, Some("B")).unwrap();
        let hetero = |d: &StructureDocument| -> Vec<String> {
            d.table(ATOM_SITE)
                .unwrap()
                .rows()
                .iter()
                .filter(|r| r.class() == Some(RecordClass::Heteroatom))
                .map(|r| r.text().to_string())
                .collect()
        };
        assert_eq!(hetero(&doc).len(), 1);
        assert_eq!(hetero(&doc), hetero(&original));
        assert_eq!(
            column_values(&doc, ATOM_SITE, Some(("label_asym_id", "B")), "label_seq_id"),
            range(500, 529)
        );
    }

    #[test]
    fn crossing_a_digit_boundary_keeps_columns_readable() {
        let text = "\
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.auth_seq_id
_atom_site.B_iso_or_equiv
ATOM 1 A 1 1 90.0
ATOM 2 A 2 2 91.0
";
        let mut doc = MmcifFile::parse(text).unwrap();
        renumber(&mut doc, 9, None).unwrap();
        let reparsed = MmcifFile::parse(&doc.to_string()).unwrap();
        let table = reparsed.table(ATOM_SITE).unwrap();
        assert_eq!(table.value(0, 3), Some("9"));
        assert_eq!(table.value(1, 3), Some("10"));
        assert_eq!(table.value(1, 4), Some("10"));
        assert_eq!(table.value(1, 5), Some("91.0"));
    }

    #[test]
    fn partially_selected_entity_keeps_its_sequence_numbering() {
        let text = "\
loop_
_entity_poly_seq.entity_id
_entity_poly_seq.num
_entity_poly_seq.mon_id
1 1 ALA
1 2 GLY
#
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.label_asym_id
_atom_site.label_entity_id
_atom_site.label_seq_id
ATOM 1 A 1 1
ATOM 2 A 1 2
ATOM 3 B 1 1
ATOM 4 B 1 2
#
";
        let mut doc = MmcifFile::parse(text).unwrap();
        renumber(&mut doc, 10, Some("A")).unwrap();
        assert_eq!(column_values(&doc, ENTITY_POLY_SEQ, None, "num"), vec!["1", "2"]);
        assert_eq!(
            column_values(&doc, ATOM_SITE, Some(("label_asym_id", "A")), "label_seq_id"),
            vec!["10", "11"]
        );
    }

    #[test]
    fn non_integer_position_is_rejected() {
        let text = "loop_\n_atom_site.group_PDB\n_atom_site.label_asym_id\n_atom_site.label_seq_id\nATOM A 1\nATOM A x2\n";
        let mut doc = MmcifFile::parse(text).unwrap();
        let err = renumber(&mut doc, 5, None).unwrap_err();
        assert!(matches!(
            err,
            RenumberError::InvalidIndex { row: 1, ref value, .. } if value == "x2"
        ));
        assert_eq!(doc.to_string(), text);
    }

    #[test]
    fn pdb_residue_numbers_move_in_their_fixed_columns() {
        let original = testing::ligand_pdb();
        let mut doc = PdbFile::parse(&original).unwrap();
        let summary = renumber(&mut doc, 10, Some("A")).unwrap();
        assert_eq!(summary.plan.offset, 9);

        let output = doc.to_string();
        for (before, after) in original.lines().zip(output.lines()) {
            assert_eq!(before.len(), after.len());
            if before.starts_with("HETATM") || before.contains("LIG") {
                assert_eq!(before, after);
            }
        }
        assert!(output.contains("ATOM      1  N   ALA A  10"));
        assert!(output.contains("ANISOU    1  N   ALA A  10"));
        assert!(output.contains("TER       5      GLY A  11"));
    }

    #[test]
    fn pdb_overflow_fails_without_partial_edits() {
        let original = testing::ligand_pdb();
        let mut doc = PdbFile::parse(&original).unwrap();
        let err = renumber(&mut doc, 9999, Some("A")).unwrap_err();
        assert!(matches!(
            err,
            RenumberError::FieldOverflow { ref field, ref source, .. }
                if field == "auth_seq_id" && source.width == 4
        ));
        assert_eq!(doc.to_string(), original);
    }

    /// Chain A with two residues followed by `extra`.
    fn chain_a_with(extra: &str) -> String {
        let mut text = String::from("data_single\n#\n");
        text.push_str(testing::ATOM_SITE_HEADER);
        text.push_str(&testing::atom_row("ATOM", 1, "CA", "ALA", "A", "1", "1", "1", 50.0));
        text.push_str(&testing::atom_row("ATOM", 2, "CA", "GLY", "A", "1", "2", "2", 60.0));
        text.push_str("#\n");
        text.push_str(extra);
        text
    }

    const QA_WITHOUT_CHAIN: &str = "\
loop_
_ma_qa_metric_local.ordinal_id
_ma_qa_metric_local.label_seq_id
_ma_qa_metric_local.metric_value
1 1 50.00
2 2 60.00
#
";

    #[test]
    fn table_without_chain_key_moves_with_all_chains() {
        let mut doc = MmcifFile::parse(&chain_a_with(QA_WITHOUT_CHAIN)).unwrap();
        let summary = renumber(&mut doc, 10, None).unwrap();

        assert!(summary.tables.contains(&(QA_METRIC_LOCAL.to_string(), 2)));
        assert_eq!(column_values(&doc, QA_METRIC_LOCAL, None, "label_seq_id"), range(10, 11));
    }

    #[test]
    fn table_without_chain_key_cannot_be_filtered() {
        let original = chain_a_with(QA_WITHOUT_CHAIN);
        let mut doc = MmcifFile::parse(&original).unwrap();
        let err = renumber(&mut doc, 10, Some("A")).unwrap_err();

        assert!(matches!(
            err,
            RenumberError::Parse(ParseError::MissingField { ref table, ref field })
                if table == QA_METRIC_LOCAL && field == "label_asym_id"
        ));
        assert_eq!(doc.to_string(), original);
    }

    #[test]
    fn single_residue_scheme_written_as_items_is_renumbered() {
        let items = "\
_pdbx_poly_seq_scheme.asym_id      A
_pdbx_poly_seq_scheme.entity_id    1
_pdbx_poly_seq_scheme.seq_id       1
_pdbx_poly_seq_scheme.mon_id       ALA
_pdbx_poly_seq_scheme.pdb_seq_num  1
_pdbx_poly_seq_scheme.auth_seq_num 1
#
";
        let mut doc = MmcifFile::parse(&chain_a_with(items)).unwrap();
        renumber(&mut doc, 100, Some("A")).unwrap();

        let output = doc.to_string();
        assert!(output.contains("_pdbx_poly_seq_scheme.seq_id       100\n"));
        assert!(output.contains("_pdbx_poly_seq_scheme.pdb_seq_num  100\n"));
        assert!(output.contains("_pdbx_poly_seq_scheme.auth_seq_num 100\n"));
        assert!(output.contains("_pdbx_poly_seq_scheme.mon_id       ALA\n"));
    }

    #[test]
    fn start_index_must_be_an_integer() {
        assert_eq!(parse_start_index(" 671 ").unwrap(), 671);
        assert_eq!(parse_start_index("-3").unwrap(), -3);
        assert!(matches!(
            parse_start_index("abc"),
            Err(RenumberError::InvalidStartIndex(ref s)) if s == "abc"
        ));
    }

    #[test]
    fn document_without_atoms_is_an_empty_scope() {
        let mut doc = MmcifFile::parse("data_x\n_entry.id x\n").unwrap();
        assert!(matches!(
            renumber(&mut doc, 1, None),
            Err(RenumberError::EmptyScope { chain: None })
        ));
    }
}
