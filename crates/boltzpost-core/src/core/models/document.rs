use super::ids::TableId;
use super::row::Row;
use super::table::Table;
use slotmap::SlotMap;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

/// Text format of a structure document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Mmcif,
    Pdb,
}

#[derive(Debug, Error)]
#[error("Invalid structure format '{0}'. Expected 'mmcif' or 'pdb'.")]
pub struct ParseFormatError(pub String);

impl FromStr for Format {
    type Err = ParseFormatError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mmcif" | "cif" => Ok(Format::Mmcif),
            "pdb" | "ent" => Ok(Format::Pdb),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Format::Mmcif => "mmCIF",
                Format::Pdb => "PDB",
            }
        )
    }
}

impl Format {
    /// Conventional file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Mmcif => "mmcif",
            Format::Pdb => "pdb",
        }
    }
}

/// A positioned piece of the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text outside any tracked table, kept byte for byte.
    Raw(String),
    /// A contiguous run of rows of one table. The table header is emitted before the run
    /// that starts at row 0.
    Table { id: TableId, rows: Range<usize> },
}

/// An in-memory structure file: tracked tables plus every other byte in its original place.
#[derive(Debug, Clone)]
pub struct StructureDocument {
    format: Format,
    tables: SlotMap<TableId, Table>,
    table_index: HashMap<String, TableId>,
    segments: Vec<Segment>,
}

impl StructureDocument {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            tables: SlotMap::with_key(),
            table_index: HashMap::new(),
            segments: Vec::new(),
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.table_index
            .get(name)
            .and_then(|&id| self.tables.get(id))
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.table_index
            .get(name)
            .and_then(|&id| self.tables.get_mut(id))
    }

    pub fn table_by_id(&self, id: TableId) -> Option<&Table> {
        self.tables.get(id)
    }

    pub fn table_id(&self, name: &str) -> Option<TableId> {
        self.table_index.get(name).copied()
    }

    /// Tracked table names, in order of first appearance.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for segment in &self.segments {
            if let Segment::Table { id, .. } = segment {
                if let Some(table) = self.tables.get(*id) {
                    if !names.contains(&table.name()) {
                        names.push(table.name());
                    }
                }
            }
        }
        names
    }

    pub(crate) fn push_raw(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Raw(buf)) => buf.push_str(text),
            _ => self.segments.push(Segment::Raw(text.to_string())),
        }
    }

    pub(crate) fn add_table(&mut self, table: Table) -> TableId {
        let name = table.name().to_string();
        let id = self.tables.insert(table);
        self.table_index.insert(name, id);
        id
    }

    /// Appends a row to `id`, extending the current run of that table or opening a new one.
    pub(crate) fn push_row(&mut self, id: TableId, row: Row) {
        let Some(table) = self.tables.get_mut(id) else {
            return;
        };
        let index = table.len();
        table.push_row(row);
        match self.segments.last_mut() {
            Some(Segment::Table { id: last, rows }) if *last == id && rows.end == index => {
                rows.end = index + 1;
            }
            _ => self.segments.push(Segment::Table {
                id,
                rows: index..index + 1,
            }),
        }
    }

    /// Registers a run of rows already stored in table `id`.
    pub(crate) fn push_table_run(&mut self, id: TableId, rows: Range<usize>) {
        self.segments.push(Segment::Table { id, rows });
    }

    /// Every tracked table with its id, in no particular order.
    pub fn tables(&self) -> impl Iterator<Item = (TableId, &Table)> {
        self.tables.iter()
    }
}
