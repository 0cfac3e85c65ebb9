use phf::{Map, phf_map};

pub const ATOM_SITE: &str = "atom_site";
pub const QA_METRIC_LOCAL: &str = "ma_qa_metric_local";
pub const POLY_SEQ_SCHEME: &str = "pdbx_poly_seq_scheme";
pub const NONPOLY_SCHEME: &str = "pdbx_nonpoly_scheme";
pub const ENTITY_POLY_SEQ: &str = "entity_poly_seq";

/// Which rows of a table a renumbering reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenumberScope {
    /// Polymer coordinate rows of the selected chains.
    Atoms,
    /// Rows whose chain key belongs to a renumbered chain.
    Chain,
    /// Rows whose entity is instantiated only by renumbered chains.
    Entity,
    /// Never renumbered.
    None,
}

/// Static description of a tracked table.
#[derive(Debug)]
pub struct TableSchema {
    /// Field holding the explicit record-class marker.
    pub class_field: Option<&'static str>,
    /// Chain key candidates, most specific first.
    pub chain_fields: &'static [&'static str],
    pub entity_field: Option<&'static str>,
    /// Fields encoding a residue sequence position; the first present one is primary.
    pub position_fields: &'static [&'static str],
    pub scope: RenumberScope,
}

static SCHEMAS: Map<&'static str, TableSchema> = phf_map! {
    "atom_site" => TableSchema {
        class_field: Some("group_PDB"),
        chain_fields: &["label_asym_id", "auth_asym_id"],
        entity_field: Some("label_entity_id"),
        position_fields: &["label_seq_id", "auth_seq_id"],
        scope: RenumberScope::Atoms,
    },
    "ma_qa_metric_local" => TableSchema {
        class_field: None,
        chain_fields: &["label_asym_id"],
        entity_field: None,
        position_fields: &["label_seq_id"],
        scope: RenumberScope::Chain,
    },
    "pdbx_poly_seq_scheme" => TableSchema {
        class_field: None,
        chain_fields: &["asym_id"],
        entity_field: Some("entity_id"),
        position_fields: &["seq_id", "pdb_seq_num", "auth_seq_num"],
        scope: RenumberScope::Chain,
    },
    "pdbx_nonpoly_scheme" => TableSchema {
        class_field: None,
        chain_fields: &["asym_id"],
        entity_field: Some("entity_id"),
        position_fields: &[],
        scope: RenumberScope::None,
    },
    "entity_poly_seq" => TableSchema {
        class_field: None,
        chain_fields: &[],
        entity_field: Some("entity_id"),
        position_fields: &["num"],
        scope: RenumberScope::Entity,
    },
};

pub fn lookup(table: &str) -> Option<&'static TableSchema> {
    SCHEMAS.get(table)
}

pub fn is_tracked(table: &str) -> bool {
    SCHEMAS.contains_key(table)
}

pub fn is_position_field(table: &str, field: &str) -> bool {
    lookup(table).is_some_and(|s| s.position_fields.contains(&field))
}
