//! Structure texts shared by unit tests.

use serde_json::json;
use std::fmt::Write;

pub(crate) const ATOM_SITE_HEADER: &str = "\
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_entity_id
_atom_site.label_seq_id
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
_atom_site.occupancy
_atom_site.B_iso_or_equiv
_atom_site.auth_seq_id
_atom_site.auth_asym_id
_atom_site.pdbx_PDB_model_num
";

const QA_HEADER: &str = "\
loop_
_ma_qa_metric_local.ordinal_id
_ma_qa_metric_local.model_id
_ma_qa_metric_local.label_asym_id
_ma_qa_metric_local.label_seq_id
_ma_qa_metric_local.label_comp_id
_ma_qa_metric_local.metric_id
_ma_qa_metric_local.metric_value
";

const POLY_SCHEME_HEADER: &str = "\
loop_
_pdbx_poly_seq_scheme.asym_id
_pdbx_poly_seq_scheme.entity_id
_pdbx_poly_seq_scheme.seq_id
_pdbx_poly_seq_scheme.mon_id
_pdbx_poly_seq_scheme.pdb_seq_num
_pdbx_poly_seq_scheme.auth_seq_num
_pdbx_poly_seq_scheme.pdb_strand_id
";

const ENTITY_SEQ_HEADER: &str = "\
loop_
_entity_poly_seq.entity_id
_entity_poly_seq.num
_entity_poly_seq.mon_id
_entity_poly_seq.hetero
";

/// One `_atom_site` row with fixed-width padding, so every column is left-aligned.
#[allow(clippy::too_many_arguments)]
pub(crate) fn atom_row(
    group: &str,
    id: usize,
    atom: &str,
    comp: &str,
    chain: &str,
    entity: &str,
    seq: &str,
    auth_seq: &str,
    b: f64,
) -> String {
    let x = id as f64 * 1.5;
    format!(
        "{group:<6} {id:<5} C {atom:<3} {comp} {chain} {entity} {seq:<4} {x:>8.3} {:>8.3} {:>8.3} 1.00 {b:>6.2} {auth_seq:<4} {chain} 1\n",
        -x / 3.0,
        2.25
    )
}

fn qa_row(ordinal: usize, chain: &str, seq: &str, comp: &str, score: f64) -> String {
    format!("{ordinal:<4} 1 {chain} {seq:<4} {comp} 2 {score:>6.2}\n")
}

fn plddt(chain_offset: usize, n: usize) -> f64 {
    50.0 + ((n + chain_offset) % 40) as f64 + 0.5
}

/// Chain A (entity 1, residues 1-50), chain B (entity 2, residues 1-30) and one ligand
/// atom tagged `HETATM` in chain B.
pub(crate) fn two_chain_mmcif() -> String {
    let chains = [("A", "1", "ALA", 50usize), ("B", "2", "GLY", 30usize)];
    let mut out = String::from("data_two_chain\n_entry.id two_chain\n#\n");

    out.push_str(ENTITY_SEQ_HEADER);
    for (_, entity, comp, len) in chains {
        for n in 1..=len {
            let _ = writeln!(out, "{entity} {n:<4} {comp} n");
        }
    }
    out.push_str("#\n");

    out.push_str(POLY_SCHEME_HEADER);
    for (chain, entity, comp, len) in chains {
        for n in 1..=len {
            let _ = writeln!(out, "{chain} {entity} {n:<4} {comp} {n:<4} {n:<4} {chain}");
        }
    }
    out.push_str("#\n");

    out.push_str(ATOM_SITE_HEADER);
    let mut id = 0;
    for (offset, (chain, entity, comp, len)) in chains.into_iter().enumerate() {
        for n in 1..=len {
            id += 1;
            let seq = n.to_string();
            out.push_str(&atom_row(
                "ATOM", id, "CA", comp, chain, entity, &seq, &seq, plddt(offset, n),
            ));
        }
    }
    id += 1;
    out.push_str(&atom_row("HETATM", id, "C1", "LIG", "B", "3", ".", "1", 70.0));
    out.push_str("#\n");

    out.push_str(QA_HEADER);
    let mut ordinal = 0;
    for (offset, (chain, _, comp, len)) in chains.into_iter().enumerate() {
        for n in 1..=len {
            ordinal += 1;
            out.push_str(&qa_row(ordinal, chain, &n.to_string(), comp, plddt(offset, n)));
        }
    }
    out.push_str("#\n");
    out
}

/// Protein chain A (residues 1-3, two atoms each) bound to a ligand in its own chain L.
pub(crate) fn ligand_complex_mmcif(name: &str) -> String {
    let mut out = format!("data_{name}\n_entry.id {name}\n#\n");

    out.push_str(ENTITY_SEQ_HEADER);
    for n in 1..=3 {
        let _ = writeln!(out, "1 {n:<4} ALA n");
    }
    out.push_str("#\n");

    out.push_str(POLY_SCHEME_HEADER);
    for n in 1..=3 {
        let _ = writeln!(out, "A 1 {n:<4} ALA {n:<4} {n:<4} A");
    }
    out.push_str("#\n");

    out.push_str(
        "loop_\n_pdbx_nonpoly_scheme.asym_id\n_pdbx_nonpoly_scheme.entity_id\n_pdbx_nonpoly_scheme.mon_id\n_pdbx_nonpoly_scheme.pdb_seq_num\nL 2 LIG 1\n#\n",
    );

    out.push_str(ATOM_SITE_HEADER);
    let mut id = 0;
    for n in 1..=3 {
        let seq = n.to_string();
        for (atom, b) in [("N", 80.0), ("CA", 90.0)] {
            id += 1;
            let b = b + n as f64;
            out.push_str(&atom_row("ATOM", id, atom, "ALA", "A", "1", &seq, &seq, b));
        }
    }
    for atom in ["C1", "C2"] {
        id += 1;
        out.push_str(&atom_row("HETATM", id, atom, "LIG", "L", "2", ".", "1", 60.0));
    }
    out.push_str("#\n");

    out.push_str(QA_HEADER);
    for n in 1..=3 {
        out.push_str(&qa_row(n, "A", &n.to_string(), "ALA", 85.0 + n as f64));
    }
    out.push_str(&qa_row(4, "L", ".", "LIG", 60.0));
    out.push_str("#\n");
    out
}

fn pdb_atom(record: &str, serial: usize, atom: &str, res: &str, chain: &str, seq: i64, b: f64) -> String {
    let x = serial as f64 * 1.25;
    format!(
        "{record:<6}{serial:>5}  {atom:<3} {res:>3} {chain}{seq:>4}    {x:>8.3}{:>8.3}{:>8.3}{:>6.2}{b:>6.2}           {}\n",
        -x,
        3.5,
        1.0,
        &atom[..1]
    )
}

fn pdb_anisou(serial: usize, atom: &str, res: &str, chain: &str, seq: i64) -> String {
    format!(
        "ANISOU{serial:>5}  {atom:<3} {res:>3} {chain}{seq:>4}  {:>7}{:>7}{:>7}{:>7}{:>7}{:>7}       {}\n",
        2406, 1892, -198, 2003, -106, 40, &atom[..1]
    )
}

/// Chain A (residues 1-2) with ANISOU records, a TER, then ligand LIG in chain B.
pub(crate) fn ligand_pdb() -> String {
    let mut out = String::from("HEADER    LIGAND COMPLEX\n");
    out.push_str(&pdb_atom("ATOM", 1, "N", "ALA", "A", 1, 91.2));
    out.push_str(&pdb_anisou(1, "N", "ALA", "A", 1));
    out.push_str(&pdb_atom("ATOM", 2, "CA", "ALA", "A", 1, 90.1));
    out.push_str(&pdb_atom("ATOM", 3, "N", "GLY", "A", 2, 88.0));
    out.push_str(&pdb_atom("ATOM", 4, "CA", "GLY", "A", 2, 86.0));
    out.push_str("TER       5      GLY A   2\n");
    out.push_str(&pdb_atom("HETATM", 6, "C1", "LIG", "B", 1, 60.0));
    out.push_str(&pdb_anisou(6, "C1", "LIG", "B", 1));
    out.push_str(&pdb_atom("HETATM", 7, "C2", "LIG", "B", 1, 61.0));
    out.push_str("CONECT    6    7\nEND\n");
    out
}

/// A prediction response carrying `structures` and the usual score fields.
pub(crate) fn response_json(structures: &[String]) -> String {
    let n = structures.len();
    let entries: Vec<_> = structures
        .iter()
        .map(|s| json!({ "format": "mmcif", "structure": s }))
        .collect();
    let per_sample = |base: f64| -> Vec<f64> { (0..n).map(|i| base - i as f64 * 0.01).collect() };
    json!({
        "structures": entries,
        "confidence_scores": per_sample(0.9),
        "ptm_scores": per_sample(0.8),
        "iptm_scores": per_sample(0.7),
        "complex_plddt_scores": per_sample(0.85),
        "pair_chains_iptm_scores": (0..n)
            .map(|i| vec![vec![0.9 - i as f64 * 0.1, 0.5], vec![0.5, 0.8]])
            .collect::<Vec<_>>(),
        "pae": [[0.0, 1.5], [1.5, 0.0]],
    })
    .to_string()
}
