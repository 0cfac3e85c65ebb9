use crate::core::models::document::Format;
use std::path::Path;

const PDB_RECORDS: [&str; 6] = ["ATOM", "HETATM", "HEADER", "TITLE", "REMARK", "CRYST1"];

/// Guesses the format of structure text, falling back to the file extension.
///
/// Content wins over the extension: a `data_` block or `_atom_site.` tag means mmCIF, a
/// leading PDB record means PDB. Otherwise `.cif` and `.mmcif` files are mmCIF and
/// everything else is treated as PDB.
pub fn detect_format(text: &str, path: Option<&Path>) -> Format {
    let first = text
        .lines()
        .map(str::trim_start)
        .find(|l| !l.is_empty() && !l.starts_with('#'));

    if let Some(line) = first {
        if line.starts_with("data_") || line.starts_with("_atom_site.") {
            return Format::Mmcif;
        }
        if PDB_RECORDS.iter().any(|r| line.starts_with(r)) {
            return Format::Pdb;
        }
    }
    if text.contains("\n_atom_site.") {
        return Format::Mmcif;
    }

    match path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("cif" | "mmcif") => Format::Mmcif,
        _ => Format::Pdb,
    }
}

/// Whether text looks like a JSON object rather than a structure file.
pub fn is_json(text: &str) -> bool {
    text.trim_start().starts_with('{')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_decides_before_extension() {
        let cif = "data_model\n_entry.id model\n";
        assert_eq!(detect_format(cif, Some(Path::new("x.pdb"))), Format::Mmcif);

        let pdb = "HEADER    PROTEIN\nATOM      1  N   ALA A   1\n";
        assert_eq!(detect_format(pdb, Some(Path::new("x.cif"))), Format::Pdb);
    }

    #[test]
    fn comments_before_the_first_block_are_skipped() {
        let cif = "# generated\n\ndata_model\n";
        assert_eq!(detect_format(cif, None), Format::Mmcif);
    }

    #[test]
    fn extension_is_the_fallback() {
        let unknown = "something else\n";
        assert_eq!(detect_format(unknown, Some(Path::new("a.MMCIF"))), Format::Mmcif);
        assert_eq!(detect_format(unknown, Some(Path::new("a.cif"))), Format::Mmcif);
        assert_eq!(detect_format(unknown, Some(Path::new("a.ent"))), Format::Pdb);
        assert_eq!(detect_format(unknown, None), Format::Pdb);
    }

    #[test]
    fn recognizes_json_objects() {
        assert!(is_json("  {\"structures\": []}"));
        assert!(!is_json("data_x\n"));
    }
}
