use crate::core::models::document::Format;

fn line_starts(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_inclusive('\n').scan(0, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line))
    })
}

fn pdb_record(line: &str) -> &str {
    line.get(..6).unwrap_or(line).trim_end()
}

/// Splits concatenated mmCIF data blocks.
///
/// The pieces concatenate back to `text`; anything before the first `data_` line stays
/// with the first block.
pub fn split_data_blocks(text: &str) -> Vec<&str> {
    let mut bounds: Vec<usize> = line_starts(text)
        .filter(|(_, line)| {
            line.get(..5)
                .is_some_and(|p| p.eq_ignore_ascii_case("data_"))
        })
        .map(|(start, _)| start)
        .skip(1)
        .collect();
    bounds.insert(0, 0);
    bounds.push(text.len());

    bounds
        .windows(2)
        .map(|w| &text[w[0]..w[1]])
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Splits a multi-model PDB file into one complete file per model.
///
/// Each model keeps the records before the first `MODEL` and after the last `ENDMDL`.
/// A file with at most one model is returned unchanged.
pub fn split_models(text: &str) -> Vec<String> {
    let mut models: Vec<(usize, usize)> = Vec::new();
    let mut open: Option<usize> = None;
    for (start, line) in line_starts(text) {
        match pdb_record(line) {
            "MODEL" => open = Some(start),
            "ENDMDL" => {
                if let Some(begin) = open.take() {
                    models.push((begin, start + line.len()));
                }
            }
            _ => {}
        }
    }

    let (Some(&(first, _)), Some(&(_, last))) = (models.first(), models.last()) else {
        return vec![text.to_string()];
    };
    if models.len() < 2 {
        return vec![text.to_string()];
    }
    let prefix = &text[..first];
    let suffix = &text[last..];
    models
        .iter()
        .map(|&(begin, end)| format!("{prefix}{}{suffix}", &text[begin..end]))
        .collect()
}

/// Splits structure text into one text per predicted sample.
pub fn split_samples(text: &str, format: Format) -> Vec<String> {
    match format {
        Format::Mmcif => split_data_blocks(text)
            .into_iter()
            .map(str::to_string)
            .collect(),
        Format::Pdb => split_models(text),
    }
}
