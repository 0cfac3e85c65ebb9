use crate::core::models::column::Span;

/// Byte offset of a quote that is never closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnterminatedQuote {
    pub offset: usize,
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Splits one mmCIF data line into value spans.
///
/// Quoted values keep their quotes in the span; a quote only closes when followed by
/// whitespace or the end of the line, so `'N'-oxide'` style values stay in one piece.
/// A `#` at the start of a value begins a comment that runs to the end of the line.
pub fn tokenize(line: &str) -> Result<Vec<Span>, UnterminatedQuote> {
    let bytes = line.as_bytes();
    let n = bytes.len();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < n {
        let b = bytes[i];
        if b == b' ' || b == b'\t' {
            i += 1;
            continue;
        }
        if b == b'\r' || b == b'\n' || b == b'#' {
            break;
        }

        let start = i;
        if b == b'\'' || b == b'"' {
            i += 1;
            loop {
                if i >= n || bytes[i] == b'\r' || bytes[i] == b'\n' {
                    return Err(UnterminatedQuote { offset: start });
                }
                if bytes[i] == b && (i + 1 >= n || is_space(bytes[i + 1])) {
                    i += 1;
                    break;
                }
                i += 1;
            }
        } else {
            while i < n && !is_space(bytes[i]) {
                i += 1;
            }
        }
        spans.push(Span::new(start, i));
    }

    Ok(spans)
}
