/// Byte range of a value within its row text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// How values in a column are padded to a common width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Values share a start position; padding trails.
    Left,
    /// Values share an end position; padding leads.
    Right,
    /// No shared edge; values are separated by arbitrary whitespace.
    Ragged,
}

/// Presentation rule for one column, captured from the source at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLayout {
    /// Whitespace-delimited token (mmCIF loops).
    Delimited { alignment: Alignment },
    /// Fixed character span, identical in every row (PDB records).
    Fixed {
        start: usize,
        end: usize,
        alignment: Alignment,
    },
}

impl ColumnLayout {
    pub fn alignment(&self) -> Alignment {
        match self {
            ColumnLayout::Delimited { alignment } | ColumnLayout::Fixed { alignment, .. } => {
                *alignment
            }
        }
    }
}

/// Infers the alignment of a delimited column from the value spans observed in each row.
///
/// A shared start wins over a shared end, so columns whose values all have the same width
/// are treated as left-aligned. Fewer than two rows carry no evidence and yield `Ragged`.
pub fn detect_alignment<I>(spans: I) -> Alignment
where
    I: IntoIterator<Item = Span>,
{
    let mut iter = spans.into_iter();
    let Some(first) = iter.next() else {
        return Alignment::Ragged;
    };

    let mut same_start = true;
    let mut same_end = true;
    let mut observed = 1usize;
    for span in iter {
        observed += 1;
        same_start &= span.start == first.start;
        same_end &= span.end == first.end;
        if !same_start && !same_end {
            return Alignment::Ragged;
        }
    }

    if observed < 2 {
        Alignment::Ragged
    } else if same_start {
        Alignment::Left
    } else if same_end {
        Alignment::Right
    } else {
        Alignment::Ragged
    }
}
