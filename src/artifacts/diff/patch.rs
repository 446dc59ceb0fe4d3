//! Unified patches between two versions of a file
//!
//! Edits come from the same LCS alignment and common/divergent regions the three-way merge
//! uses. Changes are grouped into hunks with three lines of context on each side, and hunks
//! whose context would overlap are joined.

use crate::artifacts::merge::diff3::{self, Hunk as Region, align, lcs, split_lines};
use std::fmt::Display;

pub const CONTEXT_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Delete { line: String, a_line: usize },
    Insert { line: String, b_line: usize },
    Equal { line: String, a_line: usize, b_line: usize },
}

impl Edit {
    pub fn is_equal(&self) -> bool {
        matches!(self, Edit::Equal { .. })
    }

    fn a_line(&self) -> Option<usize> {
        match self {
            Edit::Delete { a_line, .. } | Edit::Equal { a_line, .. } => Some(*a_line),
            Edit::Insert { .. } => None,
        }
    }

    fn b_line(&self) -> Option<usize> {
        match self {
            Edit::Insert { b_line, .. } | Edit::Equal { b_line, .. } => Some(*b_line),
            Edit::Delete { .. } => None,
        }
    }
}

impl Display for Edit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edit::Delete { line, .. } => write!(f, "-{line}"),
            Edit::Insert { line, .. } => write!(f, "+{line}"),
            Edit::Equal { line, .. } => write!(f, " {line}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    edits: Vec<Edit>,
}

impl Hunk {
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn a_start(&self) -> usize {
        self.edits.iter().find_map(Edit::a_line).unwrap_or(0)
    }

    pub fn b_start(&self) -> usize {
        self.edits.iter().find_map(Edit::b_line).unwrap_or(0)
    }

    pub fn a_size(&self) -> usize {
        self.edits.iter().filter(|edit| edit.a_line().is_some()).count()
    }

    pub fn b_size(&self) -> usize {
        self.edits.iter().filter(|edit| edit.b_line().is_some()).count()
    }

    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.a_start(),
            self.a_size(),
            self.b_start(),
            self.b_size()
        )
    }
}

/// Unified hunks turning `a` into `b`; line numbers are 1-based.
///
/// Built on the common/divergent regions of the line alignment: each divergent region
/// becomes deletions followed by insertions, and a common region longer than twice the
/// context splits two hunks.
pub fn hunks(a: &[u8], b: &[u8]) -> Vec<Hunk> {
    let a_lines = split_lines(a);
    let b_lines = split_lines(b);
    let text = |line: &[u8]| {
        String::from_utf8_lossy(line.strip_suffix(b"\n").unwrap_or(line)).into_owned()
    };
    let equal = |i: usize, j: usize| Edit::Equal {
        line: text(a_lines[i]),
        a_line: i + 1,
        b_line: j + 1,
    };

    let pairs = align(a_lines.len(), b_lines.len(), &lcs(&a_lines, &b_lines));
    let regions = diff3::hunks(&pairs);

    let mut result = Vec::new();
    let mut current: Option<Vec<Edit>> = None;
    let mut leading = Vec::new();

    for (position, region) in regions.iter().enumerate() {
        match region {
            Region::Divergent { a, b } => {
                let edits = current.get_or_insert_with(|| std::mem::take(&mut leading));
                edits.extend(a.clone().map(|i| Edit::Delete {
                    line: text(a_lines[i]),
                    a_line: i + 1,
                }));
                edits.extend(b.clone().map(|j| Edit::Insert {
                    line: text(b_lines[j]),
                    b_line: j + 1,
                }));
            }
            Region::Common { a, b } => {
                let lines = a.clone().zip(b.clone()).collect::<Vec<_>>();
                let is_last = position + 1 == regions.len();

                match current.take() {
                    Some(mut edits) if !is_last && lines.len() <= 2 * CONTEXT_LINES => {
                        edits.extend(lines.iter().map(|&(i, j)| equal(i, j)));
                        current = Some(edits);
                    }
                    Some(mut edits) => {
                        let trailing = lines.iter().take(CONTEXT_LINES);
                        edits.extend(trailing.map(|&(i, j)| equal(i, j)));
                        result.push(Hunk { edits });
                        leading = tail(&lines).iter().map(|&(i, j)| equal(i, j)).collect();
                    }
                    None => {
                        leading = tail(&lines).iter().map(|&(i, j)| equal(i, j)).collect();
                    }
                }
            }
        }
    }

    if let Some(edits) = current {
        result.push(Hunk { edits });
    }

    result
}

/// The last `CONTEXT_LINES` matched lines of a common region.
fn tail(lines: &[(usize, usize)]) -> &[(usize, usize)] {
    &lines[lines.len().saturating_sub(CONTEXT_LINES)..]
}
