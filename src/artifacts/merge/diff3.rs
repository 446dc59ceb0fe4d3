//! Line-level three-way text merge
//!
//! Texts are split into byte lines that keep their `\n` terminator, so any content
//! survives a merge untouched. The receiver and giver are each aligned against the
//! ancestor through a longest common subsequence. Ancestor lines matched on both sides at
//! the current offsets form stable hunks; whatever lies between two stable hunks is an
//! unstable hunk whose ancestor span is known exactly:
//!
//! - only one side changed the span: take that side
//! - both sides changed it identically: take either
//! - both changed it differently: emit a conflict with markers
//!
//! ```text
//! <<<<<<< receiver-label
//! receiver lines
//! =======
//! giver lines
//! >>>>>>> giver-label
//! ```

use std::cmp::max;
use std::ops::Range;

pub const RECEIVER_MARKER: &str = "<<<<<<<";
pub const SEPARATOR_MARKER: &str = "=======";
pub const GIVER_MARKER: &str = ">>>>>>>";

pub fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    data.split_inclusive(|byte| *byte == b'\n').collect()
}

/// Longest common subsequence of `a` and `b` as matched index pairs, in order.
///
/// Classic O(n·m) table filled from the end so the forward walk can pick matches greedily.
pub fn lcs<T: PartialEq>(a: &[T], b: &[T]) -> Vec<(usize, usize)> {
    let (n, m) = (a.len(), b.len());
    let mut table = vec![vec![0usize; m + 1]; n + 1];

    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if a[i] == b[j] {
                table[i + 1][j + 1] + 1
            } else {
                max(table[i + 1][j], table[i][j + 1])
            };
        }
    }

    let mut matches = Vec::with_capacity(table[0][0]);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            matches.push((i, j));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }

    matches
}

/// One step of an alignment: matched units carry both indices, unmatched ones only theirs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedPair {
    pub a: Option<usize>,
    pub b: Option<usize>,
}

/// Walk both sequences along the matches, pairing every unmatched unit with a gap.
pub fn align(a_len: usize, b_len: usize, matches: &[(usize, usize)]) -> Vec<AlignedPair> {
    let mut pairs = Vec::with_capacity(a_len + b_len);
    let (mut i, mut j) = (0, 0);

    for &(mi, mj) in matches.iter().chain(std::iter::once(&(a_len, b_len))) {
        pairs.extend((i..mi).map(|i| AlignedPair { a: Some(i), b: None }));
        pairs.extend((j..mj).map(|j| AlignedPair { a: None, b: Some(j) }));

        if mi < a_len && mj < b_len {
            pairs.push(AlignedPair {
                a: Some(mi),
                b: Some(mj),
            });
        }
        i = mi + 1;
        j = mj + 1;
    }

    pairs
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hunk {
    Common { a: Range<usize>, b: Range<usize> },
    Divergent { a: Range<usize>, b: Range<usize> },
}

/// Group an alignment into maximal runs of matched and unmatched units.
pub fn hunks(pairs: &[AlignedPair]) -> Vec<Hunk> {
    let mut result: Vec<Hunk> = Vec::new();
    let (mut ai, mut bi) = (0usize, 0usize);

    for pair in pairs {
        let matched = pair.a.is_some() && pair.b.is_some();
        let (next_a, next_b) = (ai + pair.a.is_some() as usize, bi + pair.b.is_some() as usize);

        match result.last_mut() {
            Some(Hunk::Common { a, b }) if matched => {
                a.end = next_a;
                b.end = next_b;
            }
            Some(Hunk::Divergent { a, b }) if !matched => {
                a.end = next_a;
                b.end = next_b;
            }
            _ if matched => result.push(Hunk::Common { a: ai..next_a, b: bi..next_b }),
            _ => result.push(Hunk::Divergent { a: ai..next_a, b: bi..next_b }),
        }

        ai = next_a;
        bi = next_b;
    }

    result
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub content: Vec<u8>,
    pub conflicted: bool,
}

impl MergeResult {
    pub fn is_clean(&self) -> bool {
        !self.conflicted
    }
}

/// Marker labels, usually the current branch and the merge target as the user named it
#[derive(Debug, Clone, Copy)]
pub struct Labels<'l> {
    pub receiver: &'l str,
    pub giver: &'l str,
}

pub fn merge(base: &[u8], receiver: &[u8], giver: &[u8], labels: Labels<'_>) -> MergeResult {
    let o = split_lines(base);
    let a = split_lines(receiver);
    let b = split_lines(giver);

    let match_a = ancestor_matches(&o, &a);
    let match_b = ancestor_matches(&o, &b);

    let mut output = Vec::new();
    let mut conflicted = false;
    let (mut io, mut ia, mut ib) = (0usize, 0usize, 0usize);

    loop {
        let mut stable = 0;
        while io + stable < o.len()
            && match_a[io + stable] == Some(ia + stable)
            && match_b[io + stable] == Some(ib + stable)
        {
            stable += 1;
        }

        if stable > 0 {
            o[io..io + stable].iter().for_each(|line| output.extend_from_slice(line));
            io += stable;
            ia += stable;
            ib += stable;
            continue;
        }

        let next_stable = (io..o.len()).find_map(|k| match (match_a[k], match_b[k]) {
            (Some(ea), Some(eb)) if ea >= ia && eb >= ib => Some((k, ea, eb)),
            _ => None,
        });

        let (eo, ea, eb) = next_stable.unwrap_or((o.len(), a.len(), b.len()));
        if (eo, ea, eb) == (io, ia, ib) {
            break;
        }

        conflicted |= resolve_chunk(
            &o[io..eo],
            &a[ia..ea],
            &b[ib..eb],
            labels,
            &mut output,
        );

        io = eo;
        ia = ea;
        ib = eb;
    }

    MergeResult {
        content: output,
        conflicted,
    }
}

/// For every ancestor line, the index of the line it matches in `side`.
fn ancestor_matches(ancestor: &[&[u8]], side: &[&[u8]]) -> Vec<Option<usize>> {
    let mut matches = vec![None; ancestor.len()];
    for (io, is) in lcs(ancestor, side) {
        matches[io] = Some(is);
    }
    matches
}

/// Returns whether the chunk had to be written as a conflict.
fn resolve_chunk(
    base: &[&[u8]],
    receiver: &[&[u8]],
    giver: &[&[u8]],
    labels: Labels<'_>,
    output: &mut Vec<u8>,
) -> bool {
    let write = |lines: &[&[u8]], output: &mut Vec<u8>| {
        lines.iter().for_each(|line| output.extend_from_slice(line));
    };

    if receiver == base {
        write(giver, output);
        false
    } else if giver == base || receiver == giver {
        write(receiver, output);
        false
    } else {
        output.extend_from_slice(format!("{RECEIVER_MARKER} {}\n", labels.receiver).as_bytes());
        write_terminated(receiver, output);
        output.extend_from_slice(format!("{SEPARATOR_MARKER}\n").as_bytes());
        write_terminated(giver, output);
        output.extend_from_slice(format!("{GIVER_MARKER} {}\n", labels.giver).as_bytes());
        true
    }
}

fn write_terminated(lines: &[&[u8]], output: &mut Vec<u8>) {
    lines.iter().for_each(|line| output.extend_from_slice(line));
    if lines.last().is_some_and(|line| !line.ends_with(b"\n")) {
        output.push(b'\n');
    }
}
