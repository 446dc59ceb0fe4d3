//! Table-of-contents diffing
//!
//! A TOC maps repository-relative paths to blob ids. It can come from a commit (flattened
//! tree), from the index (stage-0 entries) or from the working copy (hashed on-disk
//! content). Two- and three-way comparison both reduce to `classify` on the optional ids a
//! path has in the receiver, base and giver snapshots.

use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

pub type Toc = BTreeMap<PathBuf, ObjectId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Same,
    Conflict,
}

impl FileStatus {
    pub fn letter(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Same => ' ',
            FileStatus::Conflict => 'U',
        }
    }

    pub fn matches_filter(&self, filter: DiffFilter) -> bool {
        match self {
            FileStatus::Added => filter.contains(DiffFilter::ADDED),
            FileStatus::Deleted => filter.contains(DiffFilter::DELETED),
            FileStatus::Modified => filter.contains(DiffFilter::MODIFIED),
            FileStatus::Conflict => filter.contains(DiffFilter::UNMERGED),
            FileStatus::Same => false,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct DiffFilter: u32 {
        const ADDED = 0b0001;
        const DELETED = 0b0010;
        const MODIFIED = 0b0100;
        const UNMERGED = 0b1000;
    }
}

impl DiffFilter {
    /// Parse `--diff-filter` letters such as `AM`.
    pub fn try_parse(s: &str) -> Option<Self> {
        let mut filter = Self::empty();

        for c in s.chars() {
            match c {
                'A' => filter |= Self::ADDED,
                'D' => filter |= Self::DELETED,
                'M' => filter |= Self::MODIFIED,
                'U' => filter |= Self::UNMERGED,
                _ => return None,
            }
        }

        Some(filter)
    }
}

/// Classification of one path together with the ids it has on each side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDiff {
    pub status: FileStatus,
    pub receiver: Option<ObjectId>,
    pub base: Option<ObjectId>,
    pub giver: Option<ObjectId>,
}

pub type ClassifiedToc = BTreeMap<PathBuf, PathDiff>;

/// Classify one path from the ids it carries in the receiver, base and giver snapshots.
pub fn classify(
    receiver: Option<&ObjectId>,
    base: Option<&ObjectId>,
    giver: Option<&ObjectId>,
) -> FileStatus {
    match (receiver, base, giver) {
        (Some(r), _, Some(g)) if r == g => FileStatus::Same,
        (Some(r), base, Some(g)) => {
            if base != Some(r) && base != Some(g) {
                FileStatus::Conflict
            } else {
                FileStatus::Modified
            }
        }
        (None, None, None) => FileStatus::Same,
        (None, None, Some(_)) | (Some(_), None, None) => FileStatus::Added,
        (Some(_), Some(_), None) | (None, Some(_), Some(_)) => FileStatus::Deleted,
        // present in the base only: both sides removed it
        (None, Some(_), None) => FileStatus::Same,
    }
}

/// Three-way classification over the union of paths of all three snapshots.
pub fn diff_with_base(receiver: &Toc, base: &Toc, giver: &Toc) -> ClassifiedToc {
    let paths = receiver
        .keys()
        .chain(base.keys())
        .chain(giver.keys())
        .collect::<BTreeSet<_>>();

    paths
        .into_iter()
        .map(|path| {
            let (r, b, g) = (receiver.get(path), base.get(path), giver.get(path));
            let diff = PathDiff {
                status: classify(r, b, g),
                receiver: r.cloned(),
                base: b.cloned(),
                giver: g.cloned(),
            };
            (path.clone(), diff)
        })
        .collect()
}

/// Two-way comparison of `a` against `b`, with `a` standing in as the base.
pub fn diff(a: &Toc, b: &Toc) -> ClassifiedToc {
    diff_with_base(a, a, b)
}

/// Every path whose classification is not `Same`.
pub fn name_status(classified: &ClassifiedToc) -> BTreeMap<PathBuf, FileStatus> {
    classified
        .iter()
        .filter(|(_, diff)| diff.status != FileStatus::Same)
        .map(|(path, diff)| (path.clone(), diff.status))
        .collect()
}

/// Paths whose id differs between `a` and `b`.
pub fn changed_paths(a: &Toc, b: &Toc) -> BTreeSet<PathBuf> {
    name_status(&diff(a, b)).into_keys().collect()
}

/// Restrict a TOC to the entries at or below `prefix`; an empty prefix keeps everything.
pub fn under<'t>(toc: &'t Toc, prefix: &'t Path) -> impl Iterator<Item = (&'t PathBuf, &'t ObjectId)> {
    toc.iter()
        .filter(move |(path, _)| prefix.as_os_str().is_empty() || path.starts_with(prefix))
}
