//! Per-path resolution of a three-way merge
//!
//! Takes a three-way classified TOC and decides, path by path, what the merge result is:
//! a change to carry over from the giver, nothing (the receiver already has it), a clean
//! content merge, or a conflict to stage.

use crate::artifacts::checkout::migration::Changes;
use crate::artifacts::diff::toc_diff::{ClassifiedToc, FileStatus, PathDiff};
use crate::artifacts::merge::diff3::{self, Labels};
use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Receiver,
    Giver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Both sides changed the content differently
    Content,
    /// Both sides added the path with different content
    AddAdd,
    /// One side deleted the path, the other modified it
    ModifyDelete { deleted_by: Side },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConflict {
    pub path: PathBuf,
    pub kind: ConflictKind,
    pub base: Option<ObjectId>,
    pub receiver: Option<ObjectId>,
    pub giver: Option<ObjectId>,
    /// Working-copy content to write; `None` keeps the receiver's file as it is
    pub content: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Clean updates relative to the receiver
    pub changes: Changes,
    pub conflicts: Vec<PathConflict>,
    /// Paths that went through the text merge
    pub auto_merged: Vec<PathBuf>,
}

impl Resolution {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Decide the outcome of every classified path.
///
/// A deletion only applies directly when the surviving side still equals the base. When the
/// other side modified the path (modify/delete), it is staged as a conflict instead and the
/// surviving content stays in the working copy.
pub fn resolve(
    classified: &ClassifiedToc,
    labels: Labels<'_>,
    load: impl Fn(&ObjectId) -> anyhow::Result<Bytes>,
    store: impl Fn(&[u8]) -> anyhow::Result<ObjectId>,
) -> anyhow::Result<Resolution> {
    let mut resolution = Resolution::default();

    for (path, diff) in classified {
        let PathDiff {
            status,
            receiver,
            base,
            giver,
        } = diff;

        match status {
            FileStatus::Same => {}
            FileStatus::Added | FileStatus::Modified => {
                // only the side that differs from the base matters
                if receiver == base || receiver.is_none() {
                    resolution.changes.insert(path.clone(), giver.clone());
                }
            }
            FileStatus::Deleted => match (receiver, giver) {
                (Some(r), None) if Some(r) == base.as_ref() => {
                    resolution.changes.insert(path.clone(), None);
                }
                (Some(_), None) => resolution.conflicts.push(PathConflict {
                    path: path.clone(),
                    kind: ConflictKind::ModifyDelete {
                        deleted_by: Side::Giver,
                    },
                    base: base.clone(),
                    receiver: receiver.clone(),
                    giver: None,
                    content: None,
                }),
                (None, Some(g)) if Some(g) == base.as_ref() => {}
                (None, Some(g)) => resolution.conflicts.push(PathConflict {
                    path: path.clone(),
                    kind: ConflictKind::ModifyDelete {
                        deleted_by: Side::Receiver,
                    },
                    base: base.clone(),
                    receiver: None,
                    giver: giver.clone(),
                    content: Some(load(g)?.to_vec()),
                }),
                _ => {}
            },
            FileStatus::Conflict => {
                let (Some(r), Some(g)) = (receiver, giver) else {
                    continue;
                };

                let base_content = match base {
                    Some(b) => load(b)?,
                    None => Bytes::new(),
                };
                let merged = diff3::merge(&base_content, &load(r)?, &load(g)?, labels);
                resolution.auto_merged.push(path.clone());

                if merged.is_clean() {
                    let oid = store(&merged.content)?;
                    resolution.changes.insert(path.clone(), Some(oid));
                } else {
                    let kind = match base {
                        Some(_) => ConflictKind::Content,
                        None => ConflictKind::AddAdd,
                    };
                    resolution.conflicts.push(PathConflict {
                        path: path.clone(),
                        kind,
                        base: base.clone(),
                        receiver: receiver.clone(),
                        giver: giver.clone(),
                        content: Some(merged.content),
                    });
                }
            }
        }
    }

    debug!(
        changes = resolution.changes.len(),
        conflicts = resolution.conflicts.len(),
        "resolved three-way merge"
    );
    Ok(resolution)
}
