//! Domain errors
//!
//! Every failure a caller is expected to react to has its own variant here. Infrastructure
//! failures (I/O, corrupt objects, malformed files) stay plain `anyhow` errors with context.
//! Commands return `anyhow::Result`, so callers recover the kind with
//! `err.downcast_ref::<BitError>()`.

use crate::artifacts::checkout::conflict::{ConflictMessage, ConflictType, Operation};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BitError {
    #[error("not a twig repository (or any of the parent directories): .git")]
    NotARepository,

    #[error("this operation must be run in a work tree")]
    BareRepository,

    #[error("cannot {0} while HEAD is detached")]
    DetachedHead(&'static str),

    #[error("unknown revision or path not in the working tree: '{0}'")]
    UnknownRevision(String),

    #[error("object {oid} is a {actual}, expected commit type")]
    NotACommit { oid: ObjectId, actual: ObjectType },

    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),

    #[error("'{0}' is not a valid reference name")]
    InvalidRefName(String),

    #[error("a branch named '{0}' already exists")]
    BranchExists(String),

    #[error("branch '{0}' not found")]
    BranchNotFound(String),

    #[error("cannot delete branch '{0}' checked out at the current worktree")]
    CannotDeleteCurrentBranch(String),

    #[error("{}", format_conflicts(.conflicts, .operation))]
    WorkingTreeConflict {
        conflicts: BTreeMap<ConflictType, BTreeSet<PathBuf>>,
        operation: Operation,
    },

    #[error(
        "committing is not possible because you have unmerged files:\n{}\nfix them up in the work tree, and then add them",
        format_paths(.0)
    )]
    UnmergedPaths(Vec<PathBuf>),

    #[error("you need to resolve your current index first:\n{}", format_paths(.0))]
    ResolveIndexFirst(Vec<PathBuf>),

    #[error(
        "You have not concluded your merge (MERGE_HEAD exists).\nPlease, commit your changes before you {0}."
    )]
    MergeInProgress(&'static str),

    #[error("There is no merge to abort (MERGE_HEAD missing).")]
    NoMergeInProgress,

    #[error("nothing to commit, working tree clean")]
    NothingToCommit,

    #[error("Aborting commit due to empty commit message.")]
    EmptyCommitMessage,

    #[error("pathspec '{0}' did not match any files")]
    PathspecNoMatch(String),

    #[error("not removing '{}' recursively without -r", .0.display())]
    NotRemovingRecursively(PathBuf),

    #[error(
        "the following files have local modifications:\n{}\n(use -f to force removal)",
        format_paths(.0)
    )]
    RemoveLocalChanges(Vec<PathBuf>),

    #[error("failed to push some refs: the tip of '{0}' is not an ancestor of the pushed commit")]
    NonFastForward(String),

    #[error("refusing to update checked out branch: refs/heads/{0}")]
    RemoteBranchCheckedOut(String),

    #[error("couldn't find remote ref '{0}'")]
    RemoteRefNotFound(String),
}

pub fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| format!("\t{}", path.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One header/paths/footer block per kind of conflict, in kind order.
fn format_conflicts(
    conflicts: &BTreeMap<ConflictType, BTreeSet<PathBuf>>,
    operation: &Operation,
) -> String {
    let blocks = conflicts
        .iter()
        .filter(|(_, paths)| !paths.is_empty())
        .map(|(kind, paths)| {
            let ConflictMessage { header, footer } = ConflictMessage::new(kind, operation);
            let paths = paths.iter().cloned().collect::<Vec<_>>();
            format!("{}\n{}\n{}", header, format_paths(&paths), footer)
        })
        .collect::<Vec<_>>();

    format!("{}\n\nAborting", blocks.join("\n\n"))
}
