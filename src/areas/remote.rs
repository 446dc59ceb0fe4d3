//! Remote object stores
//!
//! A remote is anything that can enumerate its branches, hand out and accept objects by id,
//! and move its branches. `LocalRemote` is another repository on the local filesystem, bare
//! or not. Transfers copy only the objects the receiving side lacks, children before their
//! parents, so an object already present on the receiving side comes with everything below it.

use crate::areas::database::Database;
use crate::areas::refs::{Head, Refs};
use crate::areas::repository::RepositoryLayout;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::BitError;
use anyhow::Context;
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::debug;

pub trait RemoteStore {
    fn list_branches(&self) -> anyhow::Result<BTreeMap<BranchName, ObjectId>>;

    fn has_object(&self, oid: &ObjectId) -> bool;

    fn read_object(&self, oid: &ObjectId) -> anyhow::Result<Option<Bytes>>;

    fn write_object(&self, raw: Bytes) -> anyhow::Result<ObjectId>;

    fn update_branch(&self, branch: &BranchName, oid: &ObjectId) -> anyhow::Result<()>;

    /// Branch checked out in the remote's work tree; `None` for bare or detached remotes.
    fn checked_out_branch(&self) -> anyhow::Result<Option<BranchName>>;
}

#[derive(Debug)]
pub struct LocalRemote {
    database: Database,
    refs: Refs,
    bare: bool,
}

impl LocalRemote {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let root = path
            .canonicalize()
            .with_context(|| format!("remote repository {} not found", path.display()))?;
        let layout = RepositoryLayout::detect(&root).ok_or(BitError::NotARepository)?;

        Ok(LocalRemote {
            database: Database::new(layout.git_dir.join("objects").into_boxed_path()),
            refs: Refs::new(layout.git_dir.clone().into_boxed_path()),
            bare: layout.bare,
        })
    }
}

impl RemoteStore for LocalRemote {
    fn list_branches(&self) -> anyhow::Result<BTreeMap<BranchName, ObjectId>> {
        let mut branches = BTreeMap::new();
        for branch in self.refs.list_branches()? {
            if let Some(oid) = self.refs.read_branch(&branch)? {
                branches.insert(branch, oid);
            }
        }

        Ok(branches)
    }

    fn has_object(&self, oid: &ObjectId) -> bool {
        self.database.exists(oid)
    }

    fn read_object(&self, oid: &ObjectId) -> anyhow::Result<Option<Bytes>> {
        self.database.read(oid)
    }

    fn write_object(&self, raw: Bytes) -> anyhow::Result<ObjectId> {
        self.database.store_raw(raw)
    }

    fn update_branch(&self, branch: &BranchName, oid: &ObjectId) -> anyhow::Result<()> {
        self.refs.update_branch(branch, oid, &self.database)
    }

    fn checked_out_branch(&self) -> anyhow::Result<Option<BranchName>> {
        if self.bare {
            return Ok(None);
        }

        Ok(match self.refs.head()? {
            Head::Attached(branch) => Some(branch),
            Head::Detached(_) => None,
        })
    }
}

/// Copy every object reachable from `tip` that the destination lacks. Returns how many
/// objects were written.
///
/// Every missing object is read before anything is written, and objects are written
/// children first, so the destination never holds a tree or commit whose children are
/// missing.
pub fn transfer_objects(
    tip: &ObjectId,
    read: impl Fn(&ObjectId) -> anyhow::Result<Option<Bytes>>,
    has: impl Fn(&ObjectId) -> bool,
    write: impl Fn(Bytes) -> anyhow::Result<ObjectId>,
) -> anyhow::Result<usize> {
    let mut missing = HashMap::<ObjectId, (Bytes, Vec<ObjectId>)>::new();
    let mut pending = vec![tip.clone()];

    while let Some(oid) = pending.pop() {
        if missing.contains_key(&oid) || has(&oid) {
            continue;
        }

        let raw = read(&oid)?.ok_or_else(|| BitError::ObjectNotFound(oid.clone()))?;
        let children = ObjectBox::parse(&raw)?.children();
        pending.extend(children.iter().cloned());
        missing.insert(oid, (raw, children));
    }

    let mut done = HashSet::new();
    let mut stack = vec![(tip.clone(), false)];
    while let Some((oid, children_done)) = stack.pop() {
        let Some((raw, children)) = missing.get(&oid) else {
            continue;
        };
        if done.contains(&oid) {
            continue;
        }

        if children_done {
            write(raw.clone())?;
            done.insert(oid);
            continue;
        }

        stack.push((oid, true));
        stack.extend(
            children
                .iter()
                .filter(|child| !done.contains(*child))
                .map(|child| (child.clone(), false)),
        );
    }

    let written = done.len();
    debug!(tip = %tip.to_short_oid(), written, "transferred objects");
    Ok(written)
}
