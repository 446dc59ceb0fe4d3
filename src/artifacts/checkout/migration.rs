use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::conflict::{ConflictType, Operation};
use crate::artifacts::diff::toc_diff::{self, Toc};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::BitError;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Target state for every path that changes: `Some(blob)` to write, `None` to delete.
pub type Changes = BTreeMap<PathBuf, Option<ObjectId>>;

pub struct Migration<'r> {
    repository: &'r Repository,
    operation: Operation,
    /// Snapshot the working copy is expected to match
    from: Toc,
    changes: Changes,
}

impl<'r> Migration<'r> {
    /// Migrate from one snapshot to another.
    pub fn between(repository: &'r Repository, from: &Toc, to: &Toc, operation: Operation) -> Self {
        let changes = toc_diff::changed_paths(from, to)
            .into_iter()
            .map(|path| {
                let target = to.get(&path).cloned();
                (path, target)
            })
            .collect();

        Migration {
            repository,
            operation,
            from: from.clone(),
            changes,
        }
    }

    /// Apply an explicit set of path updates on top of `from`.
    pub fn from_changes(
        repository: &'r Repository,
        from: &Toc,
        changes: Changes,
        operation: Operation,
    ) -> Self {
        Migration {
            repository,
            operation,
            from: from.clone(),
            changes,
        }
    }

    pub fn changes(&self) -> &Changes {
        &self.changes
    }

    pub fn changed_paths(&self) -> BTreeSet<PathBuf> {
        self.changes.keys().cloned().collect()
    }

    /// Refuse the migration when it would clobber local state.
    pub fn check(&self, index: &Index) -> anyhow::Result<()> {
        let mut conflicts = BTreeMap::<ConflictType, BTreeSet<PathBuf>>::new();

        for (path, target) in &self.changes {
            if let Some(kind) = self.conflict_at(index, path, target.as_ref())? {
                conflicts.entry(kind).or_default().insert(path.clone());
            } else if let Some(parent) = self.untracked_parent(index, path, target.as_ref()) {
                conflicts
                    .entry(ConflictType::UntrackedOverwritten)
                    .or_default()
                    .insert(parent);
            }
        }

        if conflicts.is_empty() {
            return Ok(());
        }

        debug!(kinds = conflicts.len(), "working tree conflicts");
        Err(BitError::WorkingTreeConflict {
            conflicts,
            operation: self.operation,
        }
        .into())
    }

    fn conflict_at(
        &self,
        index: &Index,
        path: &Path,
        target: Option<&ObjectId>,
    ) -> anyhow::Result<Option<ConflictType>> {
        let workspace = self.repository.workspace()?;
        let staged = index.entry_by_path(path).map(|entry| &entry.oid);
        let expected = self.from.get(path);

        let conflicted = index.conflicted_paths().iter().any(|p| p == path);
        if conflicted || (staged != expected && staged != target) {
            return Ok(Some(ConflictType::StaleFile));
        }

        if workspace.is_file(path) {
            let on_disk = workspace.hash_file(path)?;
            return Ok(match staged {
                Some(oid) if *oid != on_disk => Some(ConflictType::StaleFile),
                Some(_) => None,
                None if target.is_some_and(|oid| *oid != on_disk) => {
                    Some(ConflictType::UntrackedOverwritten)
                }
                None => None,
            });
        }

        if target.is_some() && workspace.is_directory(path) {
            let untracked = workspace
                .list_files(path)?
                .iter()
                .any(|file| !index.is_tracked_file(file));
            if untracked {
                return Ok(Some(ConflictType::StaleDirectory));
            }
        }

        Ok(None)
    }

    /// An untracked file standing where one of `path`'s parent directories must go.
    fn untracked_parent(&self, index: &Index, path: &Path, target: Option<&ObjectId>) -> Option<PathBuf> {
        if target.is_none() {
            return None;
        }
        let workspace = self.repository.workspace().ok()?;

        path.parent()?
            .ancestors()
            .filter(|parent| !parent.as_os_str().is_empty())
            .find(|parent| workspace.is_file(parent) && !index.is_tracked_file(parent))
            .map(Path::to_path_buf)
    }

    /// Write the changes to the working copy and index: removals first, then writes.
    pub fn apply(&self, index: &mut Index) -> anyhow::Result<()> {
        let workspace = self.repository.workspace()?;

        for path in self.changes.iter().filter(|(_, t)| t.is_none()).map(|(p, _)| p) {
            if index.is_tracked_file(path) && workspace.is_file(path) {
                workspace.delete_file(path)?;
            }
            index.remove(path, true)?;
        }

        for (path, oid) in self.changes.iter().filter_map(|(p, t)| Some((p, t.as_ref()?))) {
            let content = self.repository.database().load_blob(oid)?;
            workspace.write_file(path, &content)?;
            index.add(path.clone(), oid.clone());
        }

        debug!(
            operation = %self.operation,
            changes = self.changes.len(),
            "applied migration"
        );
        Ok(())
    }
}
