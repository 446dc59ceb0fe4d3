use crate::areas::repository::Repository;
use crate::errors::BitError;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

impl Repository {
    /// Remove tracked paths from the index and the working copy.
    pub async fn rm(&mut self, paths: &[String], recursive: bool, force: bool) -> anyhow::Result<()> {
        let workspace = self.workspace()?;
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        let mut targets = BTreeSet::<PathBuf>::new();
        for path in paths {
            let relative = self.relative_path(Path::new(path))?;
            let tracked = index.entries_under_path(&relative);

            if tracked.is_empty() {
                return Err(BitError::PathspecNoMatch(path.clone()).into());
            }
            if !recursive && !index.is_tracked_file(&relative) {
                return Err(BitError::NotRemovingRecursively(relative).into());
            }

            targets.extend(tracked);
        }

        if !force {
            let conflicted = index
                .conflicted_paths()
                .into_iter()
                .filter(|path| targets.contains(path))
                .collect::<Vec<_>>();
            if !conflicted.is_empty() {
                return Err(BitError::UnmergedPaths(conflicted).into());
            }

            let head = self.refs().read_head()?;
            let head_toc = self.database().commit_toc_or_empty(head.as_ref())?;

            let mut modified = Vec::new();
            for path in &targets {
                let Some(entry) = index.entry_by_path(path) else {
                    continue;
                };

                let staged_change = head_toc.get(path) != Some(&entry.oid);
                let unstaged_change =
                    workspace.is_file(path) && workspace.hash_file(path)? != entry.oid;
                if staged_change || unstaged_change {
                    modified.push(path.clone());
                }
            }
            if !modified.is_empty() {
                return Err(BitError::RemoveLocalChanges(modified).into());
            }
        }

        for path in &targets {
            index.remove(path, true)?;
            if workspace.is_file(path) {
                workspace.delete_file(path)?;
            }
            writeln!(self.writer(), "rm '{}'", path.display())?;
        }

        index.write_updates()?;

        Ok(())
    }
}
