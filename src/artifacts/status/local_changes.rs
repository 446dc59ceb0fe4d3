use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::diff::toc_diff::{self, FileStatus, Toc};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Differences between HEAD, the index and the working copy.
#[derive(Debug, Clone, Default)]
pub struct LocalChanges {
    pub head_toc: Toc,
    pub index_toc: Toc,
    /// Hashes of the tracked files present on disk
    pub workspace_toc: Toc,
    /// HEAD against the index, unmerged paths left out
    pub staged: BTreeMap<PathBuf, FileStatus>,
    /// Index against the working copy
    pub unstaged: BTreeMap<PathBuf, FileStatus>,
    /// Outermost untracked files and directories
    pub untracked: BTreeSet<PathBuf>,
    pub conflicted: Vec<PathBuf>,
}

impl LocalChanges {
    pub fn inspect(repository: &Repository, index: &Index) -> anyhow::Result<Self> {
        let workspace = repository.workspace()?;
        let head = repository.refs().read_head()?;
        let head_toc = repository.database().commit_toc_or_empty(head.as_ref())?;
        let index_toc = index.to_toc();
        let conflicted = index.conflicted_paths();

        let files = workspace.list_files(Path::new(""))?;
        let (tracked, untracked): (Vec<_>, Vec<_>) = files
            .into_iter()
            .partition(|file| index.is_tracked_file(file));
        let workspace_toc = workspace.toc_of(tracked.iter())?;
        let untracked = collapse_untracked(&untracked, |path| index.is_tracked(path));

        let staged = toc_diff::name_status(&toc_diff::diff(&head_toc, &index_toc))
            .into_iter()
            .filter(|(path, _)| !conflicted.contains(path))
            .collect();

        let unstaged = index_toc
            .iter()
            .filter_map(|(path, oid)| match workspace_toc.get(path) {
                None => Some((path.clone(), FileStatus::Deleted)),
                Some(on_disk) if on_disk != oid => Some((path.clone(), FileStatus::Modified)),
                Some(_) => None,
            })
            .collect();

        Ok(LocalChanges {
            head_toc,
            index_toc,
            workspace_toc,
            staged,
            unstaged,
            untracked,
            conflicted,
        })
    }

    /// Tracked paths whose index or on-disk state differs from HEAD.
    pub fn changed_paths(&self) -> BTreeSet<PathBuf> {
        self.staged
            .keys()
            .chain(self.unstaged.keys())
            .chain(self.conflicted.iter())
            .cloned()
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.staged.is_empty()
            && self.unstaged.is_empty()
            && self.untracked.is_empty()
            && self.conflicted.is_empty()
    }
}

/// Replace each untracked file by its outermost ancestor that holds no tracked entry.
fn collapse_untracked(files: &[PathBuf], is_tracked: impl Fn(&Path) -> bool) -> BTreeSet<PathBuf> {
    files
        .iter()
        .map(|file| {
            let mut ancestors = file
                .ancestors()
                .filter(|ancestor| !ancestor.as_os_str().is_empty())
                .collect::<Vec<_>>();
            ancestors.reverse();

            ancestors
                .into_iter()
                .find(|ancestor| !is_tracked(ancestor))
                .unwrap_or(file.as_path())
                .to_path_buf()
        })
        .collect()
}
