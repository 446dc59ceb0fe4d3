//! Working directory access
//!
//! All paths handed to and returned by the workspace are relative to its root. The
//! repository's own `.git` directory is never listed.

use crate::artifacts::diff::toc_diff::Toc;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const IGNORED_PATHS: [&str; 1] = [".git"];

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).symlink_metadata().is_ok()
    }

    pub fn is_directory(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_dir()
    }

    pub fn is_file(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<Bytes> {
        let content = std::fs::read(self.path.join(file_path))
            .with_context(|| format!("failed to read file {}", file_path.display()))?;

        Ok(Bytes::from(content))
    }

    pub fn parse_blob(&self, file_path: &Path) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    /// Id the file's content would have as a blob, without storing it.
    pub fn hash_file(&self, file_path: &Path) -> anyhow::Result<ObjectId> {
        self.parse_blob(file_path)?.object_id()
    }

    /// Write a file, creating its parent directories. A directory standing where the file
    /// goes, or a file standing where a parent directory goes, is removed first.
    pub fn write_file(&self, file_path: &Path, content: &[u8]) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        for ancestor in file_path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            if self.is_file(ancestor) {
                std::fs::remove_file(self.path.join(ancestor)).with_context(|| {
                    format!("failed to remove file in the way of {}", file_path.display())
                })?;
            }
        }

        if full_path.is_dir() {
            std::fs::remove_dir_all(&full_path).with_context(|| {
                format!("failed to remove directory {}", file_path.display())
            })?;
        }

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create parent directories of {}", file_path.display())
            })?;
        }

        std::fs::write(&full_path, content)
            .with_context(|| format!("failed to write file {}", file_path.display()))
    }

    /// Remove a file (or directory) and prune the parent directories it leaves empty.
    pub fn delete_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        let removed = if full_path.is_dir() {
            std::fs::remove_dir_all(&full_path)
        } else if full_path.symlink_metadata().is_ok() {
            std::fs::remove_file(&full_path)
        } else {
            Ok(())
        };
        removed.with_context(|| format!("failed to delete {}", file_path.display()))?;

        self.prune_empty_parents(file_path)
    }

    fn prune_empty_parents(&self, file_path: &Path) -> anyhow::Result<()> {
        for ancestor in file_path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }

            let dir = self.path.join(ancestor);
            let is_empty = std::fs::read_dir(&dir)
                .map(|mut entries| entries.next().is_none())
                .unwrap_or(false);
            if !is_empty {
                break;
            }

            std::fs::remove_dir(&dir)
                .with_context(|| format!("failed to remove empty directory {}", ancestor.display()))?;
        }

        Ok(())
    }

    /// Direct children of a directory, sorted.
    pub fn list_directory(&self, dir_path: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let full_path = self.path.join(dir_path);

        let mut entries = std::fs::read_dir(&full_path)
            .with_context(|| format!("failed to list directory {}", dir_path.display()))?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| self.relative_unignored(&entry.path()))
            .collect::<Vec<_>>();
        entries.sort();

        Ok(entries)
    }

    /// Every file at or below `root` (the whole tree for an empty path), sorted.
    pub fn list_files(&self, root: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let full_path = self.path.join(root);

        if full_path.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }
        if !full_path.is_dir() {
            return Ok(Vec::new());
        }

        let files = WalkDir::new(&full_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !Self::is_ignored(entry.path()))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| self.relative_unignored(entry.path()))
            .collect::<BTreeSet<_>>();

        Ok(files.into_iter().collect())
    }

    /// Hash the given paths as they are on disk; missing or non-file paths are left out.
    pub fn toc_of<'p>(&self, paths: impl IntoIterator<Item = &'p PathBuf>) -> anyhow::Result<Toc> {
        paths
            .into_iter()
            .filter(|path| self.is_file(path))
            .map(|path| Ok((path.clone(), self.hash_file(path)?)))
            .collect()
    }

    fn is_ignored(path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| IGNORED_PATHS.contains(&name.to_string_lossy().as_ref()))
    }

    fn relative_unignored(&self, path: &Path) -> Option<PathBuf> {
        let relative = path.strip_prefix(self.path.as_ref()).ok()?;
        let ignored = relative.components().any(|component| {
            IGNORED_PATHS.contains(&component.as_os_str().to_string_lossy().as_ref())
        });

        (!ignored && !relative.as_os_str().is_empty()).then(|| relative.to_path_buf())
    }
}
