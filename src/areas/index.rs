//! Index (staging area)
//!
//! Entries are keyed by `(path, stage)`. A resolved path has a single stage-0 entry; a
//! conflicted path has some of the stage 1/2/3 entries and no stage-0 entry. A directory
//! map keeps track of which entries live below each directory so that a file replacing a
//! directory (or the other way round) evicts the colliding entries.
//!
//! The file is read under a shared `file-guard` lock and rewritten under an exclusive one.

use crate::artifacts::diff::toc_diff::Toc;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_MIN_SIZE, IndexEntry, Stage};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::HEADER_SIZE;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::BitError;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Index {
    path: Box<Path>,
    entries: BTreeMap<(PathBuf, Stage), IndexEntry>,
    /// Directory -> every path stored below it
    children: BTreeMap<PathBuf, BTreeSet<PathBuf>>,
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            children: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.children.clear();
        self.changed = false;
    }

    /// Reload the index from disk; a missing or empty file is an empty index.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.clear();

        if !self.path.exists() {
            return Ok(());
        }

        let mut index_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)?;

        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let header = IndexHeader::deserialize(std::io::Cursor::new(reader.read(HEADER_SIZE)?))?;
        header.validate()?;

        for _ in 0..header.entries_count {
            let mut entry_bytes = reader.read(ENTRY_MIN_SIZE)?.to_vec();
            while entry_bytes.last() != Some(&0) {
                entry_bytes.extend_from_slice(&reader.read(ENTRY_BLOCK)?);
            }

            let entry = IndexEntry::deserialize(std::io::Cursor::new(entry_bytes))?;
            self.store_entry(entry);
        }

        reader.verify()?;
        debug!(entries = self.entries.len(), "loaded index");

        Ok(())
    }

    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(lock);
        writer.write(&IndexHeader::with_entries(self.entries.len() as u32).serialize()?)?;
        for entry in self.entries.values() {
            writer.write(&entry.serialize()?)?;
        }
        writer.write_checksum()?;

        self.changed = false;
        debug!(entries = self.entries.len(), "flushed index");

        Ok(())
    }

    /// Stage `oid` at `path`, resolving any conflict recorded for it.
    pub fn add(&mut self, path: PathBuf, oid: ObjectId) {
        self.remove_path(&path);
        let entry = IndexEntry::new(path, oid);

        self.discard_conflicts(&entry);
        self.store_entry(entry);
        self.changed = true;
    }

    /// Record a conflicted path: the available sides at stages 1/2/3 and no stage 0.
    pub fn add_conflict(
        &mut self,
        path: PathBuf,
        base: Option<ObjectId>,
        receiver: Option<ObjectId>,
        giver: Option<ObjectId>,
    ) {
        self.remove_path(&path);

        let sides = [
            (Stage::Base, base),
            (Stage::Receiver, receiver),
            (Stage::Giver, giver),
        ];
        for (stage, oid) in sides {
            if let Some(oid) = oid {
                let entry = IndexEntry::staged(path.clone(), oid, stage);
                self.discard_conflicts(&entry);
                self.store_entry(entry);
            }
        }

        self.changed = true;
    }

    /// Drop every entry for `path` and below it. Conflicted paths need `force`.
    pub fn remove(&mut self, path: &Path, force: bool) -> anyhow::Result<()> {
        if !force {
            let conflicted = self
                .conflicted_paths()
                .into_iter()
                .filter(|conflicted| conflicted.starts_with(path))
                .collect::<Vec<_>>();
            if !conflicted.is_empty() {
                return Err(BitError::UnmergedPaths(conflicted).into());
            }
        }

        self.remove_path(path);
        self.remove_children(path);
        self.changed = true;

        Ok(())
    }

    /// Replace the whole content with a resolved snapshot.
    pub fn replace_with(&mut self, toc: &Toc) {
        self.entries.clear();
        self.children.clear();
        for (path, oid) in toc {
            self.store_entry(IndexEntry::new(path.clone(), oid.clone()));
        }
        self.changed = true;
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(&(path.to_path_buf(), Stage::Merged))
    }

    pub fn entry_at_stage(&self, path: &Path, stage: Stage) -> Option<&IndexEntry> {
        self.entries.get(&(path.to_path_buf(), stage))
    }

    /// Whether `path` is an entry (at any stage) or a directory holding entries.
    pub fn is_tracked(&self, path: &Path) -> bool {
        self.is_tracked_file(path) || self.children.contains_key(path)
    }

    pub fn is_tracked_file(&self, path: &Path) -> bool {
        self.entries
            .range((path.to_path_buf(), Stage::Merged)..=(path.to_path_buf(), Stage::Giver))
            .next()
            .is_some()
    }

    pub fn is_conflicted(&self) -> bool {
        self.entries.keys().any(|(_, stage)| stage.is_conflict())
    }

    pub fn conflicted_paths(&self) -> Vec<PathBuf> {
        self.entries
            .keys()
            .filter(|(_, stage)| stage.is_conflict())
            .map(|(path, _)| path.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every path with an entry at any stage.
    pub fn tracked_paths(&self) -> BTreeSet<PathBuf> {
        self.entries.keys().map(|(path, _)| path.clone()).collect()
    }

    /// Stage-0 entries as a snapshot.
    pub fn to_toc(&self) -> Toc {
        self.entries
            .values()
            .filter(|entry| entry.stage == Stage::Merged)
            .map(|entry| (entry.name.clone(), entry.oid.clone()))
            .collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    /// Tracked paths equal to or below `path`; `.` and the empty path select everything.
    pub fn entries_under_path(&self, path: &Path) -> Vec<PathBuf> {
        let everything = path == Path::new(".") || path.as_os_str().is_empty();

        self.tracked_paths()
            .into_iter()
            .filter(|tracked| everything || tracked.starts_with(path))
            .collect()
    }

    /// A file entry evicts entries standing for its parent directories and, when the
    /// path used to be a directory, everything below it.
    fn discard_conflicts(&mut self, entry: &IndexEntry) {
        for parent in entry.parent_dirs() {
            self.remove_path(parent);
        }
        self.remove_children(&entry.name);
    }

    fn store_entry(&mut self, entry: IndexEntry) {
        for parent in entry.parent_dirs() {
            self.children
                .entry(parent.to_path_buf())
                .or_default()
                .insert(entry.name.clone());
        }
        self.entries.insert(entry.key(), entry);
    }

    fn remove_children(&mut self, path: &Path) {
        if let Some(children) = self.children.remove(path) {
            for child in children {
                self.remove_path(&child);
            }
        }
    }

    /// Remove every stage of a single path.
    fn remove_path(&mut self, path: &Path) {
        let keys = self
            .entries
            .range((path.to_path_buf(), Stage::Merged)..=(path.to_path_buf(), Stage::Giver))
            .map(|(key, _)| key.clone())
            .collect::<Vec<_>>();

        for key in keys {
            if let Some(entry) = self.entries.remove(&key) {
                for parent in entry.parent_dirs() {
                    if let Some(children) = self.children.get_mut(parent) {
                        children.remove(path);
                        if children.is_empty() {
                            self.children.remove(parent);
                        }
                    }
                }
            }
        }
    }
}
