//! Object database
//!
//! Loose objects live at `objects/<2 hex>/<38 hex>`, zlib-compressed, each holding the full
//! `<type> <size>\0<payload>` serialization. The store is append-only: writing an object
//! that already exists is a no-op, and nothing is ever rewritten or deleted.
//!
//! Reading an id that is not stored yields `Ok(None)`; errors are reserved for I/O
//! failures and corrupt objects.

use crate::artifacts::diff::toc_diff::Toc;
use crate::artifacts::merge::common_ancestors::AncestorFinder;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{EntryKind, Tree, TreeEntry};
use crate::errors::BitError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        self.store_raw(object.serialize()?)
    }

    /// Store an already serialized object (header included) and return its id.
    pub fn store_raw(&self, raw: Bytes) -> anyhow::Result<ObjectId> {
        let oid = ObjectId::hash_of(&raw);
        let object_path = self.path.join(oid.to_path());

        if object_path.exists() {
            return Ok(oid);
        }

        let object_dir = object_path
            .parent()
            .with_context(|| format!("invalid object path {}", object_path.display()))?;
        std::fs::create_dir_all(object_dir)
            .with_context(|| format!("unable to create object directory {}", object_dir.display()))?;

        self.write_object(&object_path, &raw)?;
        debug!(oid = %oid, kind = %Self::type_of(&raw)?, "stored object");

        Ok(oid)
    }

    /// Store `content` as a blob.
    pub fn write(&self, content: &[u8]) -> anyhow::Result<ObjectId> {
        self.store(&Blob::new(Bytes::copy_from_slice(content)))
    }

    pub fn exists(&self, oid: &ObjectId) -> bool {
        self.path.join(oid.to_path()).is_file()
    }

    /// Full serialized form of an object, header included.
    pub fn read(&self, oid: &ObjectId) -> anyhow::Result<Option<Bytes>> {
        let object_path = self.path.join(oid.to_path());
        if !object_path.is_file() {
            return Ok(None);
        }

        let compressed = std::fs::read(&object_path)
            .with_context(|| format!("unable to read object file {}", object_path.display()))?;

        Ok(Some(Self::decompress(&compressed)?))
    }

    /// Kind of a serialized object, read from its header.
    pub fn type_of(raw: &[u8]) -> anyhow::Result<ObjectType> {
        let (object_type, _) = ObjectType::parse_header(&mut Cursor::new(raw))?;
        Ok(object_type)
    }

    /// Tree referenced by a serialized commit.
    pub fn tree_oid_of_commit(raw: &[u8]) -> anyhow::Result<ObjectId> {
        match ObjectBox::parse(raw)? {
            ObjectBox::Commit(commit) => Ok(commit.tree_oid().clone()),
            other => anyhow::bail!("expected a commit object, got a {}", other.object_type()),
        }
    }

    pub fn object_type(&self, oid: &ObjectId) -> anyhow::Result<Option<ObjectType>> {
        self.read(oid)?.map(|raw| Self::type_of(&raw)).transpose()
    }

    pub fn parse_object(&self, oid: &ObjectId) -> anyhow::Result<Option<ObjectBox>> {
        self.read(oid)?
            .map(|raw| ObjectBox::parse(&raw).with_context(|| format!("corrupt object {oid}")))
            .transpose()
    }

    pub fn parse_object_as_blob(&self, oid: &ObjectId) -> anyhow::Result<Option<Blob>> {
        match self.parse_object(oid)? {
            Some(ObjectBox::Blob(blob)) => Ok(Some(*blob)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_tree(&self, oid: &ObjectId) -> anyhow::Result<Option<Tree>> {
        match self.parse_object(oid)? {
            Some(ObjectBox::Tree(tree)) => Ok(Some(*tree)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, oid: &ObjectId) -> anyhow::Result<Option<Commit>> {
        match self.parse_object(oid)? {
            Some(ObjectBox::Commit(commit)) => Ok(Some(*commit)),
            _ => Ok(None),
        }
    }

    /// Load a commit that must exist, for callers holding an already validated id.
    pub fn load_commit(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        match self.parse_object(oid)? {
            Some(ObjectBox::Commit(commit)) => Ok(*commit),
            Some(other) => Err(BitError::NotACommit {
                oid: oid.clone(),
                actual: other.object_type(),
            }
            .into()),
            None => Err(BitError::ObjectNotFound(oid.clone()).into()),
        }
    }

    pub fn load_blob(&self, oid: &ObjectId) -> anyhow::Result<Bytes> {
        self.parse_object_as_blob(oid)?
            .map(Blob::into_content)
            .ok_or_else(|| BitError::ObjectNotFound(oid.clone()).into())
    }

    pub fn ancestor_finder(
        &self,
    ) -> AncestorFinder<impl Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>> + '_> {
        AncestorFinder::new(move |oid: &ObjectId| Ok(self.load_commit(oid)?.parents().to_vec()))
    }

    /// Flatten a tree into `path -> blob id`.
    pub fn tree_toc(&self, tree_oid: &ObjectId) -> anyhow::Result<Toc> {
        let mut toc = Toc::new();
        self.collect_tree(tree_oid, PathBuf::new(), &mut toc)?;
        Ok(toc)
    }

    pub fn commit_toc(&self, commit_oid: &ObjectId) -> anyhow::Result<Toc> {
        self.tree_toc(self.load_commit(commit_oid)?.tree_oid())
    }

    /// TOC of an optional commit; an unborn branch has an empty snapshot.
    pub fn commit_toc_or_empty(&self, commit_oid: Option<&ObjectId>) -> anyhow::Result<Toc> {
        commit_oid
            .map(|oid| self.commit_toc(oid))
            .unwrap_or_else(|| Ok(Toc::new()))
    }

    fn collect_tree(&self, tree_oid: &ObjectId, prefix: PathBuf, toc: &mut Toc) -> anyhow::Result<()> {
        let tree = self
            .parse_object_as_tree(tree_oid)?
            .ok_or_else(|| BitError::ObjectNotFound(tree_oid.clone()))?;

        for (name, entry) in tree.entries() {
            let path = prefix.join(name);
            match entry.kind {
                EntryKind::Tree => self.collect_tree(&entry.oid, path, toc)?,
                EntryKind::Blob => {
                    toc.insert(path, entry.oid.clone());
                }
            }
        }

        Ok(())
    }

    /// Store every directory level of `toc` bottom-up and return the root tree id.
    pub fn write_tree(&self, toc: &Toc) -> anyhow::Result<ObjectId> {
        let mut trees: BTreeMap<PathBuf, Tree> = BTreeMap::from([(PathBuf::new(), Tree::default())]);

        for (path, oid) in toc {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let name = Self::file_name(path)?;

            for ancestor in dir.ancestors() {
                trees.entry(ancestor.to_path_buf()).or_default();
            }
            trees
                .entry(dir)
                .or_default()
                .insert(name, TreeEntry::new(EntryKind::Blob, oid.clone()));
        }

        let mut dirs = trees.keys().cloned().collect::<Vec<_>>();
        dirs.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));

        let mut root_oid = None;
        for dir in dirs {
            let tree = trees
                .remove(&dir)
                .with_context(|| format!("missing tree for {}", dir.display()))?;
            let oid = self.store(&tree)?;

            match dir.parent() {
                Some(parent) => {
                    let name = Self::file_name(&dir)?;
                    trees
                        .entry(parent.to_path_buf())
                        .or_default()
                        .insert(name, TreeEntry::new(EntryKind::Tree, oid));
                }
                None => root_oid = Some(oid),
            }
        }

        root_oid.context("toc produced no root tree")
    }

    fn file_name(path: &Path) -> anyhow::Result<&str> {
        path.file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("invalid path {}", path.display()))
    }

    /// Every object reachable from `commit_oid`: commits, trees and blobs.
    pub fn reachable_objects(&self, commit_oid: &ObjectId) -> anyhow::Result<BTreeSet<ObjectId>> {
        let mut reachable = BTreeSet::new();
        let mut pending = vec![commit_oid.clone()];

        while let Some(oid) = pending.pop() {
            if !reachable.insert(oid.clone()) {
                continue;
            }
            let object = self
                .parse_object(&oid)?
                .ok_or_else(|| BitError::ObjectNotFound(oid.clone()))?;
            pending.extend(object.children().into_iter().filter(|child| !reachable.contains(child)));
        }

        Ok(reachable)
    }

    /// All stored ids starting with `prefix`.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let mut matches = Vec::new();

        let dirs = if prefix.len() >= 2 {
            vec![prefix[..2].to_string()]
        } else {
            (0..=255u8).map(|i| format!("{i:02x}")).collect()
        };

        for dir_name in dirs {
            let dir_path = self.path.join(&dir_name);
            if !dir_path.is_dir() {
                continue;
            }

            for entry in std::fs::read_dir(&dir_path)? {
                let full_oid = format!("{}{}", dir_name, entry?.file_name().to_string_lossy());
                if full_oid.starts_with(prefix)
                    && let Ok(oid) = ObjectId::try_parse(full_oid)
                {
                    matches.push(oid);
                }
            }
        }

        matches.sort();
        Ok(matches)
    }

    fn write_object(&self, object_path: &Path, raw: &[u8]) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .with_context(|| format!("invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let compressed = Self::compress(raw)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .with_context(|| format!("unable to open object file {}", temp_object_path.display()))?;
        file.write_all(&compressed)
            .with_context(|| format!("unable to write object file {}", temp_object_path.display()))?;

        // readers only ever see complete objects
        std::fs::rename(&temp_object_path, object_path)
            .with_context(|| format!("unable to rename object file to {}", object_path.display()))
    }

    fn compress(data: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(data)
            .context("unable to compress object content")?;

        encoder
            .finish()
            .context("unable to finish compressing object content")
    }

    fn decompress(data: &[u8]) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .context("unable to decompress object content")?;

        Ok(decompressed.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}
