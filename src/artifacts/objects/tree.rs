//! Tree object
//!
//! A tree is one directory level: a name-ordered list of `(kind, oid, name)` entries.
//! Nested directories are separate tree objects referenced by id, so a snapshot is an
//! arena of hashed nodes rather than an owned recursive structure.
//!
//! ## Format
//!
//! On disk: `tree <size>\0<entries>`
//! Each entry: `<octal mode> <name>\0<20-byte-sha1>`
//!
//! Entries are kept in a map keyed by name, with a trailing `/` appended to subtree names.
//! That makes the map's natural order the canonical one: `a.txt` sorts before the `a`
//! directory, exactly as if the directory were spelled `a/`.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Blob,
    Tree,
}

impl EntryKind {
    pub fn mode(&self) -> &'static str {
        match self {
            EntryKind::Blob => "100644",
            EntryKind::Tree => "40000",
        }
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            EntryKind::Blob => ObjectType::Blob,
            EntryKind::Tree => ObjectType::Tree,
        }
    }

    /// Executable and symlink modes are read as plain blobs.
    pub fn from_octal_str(mode: &str) -> anyhow::Result<Self> {
        match mode {
            "40000" | "040000" => Ok(EntryKind::Tree),
            "100644" | "100755" | "120000" => Ok(EntryKind::Blob),
            other => Err(anyhow::anyhow!("unsupported tree entry mode {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub kind: EntryKind,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.kind == EntryKind::Tree
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    pub fn insert(&mut self, name: &str, entry: TreeEntry) {
        let key = match entry.kind {
            EntryKind::Tree => format!("{name}/"),
            EntryKind::Blob => name.to_string(),
        };
        self.entries.insert(key, entry);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in canonical order, names without the directory suffix.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &TreeEntry)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.trim_end_matches('/'), entry))
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut payload = Vec::new();

        for (name, entry) in self.entries() {
            write!(payload, "{} {}", entry.kind.mode(), name)?;
            payload.push(0);
            entry.oid.write_h40_to(&mut payload)?;
        }

        Ok(frame(self.object_type(), &payload))
    }
}

impl Unpackable for Tree {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut tree = Tree::default();

        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            if reader.read_until(b' ', &mut mode_bytes)? == 0 {
                break;
            }
            if mode_bytes.pop() != Some(b' ') {
                anyhow::bail!("unexpected EOF in mode");
            }
            let kind = EntryKind::from_octal_str(std::str::from_utf8(&mode_bytes)?)?;

            name_bytes.clear();
            reader.read_until(b'\0', &mut name_bytes)?;
            if name_bytes.pop() != Some(b'\0') {
                anyhow::bail!("unexpected EOF in name");
            }
            let name = std::str::from_utf8(&name_bytes)?;

            let oid =
                ObjectId::read_h40_from(&mut reader).context("unexpected EOF in object id")?;

            tree.insert(name, TreeEntry::new(kind, oid));
        }

        Ok(tree)
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }

    fn display(&self) -> String {
        self.entries()
            .map(|(name, entry)| {
                format!(
                    "{:0>6} {} {}\t{}",
                    entry.kind.mode(),
                    entry.kind.object_type(),
                    entry.oid,
                    name
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }
}
