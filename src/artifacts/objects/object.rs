use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Result;
use bytes::Bytes;
use std::io::{BufRead, Cursor};
use std::path::PathBuf;

pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

/// Readers handed to `deserialize` are positioned right after the object header.
pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    fn object_id(&self) -> Result<ObjectId> {
        Ok(ObjectId::hash_of(&self.serialize()?))
    }

    fn object_path(&self) -> Result<PathBuf> {
        Ok(self.object_id()?.to_path())
    }
}

/// Prefix a payload with its `<type> <size>\0` header.
pub(crate) fn frame(object_type: ObjectType, payload: &[u8]) -> Bytes {
    let mut bytes = object_type.header(payload.len()).into_bytes();
    bytes.extend_from_slice(payload);
    Bytes::from(bytes)
}

#[derive(Debug, Clone)]
pub enum ObjectBox {
    Blob(Box<Blob>),
    Tree(Box<Tree>),
    Commit(Box<Commit>),
}

impl ObjectBox {
    /// Decode a full serialized object, header included.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let mut reader = Cursor::new(raw);
        let (object_type, _) = ObjectType::parse_header(&mut reader)?;

        Ok(match object_type {
            ObjectType::Blob => ObjectBox::Blob(Box::new(Blob::deserialize(reader)?)),
            ObjectType::Tree => ObjectBox::Tree(Box::new(Tree::deserialize(reader)?)),
            ObjectType::Commit => ObjectBox::Commit(Box::new(Commit::deserialize(reader)?)),
        })
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectBox::Blob(blob) => blob.object_type(),
            ObjectBox::Tree(tree) => tree.object_type(),
            ObjectBox::Commit(commit) => commit.object_type(),
        }
    }

    pub fn display(&self) -> String {
        match self {
            ObjectBox::Blob(blob) => blob.display(),
            ObjectBox::Tree(tree) => tree.display(),
            ObjectBox::Commit(commit) => commit.display(),
        }
    }

    /// Object ids this object points at directly.
    pub fn children(&self) -> Vec<ObjectId> {
        match self {
            ObjectBox::Blob(_) => Vec::new(),
            ObjectBox::Tree(tree) => tree.entries().map(|(_, entry)| entry.oid.clone()).collect(),
            ObjectBox::Commit(commit) => std::iter::once(commit.tree_oid().clone())
                .chain(commit.parents().iter().cloned())
                .collect(),
        }
    }
}
