//! Index entries
//!
//! Each entry binds a `(path, stage)` pair to a blob id. Stat data is not used for change
//! detection (working files are hashed), so those fields are written as zeros and every
//! entry carries the regular-file mode.

use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use std::cmp::min;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Largest path length representable in the entry flags
const MAX_PATH_SIZE: usize = 0x0fff;

pub const ENTRY_BLOCK: usize = 8;

pub const ENTRY_MIN_SIZE: usize = 64;

/// Size of everything before the path: ten 32-bit stat words, the id and the flags
const ENTRY_FIXED_SIZE: usize = 62;

const REGULAR_FILE_MODE: u32 = 0o100644;

const STAGE_SHIFT: u16 = 12;
const STAGE_MASK: u16 = 0x3000;

/// Merge stage of an index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Resolved content
    Merged = 0,
    /// Common ancestor version of a conflicted path
    Base = 1,
    /// Receiver ("ours") version of a conflicted path
    Receiver = 2,
    /// Giver ("theirs") version of a conflicted path
    Giver = 3,
}

impl Stage {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    pub fn is_conflict(&self) -> bool {
        *self != Stage::Merged
    }

    pub fn conflict_stages() -> [Stage; 3] {
        [Stage::Base, Stage::Receiver, Stage::Giver]
    }
}

impl TryFrom<u16> for Stage {
    type Error = anyhow::Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Stage::Merged),
            1 => Ok(Stage::Base),
            2 => Ok(Stage::Receiver),
            3 => Ok(Stage::Giver),
            other => Err(anyhow::anyhow!("invalid index stage {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: PathBuf,
    pub oid: ObjectId,
    pub stage: Stage,
}

impl IndexEntry {
    pub fn new(name: PathBuf, oid: ObjectId) -> Self {
        Self::staged(name, oid, Stage::Merged)
    }

    pub fn staged(name: PathBuf, oid: ObjectId, stage: Stage) -> Self {
        IndexEntry { name, oid, stage }
    }

    pub fn key(&self) -> (PathBuf, Stage) {
        (self.name.clone(), self.stage)
    }

    /// Every proper ancestor directory of the entry, outermost first.
    pub fn parent_dirs(&self) -> Vec<&Path> {
        let mut dirs = self
            .name
            .ancestors()
            .skip(1)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect::<Vec<_>>();
        dirs.reverse();
        dirs
    }

    fn flags(&self, name_len: usize) -> u16 {
        (self.stage.as_u16() << STAGE_SHIFT) | min(name_len, MAX_PATH_SIZE) as u16
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let entry_name = self
            .name
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("invalid entry name {:?}", self.name))?;

        let mut entry_bytes = Vec::with_capacity(ENTRY_MIN_SIZE + entry_name.len());
        // ctime, ctime_nsec, mtime, mtime_nsec, dev, ino
        for _ in 0..6 {
            entry_bytes.write_u32::<byteorder::NetworkEndian>(0)?;
        }
        entry_bytes.write_u32::<byteorder::NetworkEndian>(REGULAR_FILE_MODE)?;
        // uid, gid, size
        for _ in 0..3 {
            entry_bytes.write_u32::<byteorder::NetworkEndian>(0)?;
        }
        self.oid.write_h40_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(self.flags(entry_name.len()))?;
        entry_bytes.write_all(entry_name.as_bytes())?;

        // at least one NUL terminates the path
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(anyhow::anyhow!("invalid index entry size"));
        }

        let mut oid_bytes = std::io::Cursor::new(&bytes[40..60]);
        let oid = ObjectId::read_h40_from(&mut oid_bytes)?;
        let flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]);
        let stage = Stage::try_from((flags & STAGE_MASK) >> STAGE_SHIFT)?;

        let name_end = bytes[ENTRY_FIXED_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| anyhow::anyhow!("missing null terminator in entry name"))?;
        let name = std::str::from_utf8(&bytes[ENTRY_FIXED_SIZE..ENTRY_FIXED_SIZE + name_end])
            .map_err(|_| anyhow::anyhow!("invalid UTF-8 in entry name"))?;

        Ok(IndexEntry::staged(PathBuf::from(name), oid, stage))
    }
}
