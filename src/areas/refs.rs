//! References
//!
//! Branches are files under `refs/heads/` holding a commit id. `HEAD` is either symbolic
//! (`ref: refs/heads/<branch>`) or detached (a commit id). Remote-tracking refs live under
//! `refs/remotes/<remote>/`, and `FETCH_HEAD` / `MERGE_HEAD` sit next to `HEAD`.
//!
//! Every update is validated (the target must be a stored commit and the ref must belong
//! to a known namespace), then written to `<ref>.lock` under an exclusive lock and renamed
//! over the ref, so readers never see a half-written value.

use crate::areas::database::Database;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::BitError;
use anyhow::Context;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const SYMREF_REGEX: &str = r"^ref: (.+)$";

pub const HEAD_REF_NAME: &str = "HEAD";
pub const FETCH_HEAD_REF_NAME: &str = "FETCH_HEAD";
pub const MERGE_HEAD_REF_NAME: &str = "MERGE_HEAD";
pub const HEADS_PREFIX: &str = "refs/heads/";
pub const REMOTES_PREFIX: &str = "refs/remotes/";

const SPECIAL_REFS: [&str; 3] = [HEAD_REF_NAME, FETCH_HEAD_REF_NAME, MERGE_HEAD_REF_NAME];

/// What `HEAD` points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// Symbolic: the branch may not exist yet (unborn)
    Attached(BranchName),
    Detached(ObjectId),
}

#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn read(path: &Path) -> anyhow::Result<Option<SymRefOrOid>> {
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read ref file at {:?}", path))?;
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }

        if let Some(caps) = regex::Regex::new(SYMREF_REGEX)?.captures(content) {
            return Ok(Some(SymRefOrOid::SymRef(caps[1].to_string())));
        }

        // FETCH_HEAD-style files carry extra text after the id
        let oid = content
            .split_whitespace()
            .next()
            .with_context(|| format!("empty ref file at {:?}", path))?;
        Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(oid.to_string())?)))
    }
}

#[derive(Debug)]
pub struct Refs {
    /// The git directory (`.git`, or the repository itself when bare)
    path: Box<Path>,
}

impl Refs {
    pub fn new(path: Box<Path>) -> Self {
        Refs { path }
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    pub fn heads_path(&self) -> PathBuf {
        self.path.join(HEADS_PREFIX)
    }

    pub fn head(&self) -> anyhow::Result<Head> {
        match SymRefOrOid::read(&self.head_path())? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Head::Detached(oid)),
            Some(SymRefOrOid::SymRef(target)) => {
                let name = target.strip_prefix(HEADS_PREFIX).unwrap_or(&target);
                Ok(Head::Attached(BranchName::try_parse(name)?))
            }
            None => anyhow::bail!("HEAD is missing or empty"),
        }
    }

    pub fn read_head(&self) -> anyhow::Result<Option<ObjectId>> {
        self.read_symref(&self.head_path())
    }

    /// The checked-out branch, or `None` when `HEAD` is detached.
    pub fn current_branch_name(&self) -> anyhow::Result<Option<BranchName>> {
        Ok(match self.head()? {
            Head::Attached(branch) => Some(branch),
            Head::Detached(_) => None,
        })
    }

    pub fn is_detached(&self) -> anyhow::Result<bool> {
        Ok(matches!(self.head()?, Head::Detached(_)))
    }

    pub fn read_branch(&self, branch: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        self.read_symref(&self.heads_path().join(branch.as_ref()))
    }

    /// Resolve a ref name, trying it as given (only for `HEAD`-like names and qualified
    /// `refs/...` names), then under `refs/`, `refs/heads/` and `refs/remotes/`.
    pub fn read_ref(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        let as_given = SPECIAL_REFS.contains(&name) || name.starts_with("refs/");
        let candidates = [
            as_given.then(|| self.path.join(name)),
            Some(self.refs_path().join(name)),
            Some(self.heads_path().join(name)),
            Some(self.path.join(REMOTES_PREFIX).join(name)),
        ];

        match candidates.iter().flatten().find(|path| path.is_file()) {
            Some(path) => self.read_symref(path),
            None => Ok(None),
        }
    }

    fn read_symref(&self, path: &Path) -> anyhow::Result<Option<ObjectId>> {
        match SymRefOrOid::read(path)? {
            Some(SymRefOrOid::SymRef(target)) => self.read_symref(&self.path.join(target)),
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            None => Ok(None),
        }
    }

    /// Point a qualified ref (`HEAD`, `refs/heads/*`, `refs/remotes/*`, `FETCH_HEAD`,
    /// `MERGE_HEAD`) at a commit. A symbolic `HEAD` moves its branch.
    pub fn update_ref(&self, name: &str, oid: &ObjectId, database: &Database) -> anyhow::Result<()> {
        Self::validate_namespace(name)?;
        Self::validate_commit(oid, database)?;

        let path = self.path.join(name);
        let target = match SymRefOrOid::read(&path)? {
            Some(SymRefOrOid::SymRef(target)) if name == HEAD_REF_NAME => self.path.join(target),
            _ => path,
        };

        self.write_ref_file(&target, oid.as_ref())?;
        debug!(name, oid = %oid, "updated ref");

        Ok(())
    }

    /// Move whatever `HEAD` designates: its branch when attached, `HEAD` itself otherwise.
    pub fn update_head(&self, oid: &ObjectId, database: &Database) -> anyhow::Result<()> {
        self.update_ref(HEAD_REF_NAME, oid, database)
    }

    pub fn update_branch(
        &self,
        branch: &BranchName,
        oid: &ObjectId,
        database: &Database,
    ) -> anyhow::Result<()> {
        self.update_ref(&format!("{HEADS_PREFIX}{branch}"), oid, database)
    }

    pub fn set_head_attached(&self, branch: &BranchName) -> anyhow::Result<()> {
        self.write_ref_file(&self.head_path(), &format!("ref: {HEADS_PREFIX}{branch}"))
    }

    pub fn set_head_detached(&self, oid: &ObjectId, database: &Database) -> anyhow::Result<()> {
        Self::validate_commit(oid, database)?;
        self.write_ref_file(&self.head_path(), oid.as_ref())
    }

    pub fn create_branch(
        &self,
        branch: &BranchName,
        oid: &ObjectId,
        database: &Database,
    ) -> anyhow::Result<()> {
        if self.heads_path().join(branch.as_ref()).exists() {
            return Err(BitError::BranchExists(branch.to_string()).into());
        }

        self.update_branch(branch, oid, database)
    }

    pub fn delete_branch(&self, branch: &BranchName) -> anyhow::Result<ObjectId> {
        if self.current_branch_name()?.as_ref() == Some(branch) {
            return Err(BitError::CannotDeleteCurrentBranch(branch.to_string()).into());
        }

        let path = self.heads_path().join(branch.as_ref());
        let oid = self
            .read_symref(&path)?
            .ok_or_else(|| BitError::BranchNotFound(branch.to_string()))?;

        std::fs::remove_file(&path)
            .with_context(|| format!("failed to delete branch file at {:?}", path))?;
        self.prune_empty_parent_dirs(&path, &self.heads_path())?;
        debug!(branch = %branch, "deleted branch");

        Ok(oid)
    }

    pub fn delete_ref(&self, name: &str) -> anyhow::Result<()> {
        let path = self.path.join(name);
        if path.is_file() {
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to delete ref file at {:?}", path))?;
        }

        Ok(())
    }

    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        self.list_refs_under(&self.heads_path())
    }

    /// Remote-tracking branches as `<remote>/<branch>`.
    pub fn list_remote_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        self.list_refs_under(&self.path.join(REMOTES_PREFIX))
    }

    fn list_refs_under(&self, root: &Path) -> anyhow::Result<Vec<BranchName>> {
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| entry.path().extension().is_none_or(|ext| ext != "lock"))
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(root).ok()?;
                Some(relative.to_string_lossy().to_string())
            })
            .map(BranchName::try_parse)
            .collect()
    }

    fn validate_namespace(name: &str) -> anyhow::Result<()> {
        let qualified = SPECIAL_REFS.contains(&name)
            || [HEADS_PREFIX, REMOTES_PREFIX]
                .iter()
                .any(|prefix| name.strip_prefix(prefix).is_some_and(|rest| !rest.is_empty()));

        if qualified {
            BranchName::try_parse(name).map(|_| ())
        } else {
            Err(BitError::InvalidRefName(name.to_string()).into())
        }
    }

    fn validate_commit(oid: &ObjectId, database: &Database) -> anyhow::Result<()> {
        match database.object_type(oid)? {
            Some(ObjectType::Commit) => Ok(()),
            Some(actual) => Err(BitError::NotACommit {
                oid: oid.clone(),
                actual,
            }
            .into()),
            None => Err(BitError::ObjectNotFound(oid.clone()).into()),
        }
    }

    fn write_ref_file(&self, path: &Path, content: &str) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .with_context(|| format!("invalid ref path {:?}", path))?;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent directories for {:?}", path))?;

        let mut lock_path = path.as_os_str().to_owned();
        lock_path.push(".lock");
        let lock_path = PathBuf::from(lock_path);

        let mut lock_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .with_context(|| format!("failed to open lock file at {:?}", lock_path))?;
        {
            let mut lock = file_guard::lock(&mut lock_file, Lock::Exclusive, 0, 1)?;
            writeln!(lock.deref_mut(), "{content}")?;
        }

        std::fs::rename(&lock_path, path)
            .with_context(|| format!("failed to move {:?} into place", lock_path))
    }

    fn prune_empty_parent_dirs(&self, path: &Path, stop_at: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != stop_at
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("failed to remove empty ref directory at {:?}", parent))?;
            self.prune_empty_parent_dirs(parent, stop_at)?;
        }

        Ok(())
    }
}
