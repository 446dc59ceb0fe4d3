use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{ANCESTOR_REGEX, PARENT_REGEX, REF_ALIASES};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::{MIN_ABBREVIATED_LENGTH, OBJECT_ID_LENGTH};
use crate::errors::BitError;
use anyhow::Context;

/// A revision expression naming a commit (or any object, for plumbing commands).
///
/// - names: `master`, `feature/x`, `origin/master`, `HEAD`, `FETCH_HEAD`, `MERGE_HEAD`
/// - `@` as an alias of `HEAD`
/// - full or abbreviated object ids (at least 4 hex digits)
/// - `<rev>^`: first parent
/// - `<rev>~<n>`: n-th first-parent ancestor
///
/// Object-id-looking names parse as `Ref` and are tried as ids during resolution:
/// a literal full id wins, then refs, then abbreviated ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Ref(BranchName),
    Parent(Box<Revision>),
    Ancestor(Box<Revision>, usize),
}

impl Revision {
    pub fn try_parse(revision: &str) -> anyhow::Result<Revision> {
        let parent = regex::Regex::new(PARENT_REGEX)
            .with_context(|| format!("invalid parent regex: {PARENT_REGEX}"))?;
        let ancestor = regex::Regex::new(ANCESTOR_REGEX)
            .with_context(|| format!("invalid ancestor regex: {ANCESTOR_REGEX}"))?;

        if let Some(caps) = parent.captures(revision) {
            Ok(Revision::Parent(Box::new(Self::try_parse(&caps[1])?)))
        } else if let Some(caps) = ancestor.captures(revision) {
            let generations = caps[2]
                .parse::<usize>()
                .with_context(|| format!("failed to parse generations in revision: {revision}"))?;

            Ok(Revision::Ancestor(
                Box::new(Self::try_parse(&caps[1])?),
                generations,
            ))
        } else {
            let name = *REF_ALIASES.get(revision).unwrap_or(&revision);
            Ok(Revision::Ref(BranchName::try_parse(name)?))
        }
    }

    /// Resolve to a commit id, failing with `NotACommit` for other object kinds.
    pub fn resolve_commit(&self, repository: &Repository) -> anyhow::Result<ObjectId> {
        let oid = self.resolve_object(repository)?;

        match repository.database().object_type(&oid)? {
            Some(ObjectType::Commit) => Ok(oid),
            Some(actual) => Err(BitError::NotACommit { oid, actual }.into()),
            None => Err(BitError::ObjectNotFound(oid).into()),
        }
    }

    /// Resolve to an object id of any kind.
    pub fn resolve_object(&self, repository: &Repository) -> anyhow::Result<ObjectId> {
        match self {
            Revision::Ref(name) => Self::resolve_name(name.as_ref(), repository)?
                .ok_or_else(|| anyhow::Error::from(BitError::UnknownRevision(self.to_string()))),
            Revision::Parent(base) => {
                let base_oid = base.resolve_commit(repository)?;
                Self::first_parent(&base_oid, repository)?
                    .ok_or_else(|| anyhow::Error::from(BitError::UnknownRevision(self.to_string())))
            }
            Revision::Ancestor(base, generations) => {
                let mut oid = base.resolve_commit(repository)?;
                for _ in 0..*generations {
                    oid = Self::first_parent(&oid, repository)?
                        .ok_or_else(|| BitError::UnknownRevision(self.to_string()))?;
                }

                Ok(oid)
            }
        }
    }

    fn resolve_name(name: &str, repository: &Repository) -> anyhow::Result<Option<ObjectId>> {
        if name.len() == OBJECT_ID_LENGTH && Self::is_hex(name) {
            let oid = ObjectId::try_parse(name.to_string())?;
            if repository.database().exists(&oid) {
                return Ok(Some(oid));
            }
        }

        if let Some(oid) = repository.refs().read_ref(name)? {
            return Ok(Some(oid));
        }

        if name.len() >= MIN_ABBREVIATED_LENGTH && name.len() < OBJECT_ID_LENGTH && Self::is_hex(name)
        {
            return Self::resolve_abbreviated(name, repository);
        }

        Ok(None)
    }

    fn resolve_abbreviated(
        prefix: &str,
        repository: &Repository,
    ) -> anyhow::Result<Option<ObjectId>> {
        let database = repository.database();
        let matches = database.find_objects_by_prefix(&prefix.to_ascii_lowercase())?;

        if matches.len() <= 1 {
            return Ok(matches.into_iter().next());
        }

        let commits = matches
            .iter()
            .filter(|oid| matches!(database.object_type(oid), Ok(Some(ObjectType::Commit))))
            .collect::<Vec<_>>();

        if let [only] = commits.as_slice() {
            return Ok(Some((*only).clone()));
        }

        let mut message = format!("short SHA1 {prefix} is ambiguous\nhint: The candidates are:");
        for oid in &matches {
            let kind = database
                .object_type(oid)?
                .map(|kind| kind.to_string())
                .unwrap_or_default();
            message.push_str(&format!("\nhint:   {} {}", oid.to_short_oid(), kind));
        }
        anyhow::bail!(message)
    }

    fn first_parent(oid: &ObjectId, repository: &Repository) -> anyhow::Result<Option<ObjectId>> {
        let commit = repository
            .database()
            .parse_object_as_commit(oid)?
            .ok_or_else(|| BitError::ObjectNotFound(oid.clone()))?;

        Ok(commit.parent().cloned())
    }

    fn is_hex(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Ref(name) => write!(f, "{name}"),
            Revision::Parent(base) => write!(f, "{base}^"),
            Revision::Ancestor(base, generations) => write!(f, "{base}~{generations}"),
        }
    }
}
