//! Commit object
//!
//! ## Format
//!
//! ```text
//! commit <size>\0
//! tree <tree-sha>
//! parent <parent-sha>          (zero, one or two lines)
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <commit message>
//! ```
//!
//! A merge commit lists the receiving side first and the merged-in side second.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, frame};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset};
use std::io::{BufRead, Read};

const AUTHOR_NAME_VAR: &str = "GIT_AUTHOR_NAME";
const AUTHOR_EMAIL_VAR: &str = "GIT_AUTHOR_EMAIL";
const AUTHOR_DATE_VAR: &str = "GIT_AUTHOR_DATE";

/// Identity line shared by authors and committers
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<FixedOffset>,
}

impl Author {
    pub fn new(name: String, email: String, timestamp: DateTime<FixedOffset>) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Identity from `GIT_AUTHOR_*`.
    ///
    /// Missing name or email fall back to the login user; a missing or unparsable date
    /// falls back to now. Dates are accepted as RFC 2822 or `%Y-%m-%d %H:%M:%S %z`.
    pub fn load_from_env() -> Self {
        let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
        let name = std::env::var(AUTHOR_NAME_VAR).unwrap_or_else(|_| user.clone());
        let email =
            std::env::var(AUTHOR_EMAIL_VAR).unwrap_or_else(|_| format!("{user}@localhost"));

        let timestamp = std::env::var(AUTHOR_DATE_VAR)
            .ok()
            .and_then(|date| {
                DateTime::parse_from_rfc2822(&date)
                    .or_else(|_| DateTime::parse_from_str(&date, "%Y-%m-%d %H:%M:%S %z"))
                    .ok()
            })
            .unwrap_or_else(|| chrono::Local::now().fixed_offset());

        Author::new(name, email, timestamp)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// `Name <email> <unix seconds> <+hhmm>`
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut parts = value.rsplitn(3, ' ');
        let timezone = parts.next().context("missing author timezone")?;
        let seconds = parts
            .next()
            .context("missing author timestamp")?
            .parse::<i64>()
            .context("invalid author timestamp")?;
        let identity = parts.next().context("missing author identity")?;

        let email_start = identity.find('<').context("missing '<' in author")?;
        let email_end = identity.rfind('>').context("missing '>' in author")?;
        if email_end < email_start {
            anyhow::bail!("malformed author email");
        }

        let offset = DateTime::parse_from_str(&format!("1970-01-01 00:00:00 {timezone}"), "%Y-%m-%d %H:%M:%S %z")
            .context("invalid author timezone")?
            .offset()
            .to_owned();
        let timestamp = DateTime::from_timestamp(seconds, 0)
            .context("author timestamp out of range")?
            .with_timezone(&offset);

        Ok(Author {
            name: identity[..email_start].trim().to_string(),
            email: identity[email_start + 1..email_end].to_string(),
            timestamp,
        })
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parents: Vec<ObjectId>,
    tree_oid: ObjectId,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    /// The author doubles as committer.
    pub fn new(parents: Vec<ObjectId>, tree_oid: ObjectId, author: Author, message: String) -> Self {
        Commit {
            parents,
            tree_oid,
            committer: author.clone(),
            author,
            message,
        }
    }

    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.author.timestamp()
    }

    fn payload(&self) -> String {
        let mut lines = vec![format!("tree {}", self.tree_oid)];
        lines.extend(self.parents.iter().map(|parent| format!("parent {parent}")));
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.clone());

        lines.join("\n")
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        Ok(frame(self.object_type(), self.payload().as_bytes()))
    }
}

impl Unpackable for Commit {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let (headers, message) = content
            .split_once("\n\n")
            .context("Invalid commit object: missing message separator")?;

        let mut tree_oid = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        for line in headers.lines() {
            let (key, value) = line
                .split_once(' ')
                .with_context(|| format!("Invalid commit header line '{line}'"))?;

            match key {
                "tree" => tree_oid = Some(ObjectId::try_parse(value.to_string())?),
                "parent" => parents.push(ObjectId::try_parse(value.to_string())?),
                "author" => author = Some(Author::try_from(value)?),
                "committer" => committer = Some(Author::try_from(value)?),
                _ => {}
            }
        }

        let author = author.context("Invalid commit object: missing author line")?;

        Ok(Commit {
            parents,
            tree_oid: tree_oid.context("Invalid commit object: missing tree line")?,
            committer: committer.unwrap_or_else(|| author.clone()),
            author,
            message: message.to_string(),
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.payload()
    }
}
