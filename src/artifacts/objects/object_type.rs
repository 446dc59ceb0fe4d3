use anyhow::Context;
use std::io::BufRead;
use std::str::FromStr;

/// Discriminator written at the front of every serialized object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
        }
    }

    /// Consume the `<type> <size>\0` header, leaving the reader at the payload.
    pub fn parse_header(reader: &mut impl BufRead) -> anyhow::Result<(ObjectType, usize)> {
        let mut kind = Vec::new();
        reader.read_until(b' ', &mut kind)?;
        if kind.pop() != Some(b' ') {
            anyhow::bail!("truncated object header");
        }

        let mut size = Vec::new();
        reader.read_until(b'\0', &mut size)?;
        if size.pop() != Some(b'\0') {
            anyhow::bail!("truncated object header");
        }

        let kind = std::str::from_utf8(&kind)?.parse::<ObjectType>()?;
        let size = std::str::from_utf8(&size)?
            .parse::<usize>()
            .context("invalid object size")?;

        Ok((kind, size))
    }

    pub fn header(&self, payload_len: usize) -> String {
        format!("{} {}\0", self.as_str(), payload_len)
    }
}

impl FromStr for ObjectType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            other => Err(anyhow::anyhow!("invalid object type '{other}'")),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
