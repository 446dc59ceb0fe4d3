use crate::areas::refs::{FETCH_HEAD_REF_NAME, REMOTES_PREFIX};
use crate::areas::remote::{LocalRemote, RemoteStore, transfer_objects};
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::BitError;
use std::path::Path;

pub const DEFAULT_REMOTE_NAME: &str = "origin";

impl Repository {
    /// Copy `branch` from the repository at `remote_path`, recording it as
    /// `refs/remotes/<name>/<branch>` and `FETCH_HEAD`.
    pub async fn fetch(&mut self, remote_path: &str, branch: &str, name: &str) -> anyhow::Result<ObjectId> {
        let remote = LocalRemote::open(Path::new(remote_path))?;
        let branch = BranchName::try_parse(branch)?;

        let tip = remote
            .list_branches()?
            .remove(&branch)
            .ok_or_else(|| BitError::RemoteRefNotFound(branch.to_string()))?;

        transfer_objects(
            &tip,
            |oid| remote.read_object(oid),
            |oid| self.database().exists(oid),
            |raw| self.database().store_raw(raw),
        )?;

        let tracking_name = BranchName::try_parse(format!("{name}/{branch}"))?;
        let tracking_ref = format!("{REMOTES_PREFIX}{tracking_name}");
        let previous = self.refs().read_ref(&tracking_ref)?;

        self.refs().update_ref(&tracking_ref, &tip, self.database())?;
        self.refs()
            .update_ref(FETCH_HEAD_REF_NAME, &tip, self.database())?;

        writeln!(self.writer(), "From {}", remote_path)?;
        writeln!(self.writer(), " * branch            {} -> {}", branch, FETCH_HEAD_REF_NAME)?;
        match previous {
            None => writeln!(
                self.writer(),
                " * [new branch]      {} -> {}",
                branch,
                tracking_name
            )?,
            Some(previous) if previous != tip => writeln!(
                self.writer(),
                "   {}..{}  {} -> {}",
                previous.to_short_oid(),
                tip.to_short_oid(),
                branch,
                tracking_name
            )?,
            Some(_) => {}
        }

        Ok(tip)
    }
}
