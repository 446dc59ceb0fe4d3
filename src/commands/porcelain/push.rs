use crate::areas::refs::REMOTES_PREFIX;
use crate::areas::remote::{LocalRemote, RemoteStore, transfer_objects};
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::BitError;
use std::path::Path;
use tracing::info;

impl Repository {
    /// Send `branch` to the repository at `remote_path`.
    ///
    /// The remote branch only moves forward unless `force` is set, and a branch checked out
    /// in a non-bare remote is never updated.
    pub async fn push(
        &mut self,
        remote_path: &str,
        branch: &str,
        force: bool,
        name: &str,
    ) -> anyhow::Result<()> {
        let remote = LocalRemote::open(Path::new(remote_path))?;
        let branch = BranchName::try_parse(branch)?;

        let local = self
            .refs()
            .read_branch(&branch)?
            .ok_or_else(|| BitError::BranchNotFound(branch.to_string()))?;
        let remote_tip = remote.list_branches()?.remove(&branch);

        if remote_tip.as_ref() == Some(&local) {
            writeln!(self.writer(), "Everything up-to-date")?;
            return Ok(());
        }

        if remote.checked_out_branch()?.as_ref() == Some(&branch) {
            return Err(BitError::RemoteBranchCheckedOut(branch.to_string()).into());
        }

        let fast_forward = match &remote_tip {
            Some(remote_tip) => {
                self.database().exists(remote_tip)
                    && self
                        .database()
                        .ancestor_finder()
                        .is_ancestor(remote_tip, &local)?
            }
            None => true,
        };
        if !fast_forward && !force {
            return Err(BitError::NonFastForward(branch.to_string()).into());
        }

        let written = transfer_objects(
            &local,
            |oid| self.database().read(oid),
            |oid| remote.has_object(oid),
            |raw| remote.write_object(raw),
        )?;
        remote.update_branch(&branch, &local)?;

        let tracking_ref = format!("{REMOTES_PREFIX}{name}/{branch}");
        self.refs().update_ref(&tracking_ref, &local, self.database())?;
        info!(branch = %branch, objects = written, "pushed");

        writeln!(self.writer(), "To {}", remote_path)?;
        match remote_tip {
            None => writeln!(self.writer(), " * [new branch]      {} -> {}", branch, branch)?,
            Some(remote_tip) if fast_forward => writeln!(
                self.writer(),
                "   {}..{}  {} -> {}",
                remote_tip.to_short_oid(),
                local.to_short_oid(),
                branch,
                branch
            )?,
            Some(remote_tip) => writeln!(
                self.writer(),
                " + {}...{} {} -> {} (forced update)",
                remote_tip.to_short_oid(),
                local.to_short_oid(),
                branch,
                branch
            )?,
        }

        Ok(())
    }
}
