use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::{Author, Commit};
use crate::errors::BitError;
use tracing::info;

impl Repository {
    /// Record the index as a new commit on top of HEAD.
    ///
    /// While a merge is pending the commit gets `MERGE_HEAD` as its second parent, falls
    /// back to the prepared merge message and concludes the merge.
    pub async fn commit(&mut self, message: Option<&str>) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        let conflicted = index.conflicted_paths();
        if !conflicted.is_empty() {
            return Err(BitError::UnmergedPaths(conflicted).into());
        }

        let head = self.refs().read_head()?;
        let merge_giver = if self.marker().is_in_progress() {
            self.marker().giver(self.refs())?
        } else {
            None
        };

        let message = match message.map(str::trim).filter(|m| !m.is_empty()) {
            Some(message) => message.to_string(),
            None if merge_giver.is_some() => self
                .marker()
                .message()?
                .map(|pending| pending.trim().to_string())
                .unwrap_or_default(),
            None => return Err(BitError::EmptyCommitMessage.into()),
        };
        if message.is_empty() {
            return Err(BitError::EmptyCommitMessage.into());
        }

        let toc = index.to_toc();
        let tree_oid = self.database().write_tree(&toc)?;

        if merge_giver.is_none() {
            let unchanged = match &head {
                Some(head) => self.database().load_commit(head)?.tree_oid() == &tree_oid,
                None => toc.is_empty(),
            };
            if unchanged {
                return Err(BitError::NothingToCommit.into());
            }
        }

        let parents = head.iter().chain(merge_giver.iter()).cloned().collect();
        let commit = Commit::new(
            parents,
            tree_oid,
            Author::load_from_env(),
            format!("{message}\n"),
        );
        let commit_oid = self.database().store(&commit)?;
        self.refs().update_head(&commit_oid, self.database())?;

        if merge_giver.is_some() {
            self.marker().clear(self.refs())?;
            info!(commit = %commit_oid, "concluded merge");
        }

        let branch = match self.refs().current_branch_name()? {
            Some(branch) => branch.to_string(),
            None => "detached HEAD".to_string(),
        };
        let root = if head.is_none() { " (root-commit)" } else { "" };

        writeln!(
            self.writer(),
            "[{}{} {}] {}",
            branch,
            root,
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
