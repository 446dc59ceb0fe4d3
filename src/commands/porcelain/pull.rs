use crate::areas::refs::FETCH_HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::commands::porcelain::merge::MergeOutcome;

impl Repository {
    /// Fetch `branch` from the repository at `remote_path`, then merge it.
    pub async fn pull(
        &mut self,
        remote_path: &str,
        branch: &str,
        name: &str,
    ) -> anyhow::Result<MergeOutcome> {
        self.fetch(remote_path, branch, name).await?;

        let message = format!("Merge branch '{}' of {}", branch, remote_path);
        self.merge(FETCH_HEAD_REF_NAME, Some(&message)).await
    }
}
