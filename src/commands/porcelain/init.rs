use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use anyhow::Context;
use std::fs;

impl Repository {
    pub async fn init(&mut self) -> anyhow::Result<()> {
        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create refs/heads directory")?;

        // re-running init keeps the current HEAD
        if !self.refs().head_path().is_file() {
            self.refs()
                .set_head_attached(&BranchName::default_branch())
                .context("Failed to create initial HEAD reference")?;
        }

        let kind = if self.is_bare() { "bare " } else { "" };

        writeln!(
            self.writer(),
            "Initialized empty {}Git repository in {}",
            kind,
            self.git_dir().display()
        )?;

        Ok(())
    }
}
