use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::revision::Revision;

impl Repository {
    /// List local branches, marking the checked-out one.
    pub async fn list_branches(&mut self) -> anyhow::Result<()> {
        let head = self.refs().head()?;

        if let Head::Detached(oid) = &head {
            writeln!(self.writer(), "* (HEAD detached at {})", oid.to_short_oid())?;
        }

        for branch in self.refs().list_branches()? {
            let marker = match &head {
                Head::Attached(current) if *current == branch => "*",
                _ => " ",
            };
            writeln!(self.writer(), "{} {}", marker, branch)?;
        }

        Ok(())
    }

    pub async fn create_branch(
        &mut self,
        branch_name: &str,
        start_point: Option<&str>,
    ) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name)?;

        let start_oid = match start_point {
            Some(start_point) => Revision::try_parse(start_point)?.resolve_commit(self)?,
            None => self
                .refs()
                .read_head()?
                .ok_or_else(|| anyhow::anyhow!("no current HEAD to branch from"))?,
        };

        self.refs()
            .create_branch(&branch_name, &start_oid, self.database())?;

        Ok(())
    }

    pub async fn delete_branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name)?;
        let oid = self.refs().delete_branch(&branch_name)?;

        writeln!(
            self.writer(),
            "Deleted branch {} (was {}).",
            branch_name,
            oid.to_short_oid()
        )?;

        Ok(())
    }
}
