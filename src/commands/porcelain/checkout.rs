use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::conflict::Operation;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::BitError;

const DETACHMENT_NOTICE: &str = r#"
You are in 'detached HEAD' state. You can look around, make experimental
changes and commit them, and you can discard any commits you make in this
state without impacting any branches by performing another checkout.

If you want to create a new branch to retain commits you create, you may
do so (now or later) by using the branch command. Example:

    twig branch <new-branch-name>
"#;

impl Repository {
    pub async fn checkout(&mut self, target: &str) -> anyhow::Result<()> {
        self.workspace()?;

        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        let conflicted = index.conflicted_paths();
        if !conflicted.is_empty() {
            return Err(BitError::ResolveIndexFirst(conflicted).into());
        }
        if self.marker().is_in_progress() {
            return Err(BitError::MergeInProgress("switch branches").into());
        }

        let current_head = self.refs().head()?;
        let current_oid = self.refs().read_head()?;

        let target_oid = Revision::try_parse(target)?.resolve_commit(self)?;
        let target_branch = self.branch_named(target)?;

        let from = self.database().commit_toc_or_empty(current_oid.as_ref())?;
        let to = self.database().commit_toc(&target_oid)?;

        let migration = Migration::between(self, &from, &to, Operation::Checkout);
        migration.check(&index)?;
        migration.apply(&mut index)?;
        index.write_updates()?;

        let new_head = match target_branch {
            Some(branch) => {
                self.refs().set_head_attached(&branch)?;
                Head::Attached(branch)
            }
            None => {
                self.refs().set_head_detached(&target_oid, self.database())?;
                Head::Detached(target_oid.clone())
            }
        };

        self.print_previous_head(&current_head, &target_oid)?;
        self.print_detachment_notice(&current_head, &new_head, target)?;
        self.print_new_head(&current_head, &new_head, &target_oid)?;

        Ok(())
    }

    /// The local branch `name` designates, if it is a plain existing branch name.
    fn branch_named(&self, name: &str) -> anyhow::Result<Option<BranchName>> {
        let Ok(branch) = BranchName::try_parse(name) else {
            return Ok(None);
        };

        Ok(self.refs().read_branch(&branch)?.map(|_| branch))
    }

    fn print_previous_head(&self, current_head: &Head, target_oid: &ObjectId) -> anyhow::Result<()> {
        if let Head::Detached(current_oid) = current_head
            && current_oid != target_oid
        {
            self.print_head_position("Previous HEAD position was", current_oid)?;
        }

        Ok(())
    }

    fn print_detachment_notice(
        &self,
        current_head: &Head,
        new_head: &Head,
        target: &str,
    ) -> anyhow::Result<()> {
        if matches!(current_head, Head::Attached(_)) && matches!(new_head, Head::Detached(_)) {
            writeln!(self.writer(), "Note: checking out '{}'.\n{}", target, DETACHMENT_NOTICE)?;
        }

        Ok(())
    }

    fn print_new_head(
        &self,
        current_head: &Head,
        new_head: &Head,
        target_oid: &ObjectId,
    ) -> anyhow::Result<()> {
        match new_head {
            Head::Detached(_) => self.print_head_position("HEAD is now at", target_oid)?,
            Head::Attached(branch) if new_head == current_head => {
                writeln!(self.writer(), "Already on '{}'", branch)?
            }
            Head::Attached(branch) => writeln!(self.writer(), "Switched to branch '{}'", branch)?,
        }

        Ok(())
    }

    fn print_head_position(&self, message: &str, oid: &ObjectId) -> anyhow::Result<()> {
        let commit = self.database().load_commit(oid)?;

        writeln!(
            self.writer(),
            "{} {} {}",
            message,
            oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
