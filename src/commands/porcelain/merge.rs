use crate::areas::index::Index;
use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::conflict::Operation;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::diff::toc_diff::{self, Toc};
use crate::artifacts::merge::diff3::Labels;
use crate::artifacts::merge::resolution::{self, ConflictKind, PathConflict, Side};
use crate::artifacts::objects::commit::{Author, Commit};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::BitError;
use tracing::{debug, info};

/// How a merge request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    AlreadyUpToDate,
    FastForward,
    /// A merge commit was recorded
    Merged,
    /// Conflicts were staged and the merge awaits a concluding commit
    Conflicted,
}

/// Both sides of a merge and the names used for them in reports and markers
struct MergeSides<'m> {
    branch: BranchName,
    receiver: Option<ObjectId>,
    receiver_toc: Toc,
    giver: ObjectId,
    giver_toc: Toc,
    target: &'m str,
}

impl Repository {
    /// Merge the commit `target` names into the current branch.
    ///
    /// `message` overrides the default merge commit message.
    pub async fn merge(&mut self, target: &str, message: Option<&str>) -> anyhow::Result<MergeOutcome> {
        self.workspace()?;

        if self.marker().is_in_progress() {
            return Err(BitError::MergeInProgress("merge").into());
        }

        let Head::Attached(branch) = self.refs().head()? else {
            return Err(BitError::DetachedHead("merge").into());
        };
        let receiver = self.refs().read_branch(&branch)?;
        let giver = Revision::try_parse(target)?.resolve_commit(self)?;

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let conflicted = index.conflicted_paths();
        if !conflicted.is_empty() {
            return Err(BitError::ResolveIndexFirst(conflicted).into());
        }

        let finder = self.database().ancestor_finder();
        if let Some(receiver) = &receiver
            && finder.is_ancestor(&giver, receiver)?
        {
            writeln!(self.writer(), "Already up-to-date.")?;
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        let sides = MergeSides {
            receiver_toc: self.database().commit_toc_or_empty(receiver.as_ref())?,
            giver_toc: self.database().commit_toc(&giver)?,
            branch,
            receiver,
            giver,
            target,
        };

        Migration::between(self, &sides.receiver_toc, &sides.giver_toc, Operation::Merge)
            .check(&index)?;

        let base = match &sides.receiver {
            Some(receiver) if !finder.is_ancestor(receiver, &sides.giver)? => {
                Some(finder.best_common_ancestor(receiver, &sides.giver)?)
            }
            _ => None,
        };

        match base {
            None => self.fast_forward(&mut index, &sides),
            Some(base) => self.three_way_merge(&mut index, &sides, base, message),
        }
    }

    fn fast_forward(&self, index: &mut Index, sides: &MergeSides<'_>) -> anyhow::Result<MergeOutcome> {
        Migration::between(self, &sides.receiver_toc, &sides.giver_toc, Operation::Merge)
            .apply(index)?;
        index.write_updates()?;
        self.refs()
            .update_branch(&sides.branch, &sides.giver, self.database())?;

        if let Some(receiver) = &sides.receiver {
            writeln!(
                self.writer(),
                "Updating {}..{}",
                receiver.to_short_oid(),
                sides.giver.to_short_oid()
            )?;
        }
        writeln!(self.writer(), "Fast-forward")?;
        info!(branch = %sides.branch, to = %sides.giver, "fast-forwarded");

        Ok(MergeOutcome::FastForward)
    }

    fn three_way_merge(
        &self,
        index: &mut Index,
        sides: &MergeSides<'_>,
        base: Option<ObjectId>,
        message: Option<&str>,
    ) -> anyhow::Result<MergeOutcome> {
        let receiver = sides
            .receiver
            .clone()
            .ok_or_else(|| anyhow::anyhow!("three-way merge needs a receiver commit"))?;
        info!(
            base = %base.as_ref().map(ObjectId::to_short_oid).unwrap_or_default(),
            "merging with common ancestor"
        );

        let base_toc = self.database().commit_toc_or_empty(base.as_ref())?;
        let classified = toc_diff::diff_with_base(&sides.receiver_toc, &base_toc, &sides.giver_toc);
        let labels = Labels {
            receiver: sides.branch.as_ref(),
            giver: sides.target,
        };

        let resolution = resolution::resolve(
            &classified,
            labels,
            |oid| self.database().load_blob(oid),
            |content| self.database().write(content),
        )?;

        for path in &resolution.auto_merged {
            writeln!(self.writer(), "Auto-merging {}", path.display())?;
        }

        Migration::from_changes(
            self,
            &sides.receiver_toc,
            resolution.changes.clone(),
            Operation::Merge,
        )
        .apply(index)?;

        let workspace = self.workspace()?;
        for conflict in &resolution.conflicts {
            if let Some(content) = &conflict.content {
                workspace.write_file(&conflict.path, content)?;
            }
            index.add_conflict(
                conflict.path.clone(),
                conflict.base.clone(),
                conflict.receiver.clone(),
                conflict.giver.clone(),
            );
            writeln!(self.writer(), "{}", conflict_report(conflict, labels))?;
            debug!(path = %conflict.path.display(), kind = ?conflict.kind, "staged conflict");
        }

        index.write_updates()?;

        let message = match message {
            Some(message) => message.trim().to_string(),
            None => format!("Merge branch '{}' into {}", sides.target, sides.branch),
        };

        if !resolution.is_clean() {
            self.marker()
                .write(self.refs(), self.database(), &sides.giver, &format!("{message}\n"))?;
            writeln!(
                self.writer(),
                "Automatic merge failed. Fix conflicts and commit the result."
            )?;
            return Ok(MergeOutcome::Conflicted);
        }

        let tree_oid = self.database().write_tree(&index.to_toc())?;
        let commit = Commit::new(
            vec![receiver, sides.giver.clone()],
            tree_oid,
            Author::load_from_env(),
            format!("{message}\n"),
        );
        let commit_oid = self.database().store(&commit)?;
        self.refs()
            .update_branch(&sides.branch, &commit_oid, self.database())?;

        writeln!(self.writer(), "Merge made by the three-way strategy.")?;
        info!(commit = %commit_oid, "recorded merge commit");

        Ok(MergeOutcome::Merged)
    }

    /// Throw away an unconcluded merge: every path the merge could have touched goes back
    /// to its HEAD version in the index and the working copy.
    pub async fn merge_abort(&mut self) -> anyhow::Result<()> {
        let workspace = self.workspace()?;

        if !self.marker().is_in_progress() {
            return Err(BitError::NoMergeInProgress.into());
        }

        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let head = self.refs().read_head()?;
        let head_toc = self.database().commit_toc_or_empty(head.as_ref())?;
        let giver_toc = match self.marker().giver(self.refs())? {
            Some(giver) => self.database().commit_toc(&giver)?,
            None => Toc::new(),
        };

        let touched = toc_diff::changed_paths(&head_toc, &giver_toc)
            .into_iter()
            .chain(index.conflicted_paths());

        for path in touched {
            index.remove(&path, true)?;

            match head_toc.get(&path) {
                Some(oid) => {
                    let content = self.database().load_blob(oid)?;
                    workspace.write_file(&path, &content)?;
                    index.add(path, oid.clone());
                }
                None if workspace.is_file(&path) => workspace.delete_file(&path)?,
                None => {}
            }
        }

        index.write_updates()?;
        self.marker().clear(self.refs())?;
        info!("aborted merge");

        Ok(())
    }
}

fn conflict_report(conflict: &PathConflict, labels: Labels<'_>) -> String {
    let path = conflict.path.display();

    match conflict.kind {
        ConflictKind::Content => format!("CONFLICT (content): Merge conflict in {path}"),
        ConflictKind::AddAdd => format!("CONFLICT (add/add): Merge conflict in {path}"),
        ConflictKind::ModifyDelete { deleted_by } => {
            let (deleted, modified) = match deleted_by {
                Side::Giver => (labels.giver, labels.receiver),
                Side::Receiver => (labels.receiver, labels.giver),
            };
            format!(
                "CONFLICT (modify/delete): {path} deleted in {deleted} and modified in {modified}. \
                 Version {modified} of {path} left in tree."
            )
        }
    }
}
