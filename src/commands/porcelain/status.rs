use crate::areas::index::Index;
use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::diff::toc_diff::FileStatus;
use crate::artifacts::index::index_entry::Stage;
use crate::artifacts::status::local_changes::LocalChanges;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

impl Repository {
    /// Report local changes, either in the long sectioned form or as `XY path` lines.
    pub async fn status(&mut self, porcelain: bool) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        let changes = LocalChanges::inspect(self, &index)?;

        if porcelain {
            self.print_porcelain(&changes, &index)
        } else {
            self.print_long(&changes, &index)
        }
    }

    fn print_porcelain(&self, changes: &LocalChanges, index: &Index) -> anyhow::Result<()> {
        let mut lines = BTreeMap::<PathBuf, (char, char)>::new();

        for path in &changes.conflicted {
            let (code, _) = conflict_shape(index, path);
            lines.insert(path.clone(), code);
        }
        for (path, status) in &changes.staged {
            lines.entry(path.clone()).or_insert((' ', ' ')).0 = status.letter();
        }
        for (path, status) in &changes.unstaged {
            lines.entry(path.clone()).or_insert((' ', ' ')).1 = status.letter();
        }

        for (path, (staged, unstaged)) in lines {
            writeln!(self.writer(), "{}{} {}", staged, unstaged, path.display())?;
        }
        for path in &changes.untracked {
            writeln!(self.writer(), "?? {}", self.untracked_display(path)?)?;
        }

        Ok(())
    }

    fn print_long(&self, changes: &LocalChanges, index: &Index) -> anyhow::Result<()> {
        match self.refs().head()? {
            Head::Attached(branch) => writeln!(self.writer(), "On branch {}", branch)?,
            Head::Detached(oid) => {
                writeln!(self.writer(), "HEAD detached at {}", oid.to_short_oid())?
            }
        }

        if self.marker().is_in_progress() {
            if changes.conflicted.is_empty() {
                writeln!(self.writer(), "All conflicts fixed but you are still merging.")?;
            } else {
                writeln!(self.writer(), "You have unmerged paths.")?;
            }
        }

        if !changes.conflicted.is_empty() {
            writeln!(self.writer(), "\nUnmerged paths:")?;
            for path in &changes.conflicted {
                writeln!(
                    self.writer(),
                    "\t{:<17}{}",
                    conflict_shape(index, path).1,
                    path.display()
                )?;
            }
        }

        self.print_section("Changes to be committed:", &changes.staged)?;
        self.print_section("Changes not staged for commit:", &changes.unstaged)?;

        if !changes.untracked.is_empty() {
            writeln!(self.writer(), "\nUntracked files:")?;
            for path in &changes.untracked {
                writeln!(self.writer(), "\t{}", self.untracked_display(path)?)?;
            }
        }

        if changes.is_clean() {
            writeln!(self.writer(), "nothing to commit, working tree clean")?;
        }

        Ok(())
    }

    fn print_section(
        &self,
        title: &str,
        entries: &BTreeMap<PathBuf, FileStatus>,
    ) -> anyhow::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }

        writeln!(self.writer(), "\n{}", title)?;
        for (path, status) in entries {
            let label = match status {
                FileStatus::Added => "new file:",
                FileStatus::Deleted => "deleted:",
                _ => "modified:",
            };
            writeln!(self.writer(), "\t{:<12}{}", label, path.display())?;
        }

        Ok(())
    }

    fn untracked_display(&self, path: &Path) -> anyhow::Result<String> {
        let suffix = if self.workspace()?.is_directory(path) { "/" } else { "" };
        Ok(format!("{}{}", path.display(), suffix))
    }
}

/// Short `XY` code and long-format label of a conflicted path, from its staged sides.
fn conflict_shape(index: &Index, path: &Path) -> ((char, char), &'static str) {
    let has = |stage| index.entry_at_stage(path, stage).is_some();

    match (has(Stage::Base), has(Stage::Receiver), has(Stage::Giver)) {
        (true, true, true) => (('U', 'U'), "both modified:"),
        (false, true, true) => (('A', 'A'), "both added:"),
        (true, true, false) => (('U', 'D'), "deleted by them:"),
        (true, false, true) => (('D', 'U'), "deleted by us:"),
        (false, true, false) => (('A', 'U'), "added by us:"),
        (false, false, true) => (('U', 'A'), "added by them:"),
        _ => (('D', 'D'), "both deleted:"),
    }
}
