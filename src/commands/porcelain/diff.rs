use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::diff::patch;
use crate::artifacts::diff::toc_diff::{self, DiffFilter, FileStatus, Toc};
use crate::artifacts::objects::object_id::ObjectId;
use bytes::Bytes;
use colored::Colorize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const NULL_OID: &str = "0000000";
const NULL_PATH: &str = "/dev/null";
const FILE_MODE: &str = "100644";

/// Where the content behind a TOC's ids can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Database,
    Workspace,
}

struct Snapshot {
    toc: Toc,
    source: Source,
}

impl Repository {
    /// Compare two snapshots chosen by the number of revisions:
    /// none, index against working copy; one, that commit against the working copy; two,
    /// the first commit against the second.
    pub async fn diff(
        &mut self,
        revisions: &[String],
        name_status: bool,
        filter: Option<DiffFilter>,
    ) -> anyhow::Result<()> {
        let (a, b) = match revisions {
            [] => {
                let index = self.index();
                let mut index = index.lock().await;
                index.rehydrate()?;

                let staged = index.to_toc();
                let on_disk = self.workspace()?.toc_of(staged.keys())?;
                (self.database_snapshot(staged), self.workspace_snapshot(on_disk))
            }
            [revision] => {
                let index = self.index();
                let mut index = index.lock().await;
                index.rehydrate()?;

                let committed = self.commit_snapshot(revision)?;
                let tracked = index
                    .tracked_paths()
                    .into_iter()
                    .chain(committed.toc.keys().cloned())
                    .collect::<BTreeSet<_>>();
                let on_disk = self.workspace()?.toc_of(tracked.iter())?;
                (committed, self.workspace_snapshot(on_disk))
            }
            [from, to] => (self.commit_snapshot(from)?, self.commit_snapshot(to)?),
            _ => anyhow::bail!("diff takes at most two revisions"),
        };

        let changes = toc_diff::name_status(&toc_diff::diff(&a.toc, &b.toc))
            .into_iter()
            .filter(|(_, status)| filter.is_none_or(|filter| status.matches_filter(filter)));

        for (path, status) in changes {
            if name_status {
                writeln!(self.writer(), "{}\t{}", status.letter(), path.display())?;
            } else {
                self.print_patch(&path, status, &a, &b)?;
            }
        }

        Ok(())
    }

    fn database_snapshot(&self, toc: Toc) -> Snapshot {
        Snapshot {
            toc,
            source: Source::Database,
        }
    }

    fn workspace_snapshot(&self, toc: Toc) -> Snapshot {
        Snapshot {
            toc,
            source: Source::Workspace,
        }
    }

    fn commit_snapshot(&self, revision: &str) -> anyhow::Result<Snapshot> {
        let oid = Revision::try_parse(revision)?.resolve_commit(self)?;
        Ok(self.database_snapshot(self.database().commit_toc(&oid)?))
    }

    fn load_content(&self, path: &Path, snapshot: &Snapshot) -> anyhow::Result<Bytes> {
        match (snapshot.toc.get(path), snapshot.source) {
            (None, _) => Ok(Bytes::new()),
            (Some(oid), Source::Database) => self.database().load_blob(oid),
            (Some(_), Source::Workspace) => self.workspace()?.read_file(path),
        }
    }

    fn print_patch(
        &self,
        path: &Path,
        status: FileStatus,
        a: &Snapshot,
        b: &Snapshot,
    ) -> anyhow::Result<()> {
        let a_path = PathBuf::from("a").join(path);
        let b_path = PathBuf::from("b").join(path);
        let short = |oid: Option<&ObjectId>| {
            oid.map(ObjectId::to_short_oid)
                .unwrap_or_else(|| NULL_OID.to_string())
        };

        let header = format!("diff --git {} {}", a_path.display(), b_path.display());
        writeln!(self.writer(), "{}", header.bold())?;

        let mut index_line = format!(
            "index {}..{}",
            short(a.toc.get(path)),
            short(b.toc.get(path))
        );
        match status {
            FileStatus::Added => {
                writeln!(self.writer(), "{}", format!("new file mode {FILE_MODE}").bold())?
            }
            FileStatus::Deleted => {
                writeln!(self.writer(), "{}", format!("deleted file mode {FILE_MODE}").bold())?
            }
            _ => index_line.push_str(&format!(" {FILE_MODE}")),
        }
        writeln!(self.writer(), "{}", index_line.bold())?;

        let a_label = match status {
            FileStatus::Added => NULL_PATH.to_string(),
            _ => a_path.display().to_string(),
        };
        let b_label = match status {
            FileStatus::Deleted => NULL_PATH.to_string(),
            _ => b_path.display().to_string(),
        };
        writeln!(self.writer(), "{}", format!("--- {a_label}").bold())?;
        writeln!(self.writer(), "{}", format!("+++ {b_label}").bold())?;

        let a_content = self.load_content(path, a)?;
        let b_content = self.load_content(path, b)?;
        for hunk in patch::hunks(&a_content, &b_content) {
            writeln!(self.writer(), "{}", hunk.header().cyan())?;

            for edit in hunk.edits() {
                let line = edit.to_string();
                let line = match edit {
                    patch::Edit::Delete { .. } => line.red(),
                    patch::Edit::Insert { .. } => line.green(),
                    patch::Edit::Equal { .. } => line.normal(),
                };
                writeln!(self.writer(), "{}", line)?;
            }
        }

        Ok(())
    }
}
