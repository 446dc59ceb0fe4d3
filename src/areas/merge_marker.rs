//! Merge-in-progress state
//!
//! An unconcluded merge leaves `MERGE_HEAD` (the giver commit) and `MERGE_MSG` (the
//! pending commit message) in the git directory. The next commit concludes the merge and
//! `merge --abort` discards it; both remove the two files.

use crate::areas::database::Database;
use crate::areas::refs::{MERGE_HEAD_REF_NAME, Refs};
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::debug;

const MERGE_MSG_FILE: &str = "MERGE_MSG";

#[derive(Debug)]
pub struct MergeMarker {
    git_dir: Box<Path>,
}

impl MergeMarker {
    pub fn new(git_dir: Box<Path>) -> Self {
        MergeMarker { git_dir }
    }

    fn message_path(&self) -> PathBuf {
        self.git_dir.join(MERGE_MSG_FILE)
    }

    pub fn is_in_progress(&self) -> bool {
        self.git_dir.join(MERGE_HEAD_REF_NAME).is_file()
    }

    pub fn write(
        &self,
        refs: &Refs,
        database: &Database,
        giver: &ObjectId,
        message: &str,
    ) -> anyhow::Result<()> {
        refs.update_ref(MERGE_HEAD_REF_NAME, giver, database)?;
        std::fs::write(self.message_path(), message)
            .with_context(|| format!("failed to write {MERGE_MSG_FILE}"))?;
        debug!(giver = %giver, "recorded merge in progress");

        Ok(())
    }

    pub fn giver(&self, refs: &Refs) -> anyhow::Result<Option<ObjectId>> {
        refs.read_ref(MERGE_HEAD_REF_NAME)
    }

    pub fn message(&self) -> anyhow::Result<Option<String>> {
        let path = self.message_path();
        if !path.is_file() {
            return Ok(None);
        }

        std::fs::read_to_string(&path)
            .map(Some)
            .with_context(|| format!("failed to read {MERGE_MSG_FILE}"))
    }

    pub fn clear(&self, refs: &Refs) -> anyhow::Result<()> {
        refs.delete_ref(MERGE_HEAD_REF_NAME)?;

        let path = self.message_path();
        if path.is_file() {
            std::fs::remove_file(&path).with_context(|| format!("failed to remove {MERGE_MSG_FILE}"))?;
        }
        debug!("cleared merge state");

        Ok(())
    }
}
