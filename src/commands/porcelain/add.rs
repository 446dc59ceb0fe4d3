use crate::areas::repository::Repository;
use crate::errors::BitError;
use std::path::Path;

impl Repository {
    pub async fn add(&mut self, paths: &[String]) -> anyhow::Result<()> {
        let workspace = self.workspace()?;
        let index = self.index();
        let mut index = index.lock().await;

        index.rehydrate()?;

        for path in paths {
            let relative = self.relative_path(Path::new(path))?;
            let files = workspace.list_files(&relative)?;
            let tracked = index.entries_under_path(&relative);

            if files.is_empty() && tracked.is_empty() {
                return Err(BitError::PathspecNoMatch(path.clone()).into());
            }

            for file in files {
                let blob = workspace.parse_blob(&file)?;
                let oid = self.database().store(&blob)?;
                index.add(file, oid);
            }

            // tracked files that vanished from disk are unstaged
            for gone in tracked.iter().filter(|tracked| !workspace.is_file(tracked)) {
                index.remove(gone, true)?;
            }
        }

        index.write_updates()?;

        Ok(())
    }
}
