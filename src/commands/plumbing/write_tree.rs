use crate::areas::repository::Repository;

impl Repository {
    pub async fn write_tree(&mut self) -> anyhow::Result<()> {
        let index = self.index();
        let mut index = index.lock().await;
        index.rehydrate()?;

        if index.is_conflicted() {
            anyhow::bail!("cannot write a tree while the index has unmerged entries");
        }

        let tree_oid = self.database().write_tree(&index.to_toc())?;
        writeln!(self.writer(), "{}", tree_oid)?;

        Ok(())
    }
}
