use crate::areas::repository::Repository;
use crate::artifacts::objects::object::Object;
use std::path::Path;

impl Repository {
    pub async fn hash_object(&mut self, file: &str, write: bool) -> anyhow::Result<()> {
        let path = self.relative_path(Path::new(file))?;
        let blob = self.workspace()?.parse_blob(&path)?;

        let oid = if write {
            self.database().store(&blob)?
        } else {
            blob.object_id()?
        };

        writeln!(self.writer(), "{}", oid)?;

        Ok(())
    }
}
