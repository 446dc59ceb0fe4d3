use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::errors::BitError;

impl Repository {
    pub async fn cat_file(&mut self, object: &str) -> anyhow::Result<()> {
        let oid = Revision::try_parse(object)?.resolve_object(self)?;
        let object = self
            .database()
            .parse_object(&oid)?
            .ok_or(BitError::ObjectNotFound(oid))?;

        write!(self.writer(), "{}", object.display())?;

        Ok(())
    }
}
