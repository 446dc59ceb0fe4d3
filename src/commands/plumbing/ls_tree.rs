use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::BitError;
use std::path::Path;

impl Repository {
    /// List a tree, or the tree of a commit. `recursive` descends into subtrees and lists
    /// only blobs, with full paths.
    pub async fn ls_tree(&mut self, tree_ish: &str, recursive: bool) -> anyhow::Result<()> {
        let oid = Revision::try_parse(tree_ish)?.resolve_object(self)?;

        let tree_oid = match self.database().parse_object(&oid)? {
            Some(ObjectBox::Commit(commit)) => commit.tree_oid().clone(),
            Some(ObjectBox::Tree(_)) => oid,
            Some(ObjectBox::Blob(_)) => anyhow::bail!("not a tree object: {}", oid),
            None => return Err(BitError::ObjectNotFound(oid).into()),
        };

        self.list_tree(&tree_oid, Path::new(""), recursive)
    }

    fn list_tree(&self, tree_oid: &ObjectId, prefix: &Path, recursive: bool) -> anyhow::Result<()> {
        let tree = self
            .database()
            .parse_object_as_tree(tree_oid)?
            .ok_or_else(|| BitError::ObjectNotFound(tree_oid.clone()))?;

        for (name, entry) in tree.entries() {
            let path = prefix.join(name);

            if recursive && entry.is_tree() {
                self.list_tree(&entry.oid, &path, recursive)?;
            } else {
                writeln!(
                    self.writer(),
                    "{:0>6} {} {}\t{}",
                    entry.kind.mode(),
                    entry.kind.object_type(),
                    entry.oid,
                    path.display()
                )?;
            }
        }

        Ok(())
    }
}
