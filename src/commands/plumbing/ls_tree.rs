use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// List a tree's records; with `recursive`, descend into subtrees
    /// instead of printing them.
    pub fn ls_tree(&self, treeish: &str, recursive: bool) -> anyhow::Result<()> {
        self.ls_tree_at(treeish, recursive, Path::new(""))
    }

    fn ls_tree_at(&self, treeish: &str, recursive: bool, prefix: &Path) -> anyhow::Result<()> {
        let oid = revision::find_object(self, treeish, Some(ObjectType::Tree), true)?;
        let tree = self.database().load_tree(&oid)?;

        for leaf in tree.leaves() {
            let target_type = leaf.target_type()?;
            let full_path = prefix.join(&leaf.name);

            if recursive && leaf.is_subtree() {
                self.ls_tree_at(leaf.oid.as_ref(), recursive, &full_path)?;
            } else {
                writeln!(
                    self.writer(),
                    "{} {} {}\t{}",
                    leaf.mode,
                    target_type,
                    leaf.oid,
                    full_path.display()
                )?;
            }
        }

        Ok(())
    }
}
