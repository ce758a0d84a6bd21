use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::tree::Tree;
use crate::artifacts::revision;
use crate::errors::GitError;
use anyhow::Context;
use std::path::Path;

impl Repository {
    /// Materialise a committish's tree into `target`, which must not
    /// exist yet or be an empty directory.
    pub fn checkout(&self, name: &str, target: &Path) -> anyhow::Result<()> {
        let oid = revision::find_object(self, name, None, true)?;

        let tree = match self.database().load(&oid)? {
            ObjectBox::Commit(commit) => self.database().load_tree(&commit.tree_oid()?)?,
            ObjectBox::Tree(tree) => *tree,
            other => {
                anyhow::bail!("object {} is a {}, not a tree or commit", oid, other.object_type())
            }
        };

        if target.exists() {
            if !target.is_dir() {
                anyhow::bail!("not a directory: {}", target.display());
            }
            if target.read_dir()?.next().is_some() {
                return Err(GitError::NotEmpty(target.to_path_buf()).into());
            }
        } else {
            std::fs::create_dir_all(target)
                .with_context(|| format!("unable to create {}", target.display()))?;
        }

        self.checkout_tree(&tree, target)
    }

    fn checkout_tree(&self, tree: &Tree, target: &Path) -> anyhow::Result<()> {
        for leaf in tree.leaves() {
            let dest = target.join(&leaf.name);

            match self.database().load(&leaf.oid)? {
                ObjectBox::Tree(subtree) => {
                    std::fs::create_dir(&dest)
                        .with_context(|| format!("unable to create {}", dest.display()))?;
                    self.checkout_tree(&subtree, &dest)?;
                }
                ObjectBox::Blob(blob) => {
                    std::fs::write(&dest, blob.content())
                        .with_context(|| format!("unable to write {}", dest.display()))?;
                }
                other => anyhow::bail!(
                    "tree leaf {} points at a {}, refusing to materialise it",
                    leaf.name,
                    other.object_type()
                ),
            }
        }

        Ok(())
    }
}
