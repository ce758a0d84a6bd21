use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::{revision, tree_builder};
use crate::errors::GitError;
use std::io::Write;

impl Repository {
    /// Record the staged tree as a commit and advance the active branch.
    ///
    /// Publication order: trees first, then the commit object, then the
    /// reference update, so a reader following the ref always finds the
    /// full closure.
    pub fn commit(&self, message: &str) -> anyhow::Result<()> {
        let index = self.index()?;
        let entries: Vec<_> = index.entries().cloned().collect();
        let tree_oid = tree_builder::build_tree(self.database(), &entries)?;

        let parents = match revision::find_object(self, "HEAD", Some(ObjectType::Commit), true) {
            Ok(parent) => vec![parent],
            Err(err) if GitError::is_not_found(&err) => Vec::new(), // initial commit
            Err(err) => return Err(err),
        };
        let is_root = if parents.is_empty() {
            "(root-commit) "
        } else {
            ""
        };

        let (name, email) = self.identity()?;
        let now = chrono::Local::now().fixed_offset();
        let identity_line = format!(
            "{} <{}> {} {}",
            name,
            email,
            now.timestamp(),
            now.format("%z")
        );

        let message = format!("{}\n", message.trim());

        let commit = Commit::new(&tree_oid, &parents, identity_line, message);
        let commit_oid = self.database().store(&commit)?;
        self.refs().update_head(&commit_oid)?;

        writeln!(
            self.writer(),
            "[{}{}] {}",
            is_root,
            commit_oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
