use crate::areas::repository::Repository;

impl Repository {
    /// Drop paths from the index, then unlink them from the worktree.
    /// A file already gone from disk is not an error.
    pub fn rm(&self, paths: &[String]) -> anyhow::Result<()> {
        let mut index = self.index()?;

        for path in paths {
            index.remove(path);
        }
        index.write_updates()?;

        for path in paths {
            match std::fs::remove_file(self.worktree().join(path)) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }
}
