use crate::areas::database::Database;
use crate::areas::repository::Repository;
use crate::artifacts::ignore::Ignore;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::revision;
use crate::errors::GitError;
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;

impl Repository {
    /// Three read-only diffs: HEAD vs index, index vs worktree, and the
    /// untracked remainder. Nothing is written, so two runs over an
    /// unchanged tree print identical output.
    pub fn status(&self) -> anyhow::Result<()> {
        let index = self.index()?;

        let (branch, detached) = self.refs().active_branch()?;
        if detached {
            writeln!(self.writer(), "HEAD detached at {branch}")?;
        } else {
            writeln!(self.writer(), "On branch {branch}")?;
        }

        // HEAD tree; an unborn branch reads as an empty snapshot
        let head_map = match revision::tree_to_map(self, "HEAD") {
            Ok(map) => map,
            Err(err) if GitError::is_not_found(&err) => BTreeMap::new(),
            Err(err) => return Err(err),
        };

        let index_map: BTreeMap<String, ObjectId> = index
            .entries()
            .map(|entry| (entry.key(), entry.oid.clone()))
            .collect();

        writeln!(self.writer(), "Changes to be committed:")?;
        for (path, oid) in &index_map {
            match head_map.get(path) {
                None => writeln!(self.writer(), "  added:    {}", path.as_str().green())?,
                Some(head_oid) if head_oid != oid => {
                    writeln!(self.writer(), "  modified: {}", path.as_str().green())?
                }
                Some(_) => {}
            }
        }
        for path in head_map.keys() {
            if !index_map.contains_key(path) {
                writeln!(self.writer(), "  deleted:  {}", path.as_str().green())?;
            }
        }

        writeln!(self.writer())?;
        writeln!(self.writer(), "Changes not staged for commit:")?;
        for entry in index.entries() {
            if !self.workspace().file_exists(&entry.name) {
                writeln!(self.writer(), "  deleted:  {}", entry.key().red())?;
                continue;
            }

            // cheap stat check first; only rehash when mtime seconds moved
            let stat = self.workspace().stat_file(&entry.name)?;
            if stat.mtime != entry.metadata.mtime {
                let content = self.workspace().read_file(&entry.name)?;
                let oid = Database::hash(content.as_ref(), ObjectType::Blob, None)?;
                if oid != entry.oid {
                    writeln!(self.writer(), "  modified: {}", entry.key().red())?;
                }
            }
        }

        let rules = Ignore::read(self)?;

        writeln!(self.writer())?;
        writeln!(self.writer(), "Untracked files:")?;
        for path in self.workspace().list_files(None)? {
            let key = path.to_string_lossy().into_owned();
            if !index.is_tracked(&key) && !rules.check(&key) {
                writeln!(self.writer(), "  {}", key.red())?;
            }
        }

        Ok(())
    }
}
