use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::revision;
use std::collections::HashSet;
use std::io::Write;

impl Repository {
    /// Emit the ancestry of a commit as a Graphviz digraph.
    ///
    /// Each commit becomes a node labelled with its short ID and the
    /// first line of its message; edges point at parents. A visited set
    /// keeps shared history from being emitted twice.
    pub fn log(&self, name: &str) -> anyhow::Result<()> {
        writeln!(self.writer(), "digraph ritlog{{")?;
        writeln!(self.writer(), "  node[shape=rect]")?;

        let oid = revision::find_object(self, name, None, true)?;
        let mut seen = HashSet::new();
        self.log_graphviz(&oid, &mut seen)?;

        writeln!(self.writer(), "}}")?;
        Ok(())
    }

    fn log_graphviz(&self, oid: &ObjectId, seen: &mut HashSet<ObjectId>) -> anyhow::Result<()> {
        if !seen.insert(oid.clone()) {
            return Ok(());
        }

        let commit = self.database().load_commit(oid)?;

        let message = commit
            .message()
            .trim()
            .replace('\\', "\\\\")
            .replace('"', "\\\"");
        let message = message.lines().next().unwrap_or("").to_string();

        writeln!(
            self.writer(),
            "  c_{} [label=\"{}: {}\"]",
            oid,
            oid.to_short_oid(),
            message
        )?;

        for parent in commit.parents()? {
            writeln!(self.writer(), "  c_{} -> c_{};", oid, parent)?;
            self.log_graphviz(&parent, seen)?;
        }

        Ok(())
    }
}
