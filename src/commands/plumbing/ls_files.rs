use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// List staged paths; `verbose` adds per-entry metadata.
    pub fn ls_files(&self, verbose: bool) -> anyhow::Result<()> {
        let index = self.index()?;

        if verbose {
            writeln!(
                self.writer(),
                "Index file format v{}, containing {} entries.",
                index.version(),
                index.len()
            )?;
        }

        for entry in index.entries() {
            writeln!(self.writer(), "{}", entry.name.display())?;
            if verbose {
                writeln!(self.writer(), "  Mode: {:o}", entry.metadata.mode.as_u32())?;
                writeln!(self.writer(), "  SHA: {}", entry.oid)?;
                writeln!(self.writer(), "  Size: {}", entry.metadata.size)?;
                writeln!(
                    self.writer(),
                    "  ctime: {}.{}",
                    entry.metadata.ctime,
                    entry.metadata.ctime_nsec
                )?;
                writeln!(
                    self.writer(),
                    "  mtime: {}.{}",
                    entry.metadata.mtime,
                    entry.metadata.mtime_nsec
                )?;
            }
        }

        Ok(())
    }
}
