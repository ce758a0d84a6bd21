use crate::areas::repository::Repository;
use crate::artifacts::ignore::Ignore;
use std::io::Write;

impl Repository {
    /// Print each of `paths` that the ignore rules exclude.
    pub fn check_ignore(&self, paths: &[String]) -> anyhow::Result<()> {
        let rules = Ignore::read(self)?;

        for path in paths {
            if rules.check(path) {
                writeln!(self.writer(), "{path}")?;
            }
        }

        Ok(())
    }
}
