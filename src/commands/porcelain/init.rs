use crate::areas::repository::Repository;
use std::io::Write;
use std::path::Path;

/// Create the repository skeleton at `path` and report where it landed.
pub fn init(path: &Path, writer: Box<dyn Write>) -> anyhow::Result<Repository> {
    let repository = Repository::create(path, writer)?;

    writeln!(
        repository.writer(),
        "Initialized empty rit repository in {}",
        repository.gitdir().display()
    )?;

    Ok(repository)
}
